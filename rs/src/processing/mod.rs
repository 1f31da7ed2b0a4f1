use crate::core::errors::{Result, RouterError};
use crate::core::types::{Coordinate, Road};
use crate::graph::RoadGraph;
use crate::spatial::geometry::distance;

pub struct GraphBuilder {
    graph: RoadGraph,
    roads_added: usize,
    roads_skipped: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            graph: RoadGraph::new(),
            roads_added: 0,
            roads_skipped: 0,
        }
    }

    /// Adds every consecutive coordinate pair of every line of `road` as a
    /// two-way segment. Malformed lines are skipped; a road with no usable
    /// line contributes nothing.
    pub fn add_road(&mut self, road: &Road) -> &mut Self {
        if road.lines.is_empty() {
            log::warn!("Skipping road {}: road has no lines", road.label());
            self.roads_skipped += 1;
            return self;
        }

        let mut lines_added = 0;
        for (index, line) in road.lines.iter().enumerate() {
            match validate_line(line) {
                Ok(()) => {
                    self.add_line(line);
                    lines_added += 1;
                }
                Err(e) => log::warn!("Skipping line {} of road {}: {}", index, road.label(), e),
            }
        }

        if lines_added > 0 {
            self.roads_added += 1;
        } else {
            self.roads_skipped += 1;
        }
        self
    }

    pub fn add_roads<'r, I>(&mut self, roads: I) -> &mut Self
    where
        I: IntoIterator<Item = &'r Road>,
    {
        for road in roads {
            self.add_road(road);
        }
        self
    }

    fn add_line(&mut self, line: &[Coordinate]) {
        for pair in line.windows(2) {
            let (p1, p2) = (pair[0], pair[1]);
            let a = self.graph.get_or_create_node(p1);
            let b = self.graph.get_or_create_node(p2);
            if a == b {
                continue;
            }
            self.graph.add_segment(a, b, distance(&p1, &p2));
        }
    }

    pub fn build(self) -> RoadGraph {
        let mut graph = self.graph;
        graph.build_spatial_index();

        log::info!(
            "Road graph built: {} nodes, {} segments ({} roads, {} skipped)",
            graph.node_count(),
            graph.segment_count(),
            self.roads_added,
            self.roads_skipped
        );

        graph
    }
}

pub fn build_graph(roads: &[Road]) -> RoadGraph {
    let mut builder = GraphBuilder::new();
    builder.add_roads(roads);
    builder.build()
}

fn validate_line(line: &[Coordinate]) -> Result<()> {
    if line.len() < 2 {
        return Err(RouterError::InvalidGeometry(format!(
            "{} point(s), at least 2 are required",
            line.len()
        )));
    }
    if let Some(bad) = line.iter().find(|c| !c.is_valid()) {
        return Err(RouterError::InvalidGeometry(format!(
            "invalid coordinate ({}, {})",
            bad.latitude, bad.longitude
        )));
    }
    Ok(())
}
