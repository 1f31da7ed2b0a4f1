use crate::core::config::AlternativeOptions;
use crate::core::types::{Coordinate, RouteLeg, SnapResult};
use crate::graph::{NodeId, RoadGraph};
use crate::routing::algorithm::{find_path, WeightOverrides};
use crate::routing::assemble::assemble;
use rustc_hash::FxHashSet;

/// Index of the node sitting at `fraction` of a path with `len` nodes.
pub fn checkpoint_index(len: usize, fraction: f64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = (fraction * len as f64).floor() as usize;
    Some(index.min(len - 1))
}

/// Shared distinct nodes divided by the larger distinct node count.
pub fn node_overlap(a: &[NodeId], b: &[NodeId]) -> f64 {
    let set_a: FxHashSet<NodeId> = a.iter().copied().collect();
    let set_b: FxHashSet<NodeId> = b.iter().copied().collect();
    let larger = set_a.len().max(set_b.len());
    if larger == 0 {
        return 1.0;
    }
    set_a.intersection(&set_b).count() as f64 / larger as f64
}

/// Looks for a route that diverges from `main_path` by blocking one node of
/// it at a time (in checkpoint order) and searching again. Each attempt uses
/// its own weight overlay, so the graph is left untouched whatever happens.
#[allow(clippy::too_many_arguments)]
pub fn find_alternative(
    graph: &RoadGraph,
    main_path: &[NodeId],
    main_leg: &RouteLeg,
    start_snap: &SnapResult,
    end_snap: &SnapResult,
    start_pin: Coordinate,
    end_pin: Coordinate,
    options: &AlternativeOptions,
    average_speed_kmh: f64,
) -> Option<RouteLeg> {
    for &fraction in &options.checkpoints {
        let Some(index) = checkpoint_index(main_path.len(), fraction) else {
            break;
        };
        let blocked = main_path[index];

        let mut overrides = WeightOverrides::new();
        overrides.penalize_node(graph, blocked, options.penalty_weight);

        let Some(candidate) =
            find_path(graph, start_snap.entry_node, end_snap.entry_node, &overrides)
        else {
            log::debug!("Checkpoint {:.2}: no path around node {:?}", fraction, blocked);
            continue;
        };

        let overlap = node_overlap(main_path, &candidate);
        if overlap >= options.max_overlap {
            log::debug!(
                "Checkpoint {:.2}: candidate overlaps main route ({:.3})",
                fraction,
                overlap
            );
            continue;
        }

        let Some(leg) = assemble(
            graph,
            &candidate,
            start_pin,
            start_snap,
            end_snap,
            end_pin,
            average_speed_kmh,
        ) else {
            continue;
        };

        if leg.distance_meters > main_leg.distance_meters * options.max_detour_factor {
            log::debug!(
                "Checkpoint {:.2}: candidate too long ({:.0} m vs {:.0} m)",
                fraction,
                leg.distance_meters,
                main_leg.distance_meters
            );
            continue;
        }

        log::debug!(
            "Checkpoint {:.2}: alternative accepted (overlap {:.3}, {:.0} m)",
            fraction,
            overlap,
            leg.distance_meters
        );
        return Some(leg);
    }

    None
}
