pub mod algorithm;
pub mod alternative;
pub mod assemble;

pub use algorithm::{find_path, path_weight, WeightOverrides};
pub use alternative::{checkpoint_index, find_alternative, node_overlap};
pub use assemble::assemble;
