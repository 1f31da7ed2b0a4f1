pub mod geometry;
pub mod search;
