//! Traveling Salesman Problem: instance model, linked-list tour solution and
//! tabu-search neighborhoods.

pub mod instance;
pub mod neighborhoods;
pub mod solution;

pub use instance::TspInstance;
pub use neighborhoods::{SegmentReverse, SegmentShift, SwapNeighborhood, TspNeighborhood};
pub use solution::PathSolution;
