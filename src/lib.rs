//! Route Tabu Solver Library
//!
//! Tabu-search local optimization over two routing problems:
//!
//! - Classic TSP on a doubly-linked tour representation, with O(1)
//!   delta-cost moves (city swap, segment shift, segment reversal)
//! - Drone-and-truck delivery (D2D): multi-route fleet solutions with
//!   velocity simulation, drone energy models and endurance constraints
//!
//! # Example
//!
//! ```no_run
//! use route_tabu_solver::search::{solve_tsp, SearchOptions};
//! use route_tabu_solver::tsp::TspInstance;
//!
//! let instance = TspInstance::from_file("instance.tsp").unwrap();
//! let best = solve_tsp(&instance, &SearchOptions::default());
//! println!("Best cost: {:.2}", best.cost(&instance));
//! ```

pub mod d2d;
pub mod error;
pub mod search;
pub mod tabu;
pub mod tsp;

pub use d2d::{D2dInstance, D2dSolution};
pub use error::{Result, SolverError};
pub use tsp::{PathSolution, TspInstance};
