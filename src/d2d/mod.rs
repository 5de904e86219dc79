//! Drone-and-truck delivery (D2D): fleet configuration, instance model,
//! timing and energy simulation, multi-route solutions and neighborhoods.

pub mod config;
pub mod instance;
pub mod neighborhoods;
pub mod simulation;
pub mod solution;

pub use config::{DroneConfig, DronePowerModel, FleetConfig, TruckConfig};
pub use instance::D2dInstance;
pub use neighborhoods::{D2dNeighborhood, RouteSwap};
pub use solution::D2dSolution;
