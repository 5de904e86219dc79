//! Physical configuration records for the D2D fleet.
//!
//! The truck record carries the maximum velocity and the repeating hourly
//! velocity coefficients; each drone record carries its endurance data plus a
//! power model chosen once at load time — a tagged variant instead of a mode
//! flag branched on at every energy calculation.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Gravitational acceleration used by the nonlinear power curves
const GRAVITY: f64 = 9.8;

/// Truck physical parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckConfig {
    /// Maximum velocity in distance units per second
    pub maximum_velocity: f64,
    /// Hourly velocity coefficients, cycled from trip start
    pub coefficients: Vec<f64>,
}

/// Power curve of a drone, fixed per drone when the configuration is loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum DronePowerModel {
    /// Affine power in the carried payload: `beta * payload + gamma`
    Linear { beta: f64, gamma: f64 },
    /// Rotor-model power curves, parameterized per the nonlinear consumption
    /// mode; strictly increasing in the carried payload
    Nonlinear {
        /// Frame mass of the drone itself
        mass: f64,
        k1: f64,
        k2: f64,
        c1: f64,
        c2: f64,
        c4: f64,
        c5: f64,
    },
}

/// Drone endurance parameters plus its power model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneConfig {
    /// Cruise altitude
    pub altitude: f64,
    /// Vertical takeoff speed
    pub takeoff_speed: f64,
    /// Horizontal cruise speed
    pub cruise_speed: f64,
    /// Vertical landing speed
    pub landing_speed: f64,
    /// Maximum carried weight
    pub capacity: f64,
    /// Battery capacity in energy units
    pub battery: f64,
    /// Energy consumption curve
    pub power: DronePowerModel,
}

impl DroneConfig {
    /// Time spent climbing to altitude on each edge
    #[inline]
    pub fn takeoff_time(&self) -> f64 {
        self.altitude / self.takeoff_speed
    }

    /// Time spent descending from altitude on each edge
    #[inline]
    pub fn landing_time(&self) -> f64 {
        self.altitude / self.landing_speed
    }

    /// Fixed vertical time incurred per edge (takeoff plus landing)
    #[inline]
    pub fn vertical_time(&self) -> f64 {
        self.takeoff_time() + self.landing_time()
    }

    /// Power drawn during the takeoff phase while carrying `payload`
    pub fn takeoff_power(&self, payload: f64) -> f64 {
        self.power.vertical_power(payload, self.takeoff_speed)
    }

    /// Power drawn during the landing phase while carrying `payload`
    pub fn landing_power(&self, payload: f64) -> f64 {
        self.power.vertical_power(payload, self.landing_speed)
    }

    /// Power drawn during horizontal cruise while carrying `payload`
    pub fn cruise_power(&self, payload: f64) -> f64 {
        self.power.cruise_power(payload, self.cruise_speed)
    }
}

impl DronePowerModel {
    fn vertical_power(&self, payload: f64, vertical_speed: f64) -> f64 {
        match *self {
            DronePowerModel::Linear { beta, gamma } => beta * payload + gamma,
            DronePowerModel::Nonlinear {
                mass, k1, k2, c2, ..
            } => {
                let weight_force = (mass + payload) * GRAVITY;
                k1 * weight_force
                    * (vertical_speed / 2.0
                        + ((vertical_speed / 2.0).powi(2) + weight_force / (k2 * k2)).sqrt())
                    + c2 * weight_force.powf(1.5)
            }
        }
    }

    fn cruise_power(&self, payload: f64, cruise_speed: f64) -> f64 {
        match *self {
            DronePowerModel::Linear { beta, gamma } => beta * payload + gamma,
            DronePowerModel::Nonlinear {
                mass,
                c1,
                c2,
                c4,
                c5,
                ..
            } => {
                let weight_force = (mass + payload) * GRAVITY;
                (c1 + c2)
                    * (weight_force.powi(2) + (c4 * cruise_speed * cruise_speed).powi(2)).powf(0.75)
                    + c5 * cruise_speed.powi(3)
            }
        }
    }
}

/// Complete fleet configuration as loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub truck: TruckConfig,
    pub drones: Vec<DroneConfig>,
}

impl FleetConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SolverError::ConfigLoading {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| SolverError::ConfigLoading {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_drone() -> DroneConfig {
        DroneConfig {
            altitude: 50.0,
            takeoff_speed: 10.0,
            cruise_speed: 20.0,
            landing_speed: 5.0,
            capacity: 10.0,
            battery: 100_000.0,
            power: DronePowerModel::Linear {
                beta: 2.0,
                gamma: 100.0,
            },
        }
    }

    #[test]
    fn test_vertical_time() {
        let drone = linear_drone();
        // 50 / 10 + 50 / 5
        assert!((drone.vertical_time() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_power() {
        let drone = linear_drone();
        assert!((drone.cruise_power(3.0) - 106.0).abs() < 1e-9);
        assert!((drone.takeoff_power(0.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_increases_with_payload() {
        let mut drone = linear_drone();
        for power in [
            DronePowerModel::Linear {
                beta: 2.0,
                gamma: 100.0,
            },
            DronePowerModel::Nonlinear {
                mass: 5.0,
                k1: 0.8,
                k2: 0.3,
                c1: 2.0,
                c2: 0.2,
                c4: 0.02,
                c5: 0.01,
            },
        ] {
            drone.power = power;
            let mut last_cruise = drone.cruise_power(0.0);
            let mut last_takeoff = drone.takeoff_power(0.0);
            for payload in [1.0, 2.5, 7.0] {
                let cruise = drone.cruise_power(payload);
                let takeoff = drone.takeoff_power(payload);
                assert!(cruise > last_cruise);
                assert!(takeoff > last_takeoff);
                last_cruise = cruise;
                last_takeoff = takeoff;
            }
        }
    }

    #[test]
    fn test_fleet_config_json_round_trip() {
        let config = FleetConfig {
            truck: TruckConfig {
                maximum_velocity: 15.0,
                coefficients: vec![1.0, 0.8, 0.6],
            },
            drones: vec![linear_drone()],
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FleetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.drones.len(), 1);
        assert!((parsed.truck.maximum_velocity - 15.0).abs() < 1e-9);
        assert!(matches!(
            parsed.drones[0].power,
            DronePowerModel::Linear { .. }
        ));
    }
}
