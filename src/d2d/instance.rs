//! Parsing and representation of D2D (drone-and-truck delivery) instances.
//!
//! The plain-text format carries a few `key value` header lines followed by
//! one row per customer: `x y demand technician_only tech_service
//! drone_service`. The depot is location 0 at the origin; customers are
//! locations `1..=customers_count`.

use crate::d2d::config::{DroneConfig, FleetConfig, TruckConfig};
use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A D2D problem instance: location data plus the fleet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct D2dInstance {
    /// Name of the instance
    pub name: String,
    /// Number of customers (excluding the depot)
    pub customers_count: usize,
    /// Number of drones in the fleet
    pub drones_count: usize,
    /// Number of technician trucks in the fleet
    pub technicians_count: usize,
    /// Maximum total flight duration of a single drone route, in seconds
    pub flight_duration: f64,
    /// X coordinates, indexed by location (0 is the depot)
    pub x: Vec<f64>,
    /// Y coordinates, indexed by location
    pub y: Vec<f64>,
    /// Package weight demanded at each location
    pub demands: Vec<f64>,
    /// Whether a location may legally be served by a drone
    pub dronable: Vec<bool>,
    /// Service time when a technician serves the location
    pub technician_service_time: Vec<f64>,
    /// Service time when a drone serves the location
    pub drone_service_time: Vec<f64>,
    /// Truck physical parameters
    pub truck: TruckConfig,
    /// Drone physical parameters, one record per drone
    pub drones: Vec<DroneConfig>,
}

impl D2dInstance {
    /// Euclidean distance between two locations
    #[inline]
    pub fn distance(&self, first: usize, second: usize) -> f64 {
        let dx = self.x[first] - self.x[second];
        let dy = self.y[first] - self.y[second];
        (dx * dx + dy * dy).sqrt()
    }

    /// Parse an instance file and attach the fleet configuration.
    ///
    /// The drone record list must cover `drones_count` drones; shorter lists
    /// are a configuration error.
    pub fn from_file<P: AsRef<Path>>(path: P, config: FleetConfig) -> Result<Self> {
        let path = path.as_ref();
        let parse_error = |reason: String| SolverError::ProblemParsing {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| parse_error(format!("cannot open file: {}", e)))?;
        let reader = BufReader::new(file);

        let mut customers_count = None;
        let mut drones_count = None;
        let mut technicians_count = None;
        let mut flight_duration = None;

        // Depot at the origin with zero demand and service times
        let mut x = vec![0.0];
        let mut y = vec![0.0];
        let mut demands = vec![0.0];
        let mut dronable = vec![true];
        let mut technician_service_time = vec![0.0];
        let mut drone_service_time = vec![0.0];

        for line in reader.lines() {
            let line = line.map_err(|e| parse_error(format!("read error: {}", e)))?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            match tokens[0] {
                "Customers" if tokens.len() >= 2 => {
                    customers_count = Some(
                        tokens[1]
                            .parse()
                            .map_err(|_| parse_error("invalid customer count".to_string()))?,
                    );
                }
                "number_drone" if tokens.len() >= 2 => {
                    drones_count = Some(
                        tokens[1]
                            .parse()
                            .map_err(|_| parse_error("invalid drone count".to_string()))?,
                    );
                }
                "number_technician" if tokens.len() >= 2 => {
                    technicians_count = Some(
                        tokens[1]
                            .parse()
                            .map_err(|_| parse_error("invalid technician count".to_string()))?,
                    );
                }
                "droneLimitationFightTime(s)" if tokens.len() >= 2 => {
                    flight_duration = Some(
                        tokens[1]
                            .parse()
                            .map_err(|_| parse_error("invalid flight duration".to_string()))?,
                    );
                }
                _ if tokens.len() >= 6 && tokens[0].parse::<f64>().is_ok() => {
                    let mut values = [0.0f64; 6];
                    for (slot, token) in values.iter_mut().zip(&tokens) {
                        *slot = token.parse().map_err(|_| {
                            parse_error(format!("invalid customer row: {}", line))
                        })?;
                    }
                    x.push(values[0]);
                    y.push(values[1]);
                    demands.push(values[2]);
                    dronable.push(values[3] == 0.0);
                    technician_service_time.push(values[4]);
                    drone_service_time.push(values[5]);
                }
                _ => {}
            }
        }

        let customers_count: usize =
            customers_count.ok_or_else(|| parse_error("missing 'Customers' field".to_string()))?;
        let drones_count =
            drones_count.ok_or_else(|| parse_error("missing 'number_drone' field".to_string()))?;
        let technicians_count = technicians_count
            .ok_or_else(|| parse_error("missing 'number_technician' field".to_string()))?;
        let flight_duration = flight_duration.ok_or_else(|| {
            parse_error("missing 'droneLimitationFightTime(s)' field".to_string())
        })?;

        if x.len() != customers_count + 1 {
            return Err(parse_error(format!(
                "expected {} customer rows, found {}",
                customers_count,
                x.len() - 1
            )));
        }
        if config.drones.len() < drones_count {
            return Err(parse_error(format!(
                "fleet configuration covers {} drones, instance needs {}",
                config.drones.len(),
                drones_count
            )));
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!(
            "Parsed D2D instance {} with {} customers, {} drones, {} technicians",
            name,
            customers_count,
            drones_count,
            technicians_count
        );

        Ok(D2dInstance {
            name,
            customers_count,
            drones_count,
            technicians_count,
            flight_duration,
            x,
            y,
            demands,
            dronable,
            technician_service_time,
            drone_service_time,
            truck: config.truck,
            drones: config.drones,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d2d::config::DronePowerModel;
    use std::io::Write;

    fn test_config(drones: usize) -> FleetConfig {
        FleetConfig {
            truck: TruckConfig {
                maximum_velocity: 10.0,
                coefficients: vec![1.0],
            },
            drones: (0..drones)
                .map(|_| DroneConfig {
                    altitude: 50.0,
                    takeoff_speed: 10.0,
                    cruise_speed: 20.0,
                    landing_speed: 10.0,
                    capacity: 5.0,
                    battery: 1_000_000.0,
                    power: DronePowerModel::Linear {
                        beta: 1.0,
                        gamma: 100.0,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_parse_instance() {
        let file = std::env::temp_dir().join("d2d_parse.txt");
        {
            let mut f = File::create(&file).unwrap();
            writeln!(f, "Customers 3").unwrap();
            writeln!(f, "number_drone 2").unwrap();
            writeln!(f, "number_technician 1").unwrap();
            writeln!(f, "droneLimitationFightTime(s) 3600").unwrap();
            writeln!(f, "10.0 0.0 1.5 0\t60 30").unwrap();
            writeln!(f, "-5.0 5.0 2.0 1\t90 45").unwrap();
            writeln!(f, "0.0 -8.0 0.5 0\t30 15").unwrap();
        }
        let instance = D2dInstance::from_file(&file, test_config(2)).unwrap();
        std::fs::remove_file(&file).ok();

        assert_eq!(instance.customers_count, 3);
        assert_eq!(instance.drones_count, 2);
        assert_eq!(instance.technicians_count, 1);
        assert!((instance.flight_duration - 3600.0).abs() < 1e-9);
        // Depot prepended at the origin
        assert_eq!(instance.x.len(), 4);
        assert!(instance.dronable[0]);
        assert!(instance.dronable[1]);
        assert!(!instance.dronable[2]);
        assert!((instance.distance(0, 1) - 10.0).abs() < 1e-9);
        assert!((instance.demands[3] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let file = std::env::temp_dir().join("d2d_missing.txt");
        {
            let mut f = File::create(&file).unwrap();
            writeln!(f, "Customers 1").unwrap();
            writeln!(f, "number_drone 1").unwrap();
            writeln!(f, "1.0 1.0 1.0 0 10 10").unwrap();
        }
        let result = D2dInstance::from_file(&file, test_config(1));
        std::fs::remove_file(&file).ok();
        assert!(matches!(result, Err(SolverError::ProblemParsing { .. })));
    }
}
