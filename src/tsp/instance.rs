//! Parsing and representation of TSP instances.
//!
//! Handles TSPLIB-style files. Only the EUC_2D edge-weight type is supported:
//! any other declared type is surfaced as a parsing failure, never retried.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A TSP instance: city coordinates and the precomputed distance matrix.
/// City 0 is the depot where every tour starts and ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Number of cities (including the depot)
    pub dimension: usize,
    /// X coordinates, indexed by city
    pub x: Vec<f64>,
    /// Y coordinates, indexed by city
    pub y: Vec<f64>,
    /// Precomputed Euclidean distance matrix
    #[serde(skip)]
    pub distances: Vec<Vec<f64>>,
}

impl TspInstance {
    /// Build an instance directly from coordinates
    pub fn from_coordinates(name: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        let dimension = x.len();
        let distances = Self::compute_distances(&x, &y);
        TspInstance {
            name: name.to_string(),
            dimension,
            x,
            y,
            distances,
        }
    }

    /// Parse a TSPLIB format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let parse_error = |reason: String| SolverError::ProblemParsing {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| parse_error(format!("cannot open file: {}", e)))?;
        let reader = BufReader::new(file);

        let mut name = String::new();
        let mut dimension = 0usize;
        let mut edge_weight_type = String::new();
        let mut coords: Vec<(f64, f64)> = Vec::new();
        let mut in_coords = false;

        for line in reader.lines() {
            let line = line.map_err(|e| parse_error(format!("read error: {}", e)))?;
            let line = line.trim();

            if line.is_empty() || line == "EOF" {
                continue;
            }

            if let Some(value) = keyword_value(line, "NAME") {
                name = value.to_string();
                continue;
            }
            if let Some(value) = keyword_value(line, "DIMENSION") {
                dimension = value
                    .parse()
                    .map_err(|_| parse_error(format!("invalid dimension: {}", value)))?;
                continue;
            }
            if let Some(value) = keyword_value(line, "EDGE_WEIGHT_TYPE") {
                edge_weight_type = value.to_string();
                continue;
            }
            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }
            if line.starts_with("COMMENT") || line.starts_with("TYPE") {
                continue;
            }

            if in_coords {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 3 {
                    let x: f64 = parts[1]
                        .parse()
                        .map_err(|_| parse_error(format!("invalid x coordinate: {}", parts[1])))?;
                    let y: f64 = parts[2]
                        .parse()
                        .map_err(|_| parse_error(format!("invalid y coordinate: {}", parts[2])))?;
                    coords.push((x, y));
                }
            }
        }

        if edge_weight_type != "EUC_2D" {
            return Err(SolverError::UnsupportedEdgeWeightType(edge_weight_type));
        }
        if dimension == 0 || coords.len() != dimension {
            return Err(parse_error(format!(
                "expected {} coordinate rows, found {}",
                dimension,
                coords.len()
            )));
        }

        let (x, y): (Vec<f64>, Vec<f64>) = coords.into_iter().unzip();
        log::info!("Parsed TSP instance {} with {} cities", name, dimension);
        Ok(Self::from_coordinates(&name, x, y))
    }

    fn compute_distances(x: &[f64], y: &[f64]) -> Vec<Vec<f64>> {
        let n = x.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dx = x[i] - x[j];
                    let dy = y[i] - y[j];
                    matrix[i][j] = (dx * dx + dy * dy).sqrt();
                }
            }
        }
        matrix
    }

    /// Distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }
}

/// Extract the value of a `KEYWORD : value` header line
fn keyword_value<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_distance_calculation() {
        let instance =
            TspInstance::from_coordinates("test", vec![0.0, 3.0], vec![0.0, 4.0]);
        assert!((instance.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((instance.distance(1, 0) - 5.0).abs() < 1e-10);
        assert_eq!(instance.distance(0, 0), 0.0);
    }

    #[test]
    fn test_parse_euc_2d() {
        let file = tempfile_path("parse_euc_2d.tsp");
        {
            let mut f = File::create(&file).unwrap();
            writeln!(f, "NAME : tiny").unwrap();
            writeln!(f, "TYPE : TSP").unwrap();
            writeln!(f, "DIMENSION : 3").unwrap();
            writeln!(f, "EDGE_WEIGHT_TYPE : EUC_2D").unwrap();
            writeln!(f, "NODE_COORD_SECTION").unwrap();
            writeln!(f, "1 0.0 0.0").unwrap();
            writeln!(f, "2 1.0 0.0").unwrap();
            writeln!(f, "3 0.0 1.0").unwrap();
            writeln!(f, "EOF").unwrap();
        }
        let instance = TspInstance::from_file(&file).unwrap();
        std::fs::remove_file(&file).ok();
        assert_eq!(instance.name, "tiny");
        assert_eq!(instance.dimension, 3);
        assert!((instance.distance(1, 2) - 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_unsupported_edge_weight_type() {
        let file = tempfile_path("unsupported.tsp");
        {
            let mut f = File::create(&file).unwrap();
            writeln!(f, "NAME : bad").unwrap();
            writeln!(f, "DIMENSION : 2").unwrap();
            writeln!(f, "EDGE_WEIGHT_TYPE : EXPLICIT").unwrap();
            writeln!(f, "NODE_COORD_SECTION").unwrap();
            writeln!(f, "1 0.0 0.0").unwrap();
            writeln!(f, "2 1.0 0.0").unwrap();
        }
        let result = TspInstance::from_file(&file);
        std::fs::remove_file(&file).ok();
        assert!(matches!(
            result,
            Err(SolverError::UnsupportedEdgeWeightType(ref t)) if t == "EXPLICIT"
        ));
    }

    fn tempfile_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }
}
