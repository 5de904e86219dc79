//! Error types for the solver.
//!
//! All fallible public APIs return [`SolverError`]. Parsing failures wrap the
//! offending file path and the original cause; invalid neighborhood parameters
//! are rejected eagerly at construction time.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;

/// Solver error types
#[derive(Error, Debug)]
pub enum SolverError {
    /// A problem file could not be parsed
    #[error("Failed to parse problem file {path}: {reason}")]
    ProblemParsing { path: PathBuf, reason: String },

    /// The instance declares an edge-weight type other than EUC_2D
    #[error("Unsupported edge weight type: {0}")]
    UnsupportedEdgeWeightType(String),

    /// A configuration file could not be loaded
    #[error("Failed to load configuration {path}: {reason}")]
    ConfigLoading { path: PathBuf, reason: String },

    /// A neighborhood was instantiated with an invalid parameter
    #[error("Invalid neighborhood parameter: {0}")]
    InvalidNeighborhood(String),

    /// A metric calculation was invoked without enough information to derive
    /// arrival timestamps (neither precomputed timestamps nor a vehicle index)
    #[error("Cannot derive arrival timestamps: {0}")]
    MissingArrivalData(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
