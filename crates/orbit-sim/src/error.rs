//! Error types for orbit-sim.

use thiserror::Error;

/// Result type for orbit-sim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// The link protocol rejected an operation.
    #[error("link topology error: {0}")]
    Links(#[from] orbit_links::Error),

    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for [`SimulationConfig`](crate::SimulationConfig).
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    /// A config value is out of range.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}
