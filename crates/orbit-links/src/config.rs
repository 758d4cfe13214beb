//! Protocol configuration.

use crate::{Error, Result};

/// Default maximum inter-satellite link distance, in position units.
pub const DEFAULT_MAX_ISL_DISTANCE: f64 = 5_000.0;

/// Configuration threaded into every protocol instance at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolConfig {
    /// Links longer than this are never added to the MST frontier.
    pub max_isl_distance: f64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_isl_distance: DEFAULT_MAX_ISL_DISTANCE,
        }
    }
}

impl ProtocolConfig {
    /// Set the maximum link distance.
    #[must_use]
    pub fn with_max_distance(mut self, max_isl_distance: f64) -> Self {
        self.max_isl_distance = max_isl_distance;
        self
    }

    /// Whether a link of this length may join the topology.
    #[inline]
    pub fn in_range(&self, distance: f64) -> bool {
        distance <= self.max_isl_distance
    }

    /// Reject distances that are negative, NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        if !self.max_isl_distance.is_finite() || self.max_isl_distance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_isl_distance must be finite and non-negative, got {}",
                self.max_isl_distance
            )));
        }
        Ok(())
    }
}
