//! Simulation configuration.

use std::path::Path;

use orbit_links::ProtocolConfig;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Total satellites, dealt round-robin across planes
    pub satellites: usize,
    /// Number of evenly spaced orbital planes
    pub planes: usize,
    /// Orbit radius, in protocol distance units
    pub orbit_radius: f64,
    /// Plane inclination in degrees
    pub inclination_deg: f64,
    /// Angular speed in radians per second
    pub angular_speed: f64,
    /// Simulated seconds per tick
    pub tick_seconds: f64,
    /// Ticks per run
    pub ticks: u64,
    /// Worker threads used to update satellites each tick
    pub workers: usize,
    /// Link protocol settings shared by every satellite
    pub protocol: ProtocolConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            satellites: 48,
            planes: 6,
            // 550 km altitude over a 6 371 km Earth, in km
            orbit_radius: 6_921.0,
            inclination_deg: 53.0,
            // sqrt(mu / r^3) with mu = 398 600 km^3/s^2
            angular_speed: 1.096e-3,
            tick_seconds: 10.0,
            ticks: 60,
            workers: 4,
            protocol: ProtocolConfig::default().with_max_distance(6_000.0),
        }
    }
}

impl SimulationConfig {
    /// Load a config from a JSON file. Missing fields take default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_satellites(mut self, satellites: usize, planes: usize) -> Self {
        self.satellites = satellites;
        self.planes = planes;
        self
    }

    #[must_use]
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: ProtocolConfig) -> Self {
        self.protocol = protocol;
        self
    }

    /// Check counts, timing and the embedded protocol config.
    pub fn validate(&self) -> Result<()> {
        if self.satellites == 0 {
            return Err(Error::InvalidConfig("satellites must be positive".into()));
        }
        if self.planes == 0 || self.planes > self.satellites {
            return Err(Error::InvalidConfig(format!(
                "planes must be between 1 and {}, got {}",
                self.satellites, self.planes
            )));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be positive".into()));
        }
        if !(self.orbit_radius.is_finite() && self.orbit_radius > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "orbit_radius must be finite and positive, got {}",
                self.orbit_radius
            )));
        }
        for (name, value) in [
            ("inclination_deg", self.inclination_deg),
            ("angular_speed", self.angular_speed),
            ("tick_seconds", self.tick_seconds),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be finite")));
            }
        }
        self.protocol.validate()?;
        Ok(())
    }
}
