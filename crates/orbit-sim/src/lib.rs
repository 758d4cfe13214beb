//! Orbit Simulation
//!
//! Drives inter-satellite link maintenance the way a constellation controller
//! would: every tick, satellites advance along circular orbits and each one
//! re-evaluates its link topology. Recomputation is spread across a pool of
//! worker threads, all sharing the same protocol instances.

mod config;
mod error;
mod orbit;
mod simulation;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use orbit::CircularOrbit;
pub use simulation::{Simulation, TickReport};
