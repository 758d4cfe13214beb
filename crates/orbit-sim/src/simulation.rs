//! Tick-driven constellation simulation.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::thread;

use orbit_links::{Constellation, Link, LinkProtocol, Satellite};
use tracing::{debug, info};

use crate::{CircularOrbit, Result, SimulationConfig};

/// Topology statistics for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Satellites that ran an MST pass this tick
    pub recomputed: u64,
    /// Sum of established set sizes over all satellites
    pub established: usize,
    pub min_distance: Option<f64>,
    pub mean_distance: Option<f64>,
    pub max_distance: Option<f64>,
    /// Size of the largest established set
    pub largest_tree: usize,
}

/// Moves satellites and drives their link protocols.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    mesh: Constellation,
    orbits: Vec<(Arc<Satellite>, CircularOrbit)>,
    tick: u64,
}

impl Simulation {
    /// Place satellites evenly over the configured planes and register every
    /// pair as a candidate link. Range filtering is left to the protocols.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut mesh = Constellation::try_new(config.protocol)?;
        let per_plane = config.satellites.div_ceil(config.planes);
        let inclination = config.inclination_deg.to_radians();

        let mut orbits = Vec::with_capacity(config.satellites);
        for i in 0..config.satellites {
            let plane = i % config.planes;
            let slot = i / config.planes;
            let orbit = CircularOrbit::new(
                config.orbit_radius,
                inclination,
                TAU * plane as f64 / config.planes as f64,
                // Offset each plane by a fraction of the slot spacing so that
                // planes never put two satellites on their shared node line.
                TAU * (slot as f64 + plane as f64 / config.planes as f64) / per_plane as f64,
            );
            let satellite = mesh.add_satellite(format!("sat-{plane}-{slot}"), orbit.position());
            orbits.push((satellite, orbit));
        }

        let links = mesh.link_within_range(f64::INFINITY)?;
        info!(
            "Constellation ready: {} satellites in {} planes, {} candidate links",
            config.satellites,
            config.planes,
            links.len()
        );

        Ok(Self {
            config,
            mesh,
            orbits,
            tick: 0,
        })
    }

    /// Configuration the simulation was built from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The simulated satellites and their protocols.
    pub fn constellation(&self) -> &Constellation {
        &self.mesh
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn passes(&self) -> u64 {
        self.orbits
            .iter()
            .map(|(satellite, _)| satellite.protocol().recompute_count())
            .sum()
    }

    /// Advance every satellite one tick, then update all topologies in parallel.
    pub fn step(&mut self) -> Result<TickReport> {
        self.tick += 1;
        let delta = self.config.angular_speed * self.config.tick_seconds;
        for (satellite, orbit) in &mut self.orbits {
            orbit.advance(delta);
            satellite.set_position(orbit.position());
        }

        let passes_before = self.passes();
        let satellites: Vec<&Arc<Satellite>> = self.orbits.iter().map(|(s, _)| s).collect();
        let chunk = satellites.len().div_ceil(self.config.workers);

        let results = thread::scope(|scope| {
            let handles: Vec<_> = satellites
                .chunks(chunk)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|satellite| satellite.protocol().update_links())
                            .collect::<orbit_links::Result<Vec<_>>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect::<Vec<_>>()
        });

        let mut trees: Vec<Vec<Arc<dyn Link>>> = Vec::with_capacity(satellites.len());
        for result in results {
            trees.extend(result?);
        }

        let distances: Vec<f64> = trees.iter().flatten().map(|link| link.distance()).collect();
        let established = distances.len();
        let report = TickReport {
            tick: self.tick,
            recomputed: self.passes() - passes_before,
            established,
            min_distance: distances.iter().copied().reduce(f64::min),
            mean_distance: (established > 0)
                .then(|| distances.iter().sum::<f64>() / established as f64),
            max_distance: distances.iter().copied().reduce(f64::max),
            largest_tree: trees.iter().map(Vec::len).max().unwrap_or(0),
        };

        debug!(
            "Tick {}: {} recomputed, {} established",
            report.tick, report.recomputed, report.established
        );
        Ok(report)
    }

    /// Run the configured number of ticks.
    pub fn run(&mut self) -> Result<Vec<TickReport>> {
        (0..self.config.ticks).map(|_| self.step()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use orbit_links::{Node, ProtocolConfig};

    fn small(range: f64) -> SimulationConfig {
        SimulationConfig::default()
            .with_satellites(8, 2)
            .with_workers(3)
            .with_ticks(3)
            .with_protocol(ProtocolConfig::default().with_max_distance(range))
    }

    #[test]
    fn satellites_start_on_their_orbits() {
        let sim = Simulation::new(small(1e9)).unwrap();
        let config = sim.config().clone();

        assert_eq!(sim.constellation().len(), 8);
        for satellite in sim.constellation().satellites() {
            assert!((satellite.position().norm() - config.orbit_radius).abs() < 1e-6);
            assert_eq!(satellite.protocol().links().len(), 7);
        }
    }

    #[test]
    fn unlimited_range_spans_everything() {
        let mut sim = Simulation::new(small(1e9)).unwrap();
        let report = sim.step().unwrap();

        assert_eq!(report.tick, 1);
        assert_eq!(report.recomputed, 8);
        assert_eq!(report.largest_tree, 7);
        assert_eq!(report.established, 8 * 7);
    }

    #[test]
    fn established_links_respect_range() {
        let range = 8_000.0;
        let mut sim = Simulation::new(small(range)).unwrap();
        for report in sim.run().unwrap() {
            if let Some(max) = report.max_distance {
                assert!(max <= range);
            }
            if let (Some(min), Some(mean)) = (report.min_distance, report.mean_distance) {
                assert!(min <= mean);
            }
        }
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn stationary_constellation_hits_the_cache() {
        let mut config = small(1e9);
        config.angular_speed = 0.0;
        let mut sim = Simulation::new(config).unwrap();

        let first = sim.step().unwrap();
        let second = sim.step().unwrap();

        assert_eq!(first.recomputed, 8);
        assert_eq!(second.recomputed, 0);
        assert_eq!(first.established, second.established);
    }

    #[test]
    fn zero_range_establishes_nothing() {
        let mut sim = Simulation::new(small(0.0)).unwrap();
        let report = sim.step().unwrap();

        assert_eq!(report.established, 0);
        assert_eq!(report.min_distance, None);
        assert_eq!(report.mean_distance, None);
        assert_eq!(report.largest_tree, 0);
    }

    #[test]
    fn more_workers_than_satellites() {
        let mut sim = Simulation::new(small(1e9).with_workers(32)).unwrap();
        assert_eq!(sim.step().unwrap().established, 56);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Simulation::new(SimulationConfig::default().with_satellites(0, 1));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
