//! Orbit simulation binary
//!
//! Usage: `orbit-sim [config.json]`

use orbit_sim::{Simulation, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orbit_sim=info,orbit_links=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading config from {}", path);
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };

    let mut sim = Simulation::new(config)?;
    for _ in 0..sim.config().ticks {
        let report = sim.step()?;
        tracing::info!(
            "Tick {}: {} established, {} recomputed, largest tree {}, \
             distance min {:.1} mean {:.1} max {:.1}",
            report.tick,
            report.established,
            report.recomputed,
            report.largest_tree,
            report.min_distance.unwrap_or(0.0),
            report.mean_distance.unwrap_or(0.0),
            report.max_distance.unwrap_or(0.0),
        );
    }

    Ok(())
}
