//! Micromouse navigation node.
//!
//! Serves the run/status protocol on the configured address. Every run drives
//! a simulated mouse in a maze generated from (or loaded by) the
//! `[simulation]` settings.
//!
//! ```text
//! micromouse [config.toml] [--standalone]
//! ```
//!
//! With `--standalone` the node starts one run from the configured start to
//! the configured goal right away, keeps answering status queries while it
//! drives, logs the discovered and the actual maze, and exits once the run ends.

use std::path::Path;
use std::sync::Arc;

use micromouse::ascii_utils::render_labyrinth;
use micromouse::config::MouseConfig;
use micromouse::server::{simulated_robot, MouseServer};
use micromouse::{NavError, Result, RunOutcome, RunRequest, RunSession};
use tracing::{error, info};

const DEFAULT_CONFIG: &str = "micromouse.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("micromouse=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let standalone = args.iter().any(|a| a == "--standalone");

    let config = match args.iter().skip(1).find(|a| !a.starts_with("--")) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            MouseConfig::load(Path::new(path))?
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG);
            MouseConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => {
            info!("Using default configuration");
            MouseConfig::default()
        }
    };

    info!("micromouse v{}", env!("CARGO_PKG_VERSION"));

    let session = Arc::new(RunSession::new());
    let server = MouseServer::bind(config.clone(), Arc::clone(&session))?;

    if !standalone {
        return server.serve();
    }

    server.spawn()?;

    let sim = &config.simulation;
    let request = RunRequest {
        width: sim.width,
        height: sim.height,
        start: sim.start,
        goal: sim.goal,
    };
    let robot = simulated_robot(sim, &request)?;
    let ground_truth = render_labyrinth(robot.labyrinth());
    let navigation = session.spawn(request, robot, config.navigation.clone(), None)?;

    let outcome = navigation.join().map_err(|_| {
        NavError::ActuationFailure("navigation thread panicked".to_string())
    })?;
    match &outcome {
        RunOutcome::Succeeded { path } => {
            info!("Goal reached in {} steps", path.len().saturating_sub(1))
        }
        RunOutcome::Failed(reason) => error!("Run failed: {:?}", reason),
        RunOutcome::Cancelled => info!("Run cancelled"),
    }
    info!("Actual maze:\n{}", ground_truth);
    Ok(())
}
