//! TCP server exposing the goal-run and status interfaces.
//!
//! Every connection gets its own thread, so status queries are answered while
//! another connection is streaming a run. Each `StartRun` drives a
//! [`SimulatedMouse`] built from the simulation settings.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{MouseConfig, SimulationConfig};
use crate::error::{NavError, Result};
use crate::labyrinth_mock::{Labyrinth, SimulatedMouse};
use crate::network;
use crate::protocol::{Request, Response, StartRunResult};
use crate::session::{FailureReason, RunOutcome, RunRequest, RunSession};

/// Builds the simulated mouse for a run.
///
/// The configured maze file is used when its size matches the request;
/// otherwise a maze of the requested size is generated from the seed.
pub fn simulated_robot(sim: &SimulationConfig, request: &RunRequest) -> Result<SimulatedMouse> {
    let labyrinth = match &sim.maze_file {
        Some(path) => {
            let loaded = Labyrinth::load(Path::new(path))?;
            if (loaded.width(), loaded.height()) == (request.width, request.height) {
                loaded
            } else {
                warn!(
                    "Maze file {} is {}x{}, run asks for {}x{}; generating instead",
                    path,
                    loaded.width(),
                    loaded.height(),
                    request.width,
                    request.height
                );
                Labyrinth::generate(request.width, request.height, sim.seed)?
            }
        }
        None => Labyrinth::generate(request.width, request.height, sim.seed)?,
    };
    Ok(SimulatedMouse::new(labyrinth, request.start)?
        .with_move_delay(Duration::from_millis(sim.move_delay_ms)))
}

pub struct MouseServer {
    listener: TcpListener,
    session: Arc<RunSession>,
    config: Arc<MouseConfig>,
}

impl MouseServer {
    pub fn bind(config: MouseConfig, session: Arc<RunSession>) -> Result<Self> {
        let listener = TcpListener::bind(&config.server.address)?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            session,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the listener fails.
    pub fn serve(self) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            let session = Arc::clone(&self.session);
            let config = Arc::clone(&self.config);
            let spawned = thread::Builder::new()
                .name("client".into())
                .spawn(move || {
                    let peer = stream.peer_addr().ok();
                    debug!("New connection: {:?}", peer);
                    if let Err(e) = handle_client(stream, &session, &config) {
                        warn!("Connection {:?} closed with error: {}", peer, e);
                    }
                });
            if let Err(e) = spawned {
                warn!("Failed to spawn connection thread: {}", e);
            }
        }
        Ok(())
    }

    /// Serves on a background `server` thread.
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("server".into())
            .spawn(move || {
                if let Err(e) = self.serve() {
                    warn!("Server stopped: {}", e);
                }
            })?;
        Ok(handle)
    }
}

fn handle_client(mut stream: TcpStream, session: &Arc<RunSession>, config: &MouseConfig) -> Result<()> {
    loop {
        let request: Request = match network::receive_json(&mut stream) {
            Ok(request) => request,
            Err(NavError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(NavError::Protocol(msg)) => {
                network::send_json(&mut stream, &Response::Error(msg))?;
                continue;
            }
            Err(e) => return Err(e),
        };
        debug!("Request: {:?}", request);

        match request {
            Request::StartRun(run) => start_run(&mut stream, session, config, run)?,
            Request::CancelRun => {
                let cancelled = session.cancel();
                network::send_json(&mut stream, &Response::CancelRunResult(cancelled))?;
            }
            Request::GetStatus => {
                network::send_json(&mut stream, &Response::Status(session.status()))?;
            }
        }
    }
}

/// Starts a run and streams its feedback and result back on `stream`.
fn start_run(
    stream: &mut TcpStream,
    session: &Arc<RunSession>,
    config: &MouseConfig,
    request: RunRequest,
) -> Result<()> {
    if session.is_running() {
        return network::send_json(stream, &Response::StartRunResult(StartRunResult::AlreadyRunning));
    }
    let robot = match simulated_robot(&config.simulation, &request) {
        Ok(robot) => robot,
        Err(e) => {
            return network::send_json(
                stream,
                &Response::StartRunResult(StartRunResult::Rejected(e.to_string())),
            )
        }
    };

    let (tx, rx) = mpsc::channel();
    let join = match session.spawn(request, robot, config.navigation.clone(), Some(tx)) {
        Ok(join) => join,
        Err(NavError::AlreadyRunning) => {
            return network::send_json(
                stream,
                &Response::StartRunResult(StartRunResult::AlreadyRunning),
            )
        }
        Err(e) => {
            return network::send_json(
                stream,
                &Response::StartRunResult(StartRunResult::Rejected(e.to_string())),
            )
        }
    };
    network::send_json(stream, &Response::StartRunResult(StartRunResult::Ok))?;

    // Ends once the navigation thread drops its sender.
    for feedback in rx {
        if let Err(e) = network::send_json(stream, &Response::Feedback(feedback)) {
            warn!(
                "Lost the requester at step {} ({}); the run continues detached",
                feedback.step_count, e
            );
            return Err(e);
        }
    }

    let outcome = join.join().unwrap_or_else(|_| {
        RunOutcome::Failed(FailureReason::Fault("navigation thread panicked".to_string()))
    });
    network::send_json(stream, &Response::RunResult(outcome))
}
