use std::net::TcpStream;

use tracing::debug;

use crate::error::{NavError, Result};
use crate::network;
use crate::protocol::{Request, Response, StartRunResult};
use crate::session::{Feedback, RunOutcome, RunRequest, RunStatus};

/// Client side of the run/status protocol.
///
/// A connection streaming a run is busy until the result arrives; cancel or
/// query status from a second client.
pub struct MouseClient {
    stream: TcpStream,
}

impl MouseClient {
    pub fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address)?;
        debug!("Connected to {}", address);
        Ok(Self { stream })
    }

    /// Starts a run and blocks until it ends, calling `on_feedback` for every move.
    pub fn start_run(
        &mut self,
        request: &RunRequest,
        mut on_feedback: impl FnMut(Feedback),
    ) -> Result<RunOutcome> {
        network::send_json(&mut self.stream, &Request::StartRun(request.clone()))?;

        match self.receive()? {
            Response::StartRunResult(StartRunResult::Ok) => {}
            Response::StartRunResult(StartRunResult::AlreadyRunning) => {
                return Err(NavError::AlreadyRunning)
            }
            Response::StartRunResult(StartRunResult::Rejected(reason)) => {
                return Err(NavError::Protocol(format!("run rejected: {}", reason)))
            }
            other => return Err(unexpected(other)),
        }

        loop {
            match self.receive()? {
                Response::Feedback(feedback) => on_feedback(feedback),
                Response::RunResult(outcome) => return Ok(outcome),
                other => return Err(unexpected(other)),
            }
        }
    }

    /// Requests cancellation. Returns whether a run was in progress.
    pub fn cancel(&mut self) -> Result<bool> {
        network::send_json(&mut self.stream, &Request::CancelRun)?;
        match self.receive()? {
            Response::CancelRunResult(cancelled) => Ok(cancelled),
            other => Err(unexpected(other)),
        }
    }

    pub fn status(&mut self) -> Result<RunStatus> {
        network::send_json(&mut self.stream, &Request::GetStatus)?;
        match self.receive()? {
            Response::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    fn receive(&mut self) -> Result<Response> {
        network::receive_json(&mut self.stream)
    }
}

fn unexpected(response: Response) -> NavError {
    match response {
        Response::Error(msg) => NavError::Protocol(msg),
        other => NavError::Protocol(format!("unexpected response: {:?}", other)),
    }
}
