//! Run session: lifecycle, progress and cancellation of one navigation attempt.
//!
//! The session is shared between the navigation thread and any number of
//! status readers. Run state, current cell and step count sit behind a single
//! mutex that is only held for a read or a write, never while the robot is
//! sensing or moving. Cancellation is a flag the controller checks once per
//! iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cell::Cell;
use crate::config::NavigationConfig;
use crate::controller::NavigationController;
use crate::error::{NavError, Result};
use crate::robot::MouseRobot;

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The whole reachable maze was explored without finding the goal.
    NoPath,
    /// The run was aborted by a malfunction or a contract violation.
    Fault(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed(FailureReason),
    Cancelled,
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// `path` lists every cell the mouse occupied, start first, goal last.
    Succeeded { path: Vec<Cell> },
    Failed(FailureReason),
    Cancelled,
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Succeeded { .. } => RunState::Succeeded,
            RunOutcome::Failed(reason) => RunState::Failed(reason.clone()),
            RunOutcome::Cancelled => RunState::Cancelled,
        }
    }
}

/// Parameters of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub width: usize,
    pub height: usize,
    pub start: Cell,
    pub goal: Cell,
}

impl RunRequest {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NavError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        for cell in [self.start, self.goal] {
            if cell.row >= self.height || cell.col >= self.width {
                return Err(NavError::OutOfBounds(cell));
            }
        }
        Ok(())
    }
}

/// Snapshot answered to status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    pub state: RunState,
    pub current_cell: Option<Cell>,
    pub step_count: u64,
}

/// Progress published after every confirmed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub current_cell: Cell,
    pub step_count: u64,
}

#[derive(Debug)]
struct Shared {
    state: RunState,
    current_cell: Option<Cell>,
    step_count: u64,
}

#[derive(Debug)]
pub struct RunSession {
    shared: Mutex<Shared>,
    cancel_requested: AtomicBool,
}

impl Default for RunSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSession {
    pub fn new() -> Self {
        Self {
            shared: Mutex::new(Shared {
                state: RunState::Idle,
                current_cell: None,
                step_count: 0,
            }),
            cancel_requested: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the session to `Running` and hands out the controller's write handle.
    pub fn start(self: &Arc<Self>, request: &RunRequest) -> Result<RunHandle> {
        request.validate()?;

        let mut shared = self.lock();
        if shared.state == RunState::Running {
            return Err(NavError::AlreadyRunning);
        }
        self.cancel_requested.store(false, Ordering::Release);
        shared.state = RunState::Running;
        shared.current_cell = Some(request.start);
        shared.step_count = 0;
        drop(shared);

        info!(
            "Run started: {}x{} maze, {} -> {}",
            request.width, request.height, request.start, request.goal
        );
        Ok(RunHandle {
            session: Arc::clone(self),
            finished: false,
        })
    }

    /// Asks the running navigation to stop at its next iteration.
    ///
    /// Idempotent. Returns whether a run was in progress.
    pub fn cancel(&self) -> bool {
        let shared = self.lock();
        if shared.state != RunState::Running {
            return false;
        }
        if !self.cancel_requested.swap(true, Ordering::AcqRel) {
            info!("Cancellation requested at step {}", shared.step_count);
        }
        true
    }

    pub fn status(&self) -> RunStatus {
        let shared = self.lock();
        RunStatus {
            state: shared.state.clone(),
            current_cell: shared.current_cell,
            step_count: shared.step_count,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().state == RunState::Running
    }

    /// Starts a run and drives it on a dedicated `navigation` thread.
    ///
    /// Feedback is sent on `feedback` after every confirmed move; a dropped
    /// receiver does not stop the run.
    pub fn spawn<R>(
        self: &Arc<Self>,
        request: RunRequest,
        robot: R,
        config: NavigationConfig,
        feedback: Option<Sender<Feedback>>,
    ) -> Result<JoinHandle<RunOutcome>>
    where
        R: MouseRobot + 'static,
    {
        let handle = self.start(&request)?;
        let mut controller = match NavigationController::new(&request, robot, config) {
            Ok(controller) => controller,
            Err(e) => {
                let outcome = RunOutcome::Failed(FailureReason::Fault(e.to_string()));
                handle.finish(&outcome);
                return Err(e);
            }
        };

        let join = thread::Builder::new()
            .name("navigation".into())
            .spawn(move || {
                let outcome = controller.run(&handle, feedback.as_ref());
                handle.finish(&outcome);
                outcome
            })?;
        Ok(join)
    }
}

/// Write access to the session for the duration of one run.
///
/// Dropping the handle without calling [`RunHandle::finish`] marks the run as
/// failed, so a panicking navigation thread never leaves it `Running`.
#[derive(Debug)]
pub struct RunHandle {
    session: Arc<RunSession>,
    finished: bool,
}

impl RunHandle {
    pub fn is_cancelled(&self) -> bool {
        self.session.cancel_requested.load(Ordering::Acquire)
    }

    /// Records a confirmed move and returns the new step count.
    pub fn record_move(&self, cell: Cell) -> u64 {
        let mut shared = self.session.lock();
        shared.current_cell = Some(cell);
        shared.step_count += 1;
        shared.step_count
    }

    pub fn step_count(&self) -> u64 {
        self.session.lock().step_count
    }

    /// Publishes the terminal state.
    pub fn finish(mut self, outcome: &RunOutcome) {
        self.finished = true;
        let mut shared = self.session.lock();
        shared.state = outcome.state();
        info!(
            "Run finished after {} steps: {:?}",
            shared.step_count, shared.state
        );
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Run handle dropped before the run finished");
        let mut shared = self.session.lock();
        shared.state = RunState::Failed(FailureReason::Fault(
            "navigation stopped unexpectedly".to_string(),
        ));
    }
}
