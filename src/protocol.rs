//! Messages of the run/status protocol.
//!
//! Enums are externally tagged, so a request reads `{"StartRun": {...}}` and a
//! unit request is the bare string `"GetStatus"`.

use serde::{Deserialize, Serialize};

use crate::session::{Feedback, RunOutcome, RunRequest, RunStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    StartRun(RunRequest),
    CancelRun,
    GetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartRunResult {
    Ok,
    AlreadyRunning,
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    StartRunResult(StartRunResult),
    Feedback(Feedback),
    RunResult(RunOutcome),
    CancelRunResult(bool),
    Status(RunStatus),
    Error(String),
}
