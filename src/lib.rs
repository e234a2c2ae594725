//! Micromouse maze navigation.
//!
//! A mouse starts in an unknown rectilinear maze and has to reach a goal cell.
//! Walls are discovered by sensing from the current cell; a depth-first search
//! with a fixed North, East, South, West neighbour order picks the next move,
//! and a newly discovered wall that cuts the committed path only rewinds the
//! path to the cell before it.
//!
//! - [`map`], [`wall_memory`]: what is known about the maze
//! - [`planner`]: the explicit-stack DFS
//! - [`controller`]: the sense / update / replan / move loop
//! - [`session`]: run lifecycle, status and cancellation
//! - [`server`], [`client`]: the run/status protocol over TCP
//! - [`labyrinth_mock`]: a simulated maze and mouse

pub mod ascii_utils;
pub mod cell;
pub mod client;
pub mod config;
pub mod controller;
pub mod direction;
pub mod error;
pub mod labyrinth_mock;
pub mod map;
pub mod mouse;
pub mod network;
pub mod planner;
pub mod protocol;
pub mod robot;
pub mod server;
pub mod session;
pub mod wall_memory;
pub mod walls;

pub use cell::Cell;
pub use direction::Direction;
pub use error::{NavError, Result};
pub use robot::MouseRobot;
pub use session::{
    FailureReason, Feedback, RunOutcome, RunRequest, RunSession, RunState, RunStatus,
};
pub use walls::{WallState, Walls};

/// Default address of the run/status server.
pub const ADDRESS: &str = "localhost:8778";
