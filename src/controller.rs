//! Navigation controller: the sense / update / replan / move loop.
//!
//! Owns the wall memory, the planner and the robot for one run. The physical
//! position is re-read from the robot every iteration, never assumed.

use std::sync::mpsc::Sender;

use tracing::{debug, error, info, warn};

use crate::ascii_utils::{render_knowledge, KnowledgeView};
use crate::cell::Cell;
use crate::config::NavigationConfig;
use crate::error::{NavError, Result};
use crate::map::MazeMap;
use crate::planner::{DfsPlanner, PlanStep};
use crate::robot::MouseRobot;
use crate::session::{Feedback, FailureReason, RunHandle, RunOutcome, RunRequest};
use crate::wall_memory::WallMemory;
use crate::walls::WallState;

pub struct NavigationController<R> {
    robot: R,
    memory: WallMemory,
    planner: DfsPlanner,
    start: Cell,
    goal: Cell,
    config: NavigationConfig,
    /// Cells physically occupied so far, start first.
    trail: Vec<Cell>,
    replans: usize,
}

impl<R: MouseRobot> NavigationController<R> {
    pub fn new(request: &RunRequest, robot: R, config: NavigationConfig) -> Result<Self> {
        request.validate()?;
        let map = MazeMap::new(request.width, request.height)?;
        Ok(Self {
            robot,
            memory: WallMemory::new(map),
            planner: DfsPlanner::new(request.start),
            start: request.start,
            goal: request.goal,
            config,
            trail: vec![request.start],
            replans: 0,
        })
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn memory(&self) -> &WallMemory {
        &self.memory
    }

    pub fn planner(&self) -> &DfsPlanner {
        &self.planner
    }

    pub fn replans(&self) -> usize {
        self.replans
    }

    /// Drives the run to a terminal outcome.
    ///
    /// Errors other than recoverable actuation failures abort the run as a fault.
    pub fn run(&mut self, handle: &RunHandle, feedback: Option<&Sender<Feedback>>) -> RunOutcome {
        let outcome = match self.drive(handle, feedback) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Navigation aborted: {}", e);
                RunOutcome::Failed(FailureReason::Fault(e.to_string()))
            }
        };

        info!(
            "Navigation ended after {} moves, {} replans, {} cells explored",
            self.trail.len() - 1,
            self.replans,
            self.memory.explored_count()
        );
        info!("Discovered maze:\n{}", self.render());
        outcome
    }

    fn drive(&mut self, handle: &RunHandle, feedback: Option<&Sender<Feedback>>) -> Result<RunOutcome> {
        if self.start == self.goal {
            info!("Start is the goal");
            return Ok(self.succeeded());
        }

        let mut failures = 0;
        loop {
            if handle.is_cancelled() {
                info!("Navigation cancelled at step {}", handle.step_count());
                return Ok(RunOutcome::Cancelled);
            }

            let position = match self.robot.current_position() {
                Ok(position) => position,
                Err(e) => {
                    self.note_failure(&mut failures, e)?;
                    continue;
                }
            };

            // A failed or unconfirmed command may still have moved the mouse.
            if self.trail.last() != Some(&position) {
                warn!(
                    "Mouse reports {} after last confirmed position {:?}",
                    position,
                    self.trail.last()
                );
                if self.arrive(position, handle, feedback) {
                    return Ok(self.succeeded());
                }
            }

            // Sensing
            let reading = match self.robot.sense_walls(position) {
                Ok(reading) => reading,
                Err(e) => {
                    self.note_failure(&mut failures, e)?;
                    continue;
                }
            };

            // Updating + plan check
            let blocked = self.memory.observe(position, &reading)?;
            if let Some(frontier) = self.planner.truncate_at_blocked(&blocked) {
                self.replans += 1;
                info!("Path blocked, replanning from {}", frontier);
            }

            let target = if self.planner.frontier() == Some(position) {
                match self.planner.next_move(self.memory.map())? {
                    PlanStep::Move(cell) => {
                        debug!("Advancing {} -> {}", position, cell);
                        cell
                    }
                    PlanStep::Backtrack(cell) => {
                        debug!("Backtracking {} -> {}", position, cell);
                        cell
                    }
                    PlanStep::SearchExhausted => {
                        info!("Search exhausted without reaching {}", self.goal);
                        return Ok(RunOutcome::Failed(FailureReason::NoPath));
                    }
                }
            } else {
                match self.planner.frontier() {
                    Some(frontier) => frontier,
                    None => return Ok(RunOutcome::Failed(FailureReason::NoPath)),
                }
            };

            let Some(hop) = self.next_hop(position, target)? else {
                let reason = format!("no known route from {} back to {}", position, target);
                error!("{}", reason);
                return Ok(RunOutcome::Failed(FailureReason::Fault(reason)));
            };

            // Moving
            match self.robot.move_to(hop) {
                Ok(()) => {
                    failures = 0;
                    if self.arrive(hop, handle, feedback) {
                        return Ok(self.succeeded());
                    }
                }
                Err(e) => self.note_failure(&mut failures, e)?,
            }
        }
    }

    /// Records the mouse standing on `cell` as one step. Returns whether it is the goal.
    fn arrive(&mut self, cell: Cell, handle: &RunHandle, feedback: Option<&Sender<Feedback>>) -> bool {
        self.trail.push(cell);
        let step_count = handle.record_move(cell);
        if let Some(tx) = feedback {
            // The requester may have gone away; the run continues regardless.
            let _ = tx.send(Feedback {
                current_cell: cell,
                step_count,
            });
        }
        if cell == self.goal {
            info!("Goal {} reached in {} steps", self.goal, step_count);
            return true;
        }
        false
    }

    /// First cell to move to on the way from `position` to `target`.
    fn next_hop(&self, position: Cell, target: Cell) -> Result<Option<Cell>> {
        let map = self.memory.map();
        if position.is_adjacent(target) && map.wall_between(position, target)? != WallState::Present
        {
            return Ok(Some(target));
        }
        Ok(map
            .route(position, target)
            .and_then(|route| route.first().copied()))
    }

    /// Counts a recoverable actuation failure; other errors are returned as-is.
    fn note_failure(&self, failures: &mut usize, err: NavError) -> Result<()> {
        let NavError::ActuationFailure(reason) = err else {
            return Err(err);
        };
        *failures += 1;
        warn!(
            "Actuation failure {}/{}: {}",
            failures, self.config.max_consecutive_failures, reason
        );
        if *failures > self.config.max_consecutive_failures {
            return Err(NavError::ActuationFailure(format!(
                "giving up after {} consecutive failures, last: {}",
                failures, reason
            )));
        }
        Ok(())
    }

    fn succeeded(&self) -> RunOutcome {
        RunOutcome::Succeeded {
            path: self.trail.clone(),
        }
    }

    /// ASCII view of what has been discovered so far.
    pub fn render(&self) -> String {
        render_knowledge(&KnowledgeView {
            memory: &self.memory,
            path: self.planner.path(),
            visited: self.planner.visited(),
            start: self.start,
            goal: self.goal,
            position: self.trail.last().copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::labyrinth_mock::{Labyrinth, SimulatedMouse};
    use crate::session::RunSession;
    use std::sync::Arc;

    fn drive(labyrinth: Labyrinth, start: Cell, goal: Cell) -> (RunOutcome, NavigationController<SimulatedMouse>) {
        let request = RunRequest {
            width: labyrinth.width(),
            height: labyrinth.height(),
            start,
            goal,
        };
        let mouse = SimulatedMouse::new(labyrinth, start).unwrap();
        let session = Arc::new(RunSession::new());
        let handle = session.start(&request).unwrap();
        let mut controller =
            NavigationController::new(&request, mouse, NavigationConfig::default()).unwrap();
        let outcome = controller.run(&handle, None);
        handle.finish(&outcome);
        (outcome, controller)
    }

    #[test]
    fn test_open_3x3_reaches_goal_in_four_moves() {
        let (outcome, controller) = drive(
            Labyrinth::open(3, 3).unwrap(),
            Cell::new(0, 0),
            Cell::new(2, 2),
        );
        let RunOutcome::Succeeded { path } = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(path.len(), 5);
        assert_eq!(path[1], Cell::new(0, 1));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
            assert_ne!(
                controller.memory().map().wall_between(pair[0], pair[1]).unwrap(),
                WallState::Present
            );
        }
    }

    #[test]
    fn test_walled_pair_gives_no_path_without_moving() {
        let mut labyrinth = Labyrinth::open(2, 1).unwrap();
        labyrinth.add_wall(Cell::new(0, 0), Direction::East);
        let (outcome, controller) = drive(labyrinth, Cell::new(0, 0), Cell::new(0, 1));

        assert_eq!(outcome, RunOutcome::Failed(FailureReason::NoPath));
        let stats = controller.robot().stats();
        assert_eq!(stats.move_commands(), 0);
        assert_eq!(stats.senses(), 1);
    }

    #[test]
    fn test_start_equal_to_goal() {
        let (outcome, controller) = drive(
            Labyrinth::open(2, 2).unwrap(),
            Cell::new(1, 1),
            Cell::new(1, 1),
        );
        assert_eq!(
            outcome,
            RunOutcome::Succeeded {
                path: vec![Cell::new(1, 1)]
            }
        );
        assert_eq!(controller.robot().stats().move_commands(), 0);
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let request = RunRequest {
            width: 3,
            height: 1,
            start: Cell::new(0, 0),
            goal: Cell::new(0, 2),
        };
        let mut mouse = SimulatedMouse::new(Labyrinth::open(3, 1).unwrap(), request.start).unwrap();
        mouse.fail_next_moves(2);
        let session = Arc::new(RunSession::new());
        let handle = session.start(&request).unwrap();
        let mut controller =
            NavigationController::new(&request, mouse, NavigationConfig::default()).unwrap();

        let outcome = controller.run(&handle, None);
        assert_eq!(
            outcome,
            RunOutcome::Succeeded {
                path: vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)]
            }
        );
        assert_eq!(handle.step_count(), 2);
        handle.finish(&outcome);
    }

    #[test]
    fn test_persistent_failures_abort_as_fault() {
        let request = RunRequest {
            width: 3,
            height: 1,
            start: Cell::new(0, 0),
            goal: Cell::new(0, 2),
        };
        let mut mouse = SimulatedMouse::new(Labyrinth::open(3, 1).unwrap(), request.start).unwrap();
        mouse.fail_next_moves(100);
        let session = Arc::new(RunSession::new());
        let handle = session.start(&request).unwrap();
        let config = NavigationConfig {
            max_consecutive_failures: 2,
        };
        let mut controller = NavigationController::new(&request, mouse, config).unwrap();

        let outcome = controller.run(&handle, None);
        assert!(matches!(outcome, RunOutcome::Failed(FailureReason::Fault(_))));
        assert_eq!(controller.robot().stats().move_commands(), 3);
        handle.finish(&outcome);
    }

    #[test]
    fn test_wall_on_committed_path_triggers_replan() {
        // 3x2, goal bottom-left. The mouse goes east along the top row first;
        // once it is on (0,2) the edge it came through closes behind it.
        let request = RunRequest {
            width: 3,
            height: 2,
            start: Cell::new(0, 0),
            goal: Cell::new(1, 0),
        };
        let mut labyrinth = Labyrinth::open(3, 2).unwrap();
        labyrinth.add_wall(Cell::new(0, 0), Direction::South);
        let mut mouse = SimulatedMouse::new(labyrinth, request.start).unwrap();
        mouse.inject_wall_after(2, Cell::new(0, 1), Direction::East);

        let session = Arc::new(RunSession::new());
        let handle = session.start(&request).unwrap();
        let mut controller =
            NavigationController::new(&request, mouse, NavigationConfig::default()).unwrap();
        let outcome = controller.run(&handle, None);
        handle.finish(&outcome);

        assert_eq!(controller.replans(), 1);
        let RunOutcome::Succeeded { path } = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(path.last(), Some(&Cell::new(1, 0)));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    fn drive_mouse(
        mouse: SimulatedMouse,
        start: Cell,
        goal: Cell,
    ) -> (RunOutcome, u64, NavigationController<SimulatedMouse>) {
        let request = RunRequest {
            width: mouse.labyrinth().width(),
            height: mouse.labyrinth().height(),
            start,
            goal,
        };
        let session = Arc::new(RunSession::new());
        let handle = session.start(&request).unwrap();
        let mut controller =
            NavigationController::new(&request, mouse, NavigationConfig::default()).unwrap();
        let outcome = controller.run(&handle, None);
        let steps = handle.step_count();
        handle.finish(&outcome);
        (outcome, steps, controller)
    }

    #[test]
    fn test_unconfirmed_move_onto_goal_succeeds() {
        let start = Cell::new(0, 0);
        let goal = Cell::new(0, 1);
        let mut mouse = SimulatedMouse::new(Labyrinth::open(2, 1).unwrap(), start).unwrap();
        mouse.slip_next_move(goal);

        let (outcome, steps, controller) = drive_mouse(mouse, start, goal);
        assert_eq!(
            outcome,
            RunOutcome::Succeeded {
                path: vec![start, goal]
            }
        );
        assert_eq!(steps, 1);
        assert_eq!(controller.robot().stats().move_commands(), 1);
    }

    #[test]
    fn test_drift_off_path_is_tracked_and_recovered() {
        let start = Cell::new(0, 0);
        let goal = Cell::new(2, 2);
        let mut mouse = SimulatedMouse::new(Labyrinth::open(3, 3).unwrap(), start).unwrap();
        // Commanded East, ends up South.
        mouse.slip_next_move(Cell::new(1, 0));

        let (outcome, steps, _) = drive_mouse(mouse, start, goal);
        let RunOutcome::Succeeded { path } = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(path[..2], [start, Cell::new(1, 0)]);
        assert_eq!(path.last(), Some(&goal));
        assert_eq!(steps as usize, path.len() - 1);
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    #[test]
    fn test_lost_in_closed_cell_is_fault() {
        let start = Cell::new(0, 0);
        let mut labyrinth = Labyrinth::open(3, 3).unwrap();
        labyrinth.add_wall(Cell::new(2, 2), Direction::North);
        labyrinth.add_wall(Cell::new(2, 2), Direction::West);
        let mut mouse = SimulatedMouse::new(labyrinth, start).unwrap();
        mouse.slip_next_move(Cell::new(2, 2));

        let (outcome, _, controller) = drive_mouse(mouse, start, Cell::new(2, 0));
        assert!(matches!(outcome, RunOutcome::Failed(FailureReason::Fault(_))));
        assert_eq!(controller.robot().stats().move_commands(), 1);
    }
}

