//! Agent state machine: plan a route to the nearest task, then walk it one cell per call

use crate::config::Config;
use crate::error::{NavError, Result};
use crate::grid::{Cell, GridWorld, Position, TaskId};
use crate::pathfinding::{nearest_task, Route};
use crate::placement::{place, PlacementParams};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::fs;

/// Movement state of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    EnRoute,
}

/// Everything the engine tracks about the agent
#[derive(Debug, Clone)]
pub struct AgentState {
    pub position: Position,
    pub state: MoveState,
    /// Remaining waypoints, front is the next cell to enter
    pub route: VecDeque<Position>,
    /// Task the current route leads to
    pub target: Option<(Position, TaskId)>,
    pub completed_count: usize,
    /// Completed task ids in completion order
    pub completed_tasks: Vec<TaskId>,
}

impl AgentState {
    pub fn new(position: Position) -> Self {
        AgentState {
            position,
            state: MoveState::Idle,
            route: VecDeque::new(),
            target: None,
            completed_count: 0,
            completed_tasks: Vec::new(),
        }
    }
}

/// Result of a single `advance_one_step` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved one cell, route continues
    Moved { to: Position },
    /// Moved onto the target cell and completed its task
    Completed { task_id: TaskId, at: Position },
}

/// Result of one driver tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A route to the nearest task was planned
    Planned(Route),
    Moved { to: Position },
    Completed { task_id: TaskId, at: Position },
    /// Idle with nothing left to do
    Finished,
}

impl From<StepOutcome> for TickOutcome {
    fn from(step: StepOutcome) -> Self {
        match step {
            StepOutcome::Moved { to } => TickOutcome::Moved { to },
            StepOutcome::Completed { task_id, at } => TickOutcome::Completed { task_id, at },
        }
    }
}

/// Owns the world and the agent; the only place agent state changes
#[derive(Debug, Clone)]
pub struct NavigationEngine {
    world: GridWorld,
    agent: AgentState,
}

impl NavigationEngine {
    /// Random world of `grid_size`² cells with the agent starting at (0, 0)
    ///
    /// Every task is guaranteed reachable from the start. Without a seed the
    /// layout is drawn from OS entropy.
    pub fn new(grid_size: i32, num_tasks: usize, num_barriers: usize, seed: Option<u64>) -> Result<Self> {
        let params = PlacementParams::new(grid_size, num_tasks, num_barriers);
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = place(&params, &mut rng)?;
        Self::with_world(world, params.start)
    }

    /// Engine over an existing world
    pub fn with_world(world: GridWorld, start: Position) -> Result<Self> {
        match world.cell(start) {
            Some(Cell::Empty) => {}
            Some(Cell::Barrier) => {
                return Err(NavError::InvalidConfiguration(format!("start {} is a barrier", start)));
            }
            Some(Cell::Task(id)) => {
                return Err(NavError::InvalidConfiguration(format!(
                    "start {} holds task {}",
                    start, id
                )));
            }
            None => {
                return Err(NavError::InvalidConfiguration(format!(
                    "start {} is outside the {}x{} grid",
                    start,
                    world.cols(),
                    world.rows()
                )));
            }
        }

        Ok(NavigationEngine {
            world,
            agent: AgentState::new(start),
        })
    }

    /// Build from configuration: a layout file if one is set, random placement otherwise
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(path) = &config.grid.layout_file {
            let text = fs::read_to_string(path)?;
            let (world, start) = GridWorld::from_layout(&text)?;
            info!("Loaded {}x{} layout from {}", world.cols(), world.rows(), path);
            return Self::with_world(world, start);
        }

        let params = config.placement_params();
        let mut rng = match config.placement.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = place(&params, &mut rng)?;
        Self::with_world(world, params.start)
    }

    /// Plan a route to the nearest reachable task and start moving
    ///
    /// Requires the agent to be idle with tasks remaining. Fails with
    /// `NoReachableTask` if tasks remain but none can be reached.
    pub fn select_nearest_task(&mut self) -> Result<Route> {
        if self.agent.state != MoveState::Idle {
            return Err(NavError::PreconditionViolation(
                "select_nearest_task called while en route".into(),
            ));
        }

        let remaining = self.world.remaining_count();
        if remaining == 0 {
            return Err(NavError::PreconditionViolation(
                "select_nearest_task called with no tasks remaining".into(),
            ));
        }

        let from = self.agent.position;
        let route = match nearest_task(&self.world, from) {
            Some(route) => route,
            None => {
                warn!("{} task(s) remain but none is reachable from {}", remaining, from);
                return Err(NavError::NoReachableTask { remaining, from });
            }
        };

        let destination = route.destination().ok_or_else(|| {
            NavError::PreconditionViolation(format!("agent at {} is already on task {}", from, route.task_id))
        })?;

        debug!(
            "Planned route to task {} at {}: {} steps",
            route.task_id,
            destination,
            route.len()
        );

        self.agent.route = route.waypoints.iter().copied().collect();
        self.agent.target = Some((destination, route.task_id));
        self.agent.state = MoveState::EnRoute;
        Ok(route)
    }

    /// Move the agent one cell along its route
    ///
    /// Entering the final waypoint completes its task and returns the
    /// engine to `Idle`.
    pub fn advance_one_step(&mut self) -> Result<StepOutcome> {
        if self.agent.state != MoveState::EnRoute {
            return Err(NavError::PreconditionViolation(
                "advance_one_step called while idle".into(),
            ));
        }

        let next = self.agent.route.front().copied().ok_or_else(|| {
            NavError::PreconditionViolation("en route with an empty route".into())
        })?;

        if !next.is_adjacent(&self.agent.position) || !self.world.is_passable(next) {
            return Err(NavError::PreconditionViolation(format!(
                "route step {} -> {} is not a move onto an adjacent passable cell",
                self.agent.position, next
            )));
        }

        self.agent.route.pop_front();
        self.agent.position = next;

        if !self.agent.route.is_empty() {
            return Ok(StepOutcome::Moved { to: next });
        }

        let task_id = self.world.complete_task(next)?;
        self.agent.completed_tasks.push(task_id);
        self.agent.completed_count += 1;
        self.agent.target = None;
        self.agent.state = MoveState::Idle;

        info!(
            "Completed task {} at {} ({} done, {} left)",
            task_id,
            next,
            self.agent.completed_count,
            self.world.remaining_count()
        );

        Ok(StepOutcome::Completed { task_id, at: next })
    }

    /// One driver step: plan when idle with tasks left, otherwise advance
    pub fn tick(&mut self) -> Result<TickOutcome> {
        match self.agent.state {
            MoveState::EnRoute => Ok(self.advance_one_step()?.into()),
            MoveState::Idle if self.world.remaining_count() > 0 => {
                Ok(TickOutcome::Planned(self.select_nearest_task()?))
            }
            MoveState::Idle => Ok(TickOutcome::Finished),
        }
    }

    /// Idle with no tasks left; no further transitions are possible
    pub fn is_finished(&self) -> bool {
        self.agent.state == MoveState::Idle && self.world.remaining_count() == 0
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn position(&self) -> Position {
        self.agent.position
    }

    pub fn state(&self) -> MoveState {
        self.agent.state
    }

    pub fn route(&self) -> &VecDeque<Position> {
        &self.agent.route
    }

    pub fn current_target(&self) -> Option<(Position, TaskId)> {
        self.agent.target
    }

    pub fn completed_count(&self) -> usize {
        self.agent.completed_count
    }

    pub fn completed_tasks(&self) -> &[TaskId] {
        &self.agent.completed_tasks
    }
}
