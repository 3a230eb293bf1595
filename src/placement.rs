//! Randomized placement of barriers and tasks

use crate::error::{NavError, Result};
use crate::grid::{check_dimensions, GridWorld, Position};
use crate::pathfinding::BfsTree;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

/// Parameters for generating a random world
#[derive(Debug, Clone)]
pub struct PlacementParams {
    /// Side length of the square grid
    pub size: i32,
    /// Agent start cell, never receives a barrier or task
    pub start: Position,
    pub num_tasks: usize,
    pub num_barriers: usize,
    /// Only accept layouts where every task can be reached from `start`
    pub require_reachable: bool,
    /// Upper bound on layouts tried before giving up
    pub max_attempts: u32,
}

impl PlacementParams {
    pub fn new(size: i32, num_tasks: usize, num_barriers: usize) -> Self {
        PlacementParams {
            size,
            start: Position::new(0, 0),
            num_tasks,
            num_barriers,
            require_reachable: true,
            max_attempts: 100,
        }
    }

    fn validate(&self) -> Result<()> {
        check_dimensions(self.size, self.size)?;

        if self.start.x < 0 || self.start.y < 0 || self.start.x >= self.size || self.start.y >= self.size {
            return Err(NavError::InvalidConfiguration(format!(
                "start {} is outside the {}x{} grid",
                self.start, self.size, self.size
            )));
        }

        let total = (self.size as usize) * (self.size as usize);
        let needed = self
            .num_barriers
            .checked_add(self.num_tasks)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                NavError::InvalidConfiguration(format!(
                    "{} barriers + {} tasks overflow the cell count",
                    self.num_barriers, self.num_tasks
                ))
            })?;
        if needed > total {
            return Err(NavError::InvalidConfiguration(format!(
                "{} barriers + {} tasks + start need {} cells but the grid has {}",
                self.num_barriers, self.num_tasks, needed, total
            )));
        }

        if self.max_attempts == 0 {
            return Err(NavError::InvalidConfiguration("max_attempts must be at least 1".into()));
        }

        Ok(())
    }
}

/// Generate a world from `params` using `rng`
///
/// Each attempt shuffles every non-start cell once and takes barriers then
/// tasks from the front, so all placements are distinct. Task ids follow
/// placement order.
pub fn place<R: Rng + ?Sized>(params: &PlacementParams, rng: &mut R) -> Result<GridWorld> {
    params.validate()?;

    let mut candidates: Vec<Position> = (0..params.size)
        .flat_map(|y| (0..params.size).map(move |x| Position::new(x, y)))
        .filter(|&pos| pos != params.start)
        .collect();

    for attempt in 1..=params.max_attempts {
        candidates.shuffle(rng);

        let (barriers, rest) = candidates.split_at(params.num_barriers);
        let tasks = &rest[..params.num_tasks];
        let world = GridWorld::with_cells(params.size, params.size, barriers, tasks)?;

        if !params.require_reachable || all_tasks_reachable(&world, params.start) {
            debug!(
                "[place] {}x{} grid with {} tasks and {} barriers accepted on attempt {}",
                params.size, params.size, params.num_tasks, params.num_barriers, attempt
            );
            return Ok(world);
        }

        debug!("[place] attempt {} left a task unreachable, reshuffling", attempt);
    }

    warn!(
        "[place] no layout with every task reachable after {} attempts",
        params.max_attempts
    );
    Err(NavError::InvalidConfiguration(format!(
        "could not place {} tasks reachable around {} barriers in {} attempts",
        params.num_tasks, params.num_barriers, params.max_attempts
    )))
}

/// True if a BFS from `start` reaches every remaining task
pub fn all_tasks_reachable(world: &GridWorld, start: Position) -> bool {
    let tree = BfsTree::build(world, start);
    world
        .remaining_tasks()
        .iter()
        .all(|&(pos, _)| tree.distance(pos).is_some())
}
