//! Tick driver around the navigation engine
//!
//! The engine never reads a clock. `TickTimer` is fed the current time by
//! the caller and decides when a tick is due; `Simulation` performs one
//! engine call per tick and applies the caller's policy for unreachable
//! tasks.

use crate::config::Config;
use crate::error::{NavError, Result};
use crate::grid::TaskId;
use crate::navigation::{NavigationEngine, TickOutcome};
use crate::run_log::{RunEvent, RunLog};
use log::{info, warn};
use serde::Deserialize;

/// What to do when tasks remain but none can be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreachablePolicy {
    /// Stop and surface the error
    #[default]
    Halt,
    /// Give up on the remaining tasks and finish
    Skip,
}

/// Fixed-delay tick gate driven by caller-supplied timestamps
#[derive(Debug, Clone)]
pub struct TickTimer {
    delay_ms: u64,
    /// `None` until the first tick is accepted, which then fires at once
    last_tick_ms: Option<u64>,
}

impl TickTimer {
    pub fn new(delay_ms: u64) -> Self {
        TickTimer { delay_ms, last_tick_ms: Some(0) }
    }

    /// Arm the timer so the next `ready` call fires without waiting
    pub fn start(&mut self) {
        self.last_tick_ms = None;
    }

    /// Restart the delay from `now_ms`
    pub fn reset(&mut self, now_ms: u64) {
        self.last_tick_ms = Some(now_ms);
    }

    /// True once more than `delay_ms` has passed since the last accepted tick
    pub fn ready(&mut self, now_ms: u64) -> bool {
        let due = match self.last_tick_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.delay_ms,
        };
        if due {
            self.last_tick_ms = Some(now_ms);
        }
        due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    Finished,
    Halted,
}

/// Result of a simulation tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimTick {
    Engine(TickOutcome),
    /// Remaining tasks were unreachable and have been skipped
    Skipped(Vec<TaskId>),
}

pub struct Simulation {
    engine: NavigationEngine,
    policy: UnreachablePolicy,
    status: SimStatus,
    skipped: Vec<TaskId>,
    ticks: u64,
    log: RunLog,
}

impl Simulation {
    pub fn new(engine: NavigationEngine, policy: UnreachablePolicy) -> Self {
        let status = if engine.is_finished() { SimStatus::Finished } else { SimStatus::Running };
        Simulation {
            engine,
            policy,
            status,
            skipped: Vec::new(),
            ticks: 0,
            log: RunLog::new(),
        }
    }

    /// Build the engine described by `config` with its unreachable policy
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = NavigationEngine::from_config(config)?;
        Ok(Self::new(engine, config.simulation.unreachable_policy))
    }

    /// Perform one engine call
    pub fn tick(&mut self) -> Result<SimTick> {
        match self.status {
            SimStatus::Finished => return Ok(SimTick::Engine(TickOutcome::Finished)),
            SimStatus::Halted => {
                return Err(NavError::PreconditionViolation("simulation has halted".into()));
            }
            SimStatus::Running => {}
        }

        self.ticks += 1;

        match self.engine.tick() {
            Ok(outcome) => {
                self.record(&outcome);
                if self.engine.is_finished() {
                    self.finish();
                }
                Ok(SimTick::Engine(outcome))
            }
            Err(NavError::NoReachableTask { remaining, from }) => match self.policy {
                UnreachablePolicy::Halt => {
                    warn!("Halting: {} task(s) unreachable from {}", remaining, from);
                    self.status = SimStatus::Halted;
                    self.log.record(self.ticks, RunEvent::Halted { remaining });
                    Err(NavError::NoReachableTask { remaining, from })
                }
                UnreachablePolicy::Skip => {
                    let task_ids: Vec<TaskId> = self
                        .engine
                        .world()
                        .remaining_tasks()
                        .into_iter()
                        .map(|(_, id)| id)
                        .collect();
                    warn!("Skipping unreachable tasks {:?}", task_ids);
                    self.skipped = task_ids.clone();
                    self.log.record(self.ticks, RunEvent::Skipped { task_ids: task_ids.clone() });
                    self.finish();
                    Ok(SimTick::Skipped(task_ids))
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Tick until finished, failing if `max_ticks` is reached first
    pub fn run(&mut self, max_ticks: u64) -> Result<u64> {
        while self.status == SimStatus::Running {
            if self.ticks >= max_ticks {
                return Err(NavError::PreconditionViolation(format!(
                    "simulation still running after {} ticks",
                    max_ticks
                )));
            }
            self.tick()?;
        }
        Ok(self.ticks)
    }

    fn record(&mut self, outcome: &TickOutcome) {
        let event = match outcome {
            TickOutcome::Planned(route) => match route.destination() {
                Some(target) => RunEvent::Planned {
                    task_id: route.task_id,
                    target,
                    steps: route.len(),
                },
                None => return,
            },
            TickOutcome::Moved { to } => RunEvent::Moved { to: *to },
            TickOutcome::Completed { task_id, at } => RunEvent::Completed { task_id: *task_id, at: *at },
            TickOutcome::Finished => return,
        };
        self.log.record(self.ticks, event);
    }

    fn finish(&mut self) {
        self.status = SimStatus::Finished;
        let completed = self.engine.completed_count();
        self.log.record(self.ticks, RunEvent::Finished { completed });
        info!(
            "Simulation finished after {} ticks: {} completed, {} skipped",
            self.ticks,
            completed,
            self.skipped.len()
        );
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn skipped(&self) -> &[TaskId] {
        &self.skipped
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }
}
