use crate::error::Result;
use crate::grid::{Position, TaskId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Something that happened during a simulation tick
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RunEvent {
    /// Route planned to a task
    Planned { task_id: TaskId, target: Position, steps: usize },
    /// Agent moved one cell
    Moved { to: Position },
    /// Agent reached and completed a task
    Completed { task_id: TaskId, at: Position },
    /// Remaining tasks given up as unreachable
    Skipped { task_ids: Vec<TaskId> },
    /// Simulation stopped with unreachable tasks left
    Halted { remaining: usize },
    /// No tasks left
    Finished { completed: usize },
}

/// Event with the tick it happened on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub tick: u64,
    #[serde(flatten)]
    pub event: RunEvent,
}

/// Ordered record of a simulation run
#[derive(Clone, Debug, Default)]
pub struct RunLog {
    events: Vec<LoggedEvent>,
}

impl RunLog {
    pub fn new() -> Self {
        RunLog { events: Vec::new() }
    }

    pub fn record(&mut self, tick: u64, event: RunEvent) {
        self.events.push(LoggedEvent { tick, event });
    }

    /// Get all logged events
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Save log to JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let events: Vec<LoggedEvent> = serde_json::from_str(&json)?;
        Ok(RunLog { events })
    }

    /// Print log to console
    pub fn print(&self) {
        println!("\n=== Run Log ({} events) ===", self.events.len());
        for logged in &self.events {
            println!("[tick {:5}] {:?}", logged.tick, logged.event);
        }
        println!("=== End of Log ===\n");
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let mut routes = 0;
        let mut steps = 0;
        let mut completed = Vec::new();
        let mut skipped = Vec::new();
        let mut outcome = "running";

        for logged in &self.events {
            match &logged.event {
                RunEvent::Planned { .. } => routes += 1,
                RunEvent::Moved { .. } => steps += 1,
                RunEvent::Completed { task_id, .. } => {
                    steps += 1;
                    completed.push(task_id.to_string());
                }
                RunEvent::Skipped { task_ids } => {
                    skipped.extend(task_ids.iter().map(|id| id.to_string()));
                }
                RunEvent::Halted { .. } => outcome = "halted",
                RunEvent::Finished { .. } => outcome = "finished",
            }
        }

        let ticks = self.events.last().map(|e| e.tick).unwrap_or(0);

        format!(
            "Outcome: {} after {} ticks\n\
             Routes planned: {}, cells moved: {}\n\
             Completed tasks ({}): {}\n\
             Skipped tasks ({}): {}",
            outcome,
            ticks,
            routes,
            steps,
            completed.len(),
            completed.join(", "),
            skipped.len(),
            skipped.join(", ")
        )
    }
}
