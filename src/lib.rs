pub mod config;
pub mod error;
pub mod grid;
pub mod navigation;
pub mod pathfinding;
pub mod placement;
pub mod run_log;
pub mod simulation;

pub use config::Config;
pub use error::{NavError, Result};
pub use grid::{Cell, GridWorld, Position, TaskId};
pub use navigation::{MoveState, NavigationEngine, StepOutcome, TickOutcome};
pub use pathfinding::{find_path, Route};
pub use simulation::{SimStatus, SimTick, Simulation, TickTimer, UnreachablePolicy};
