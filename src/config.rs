use crate::error::Result;
use crate::placement::PlacementParams;
use crate::grid::Position;
use crate::simulation::UnreachablePolicy;
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    pub size: i32,
    #[serde(default = "default_cell_pixels")]
    pub cell_pixels: f32,
    /// Fixed text layout to load instead of random placement
    #[serde(default)]
    pub layout_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub start_x: i32,
    #[serde(default)]
    pub start_y: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "default_num_tasks")]
    pub num_tasks: usize,
    #[serde(default = "default_num_barriers")]
    pub num_barriers: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_require_reachable")]
    pub require_reachable: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_movement_delay_ms")]
    pub movement_delay_ms: u64,
    #[serde(default)]
    pub unreachable_policy: UnreachablePolicy,
    /// Tick bound for headless runs
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_window_width")]
    pub window_width: i32,
    #[serde(default = "default_window_height")]
    pub window_height: i32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub save_run_log: bool,
    #[serde(default = "default_run_log_path")]
    pub run_log_path: String,
}

// Default values
fn default_grid_size() -> i32 { 20 }
fn default_cell_pixels() -> f32 { 30.0 }
fn default_num_tasks() -> usize { 10 }
fn default_num_barriers() -> usize { 30 }
fn default_require_reachable() -> bool { true }
fn default_max_attempts() -> u32 { 100 }
fn default_movement_delay_ms() -> u64 { 1000 }
fn default_max_ticks() -> u64 { 100_000 }
fn default_window_title() -> String { "Pathfinding Simulation".to_string() }
fn default_window_width() -> i32 { 1000 }
fn default_window_height() -> i32 { 600 }
fn default_font_size() -> f32 { 36.0 }
fn default_run_log_path() -> String { "run_log.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            cell_pixels: default_cell_pixels(),
            layout_file: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { start_x: 0, start_y: 0 }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            num_tasks: default_num_tasks(),
            num_barriers: default_num_barriers(),
            seed: None,
            require_reachable: default_require_reachable(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            movement_delay_ms: default_movement_delay_ms(),
            unreachable_policy: UnreachablePolicy::default(),
            max_ticks: default_max_ticks(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            font_size: default_font_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            save_run_log: false,
            run_log_path: default_run_log_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            agent: AgentConfig::default(),
            placement: PlacementConfig::default(),
            simulation: SimulationConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from config.toml, or use defaults if it is missing or invalid
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if !path.exists() {
            info!("No config.toml found, using default configuration");
            return Config::default();
        }

        match Self::load_from(path) {
            Ok(config) => {
                info!("Loaded configuration from config.toml");
                config
            }
            Err(e) => {
                warn!("Failed to load config.toml: {}", e);
                warn!("Using default configuration");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn start(&self) -> Position {
        Position::new(self.agent.start_x, self.agent.start_y)
    }

    /// Placement parameters for random world generation
    pub fn placement_params(&self) -> PlacementParams {
        PlacementParams {
            size: self.grid.size,
            start: self.start(),
            num_tasks: self.placement.num_tasks,
            num_barriers: self.placement.num_barriers,
            require_reachable: self.placement.require_reachable,
            max_attempts: self.placement.max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavError;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.grid.size, 20);
        assert_eq!(config.placement.num_tasks, 10);
        assert_eq!(config.placement.num_barriers, 30);
        assert_eq!(config.simulation.movement_delay_ms, 1000);
        assert_eq!(config.simulation.unreachable_policy, UnreachablePolicy::Halt);
        assert_eq!(config.start(), Position::new(0, 0));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [grid]
            size = 8

            [placement]
            seed = 99
            num_tasks = 3

            [simulation]
            unreachable_policy = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.size, 8);
        assert_eq!(config.grid.cell_pixels, 30.0);
        assert_eq!(config.placement.seed, Some(99));
        assert_eq!(config.placement.num_tasks, 3);
        assert_eq!(config.placement.num_barriers, 30);
        assert_eq!(config.simulation.unreachable_policy, UnreachablePolicy::Skip);

        let params = config.placement_params();
        assert_eq!(params.size, 8);
        assert!(params.require_reachable);
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let result = Config::parse("[grid]\nsize = \"big\"");
        assert!(matches!(result, Err(NavError::InvalidConfiguration(_))));
    }
}
