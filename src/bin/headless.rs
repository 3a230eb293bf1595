/// Run a simulation to completion without opening a window
///
/// Usage: headless [config.toml]
/// Prints the starting layout and the run summary. Exits non-zero if the
/// run halts or cannot be set up.

use log::{error, info};
use std::env;
use std::process;
use tasknav::{Config, Simulation};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Cannot read {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Config::load(),
    };

    let mut sim = match Simulation::from_config(&config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Cannot start simulation: {}", e);
            process::exit(1);
        }
    };

    let engine = sim.engine();
    println!("{}", engine.world().to_layout_string(engine.position()));

    let result = sim.run(config.simulation.max_ticks);
    println!("{}", sim.log().summary());

    if config.logging.save_run_log {
        match sim.log().save_to_file(&config.logging.run_log_path) {
            Ok(()) => info!("Run log saved to {}", config.logging.run_log_path),
            Err(e) => error!("Failed to save run log: {}", e),
        }
    }

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
