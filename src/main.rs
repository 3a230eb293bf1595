use arboard::Clipboard;
use log::{error, info};
use macroquad::prelude::*;
use std::sync::OnceLock;
use tasknav::{Cell, Config, GridWorld, Position, SimStatus, Simulation, TickTimer};

const GRID_LINE: Color = Color::new(0.0, 0.0, 0.0, 1.0);
const BARRIER: Color = Color::new(200.0 / 255.0, 0.0, 0.0, 1.0);
const TASK: Color = Color::new(0.0, 200.0 / 255.0, 0.0, 1.0);
const BUTTON: Color = Color::new(0.0, 200.0 / 255.0, 0.0, 1.0);
const BUTTON_HOVER: Color = Color::new(0.0, 1.0, 0.0, 1.0);

/// Draws the world, agent and info panel; built once from the config
struct Renderer {
    cell_pixels: f32,
    font_size: f32,
    panel_x: f32,
    button: Rect,
}

impl Renderer {
    fn new(config: &Config, world: &GridWorld) -> Self {
        let width = config.visual.window_width as f32;
        let height = config.visual.window_height as f32;
        Renderer {
            cell_pixels: config.grid.cell_pixels,
            font_size: config.visual.font_size,
            panel_x: world.cols() as f32 * config.grid.cell_pixels + 20.0,
            button: Rect::new(width - 150.0, height - 50.0, 140.0, 40.0),
        }
    }

    fn draw_grid(&self, world: &GridWorld) {
        let size = self.cell_pixels;
        for y in 0..world.rows() {
            for x in 0..world.cols() {
                let px = x as f32 * size;
                let py = y as f32 * size;
                match world.cell(Position::new(x, y)) {
                    Some(Cell::Barrier) => draw_rectangle(px, py, size, size, BARRIER),
                    Some(Cell::Task(id)) => {
                        draw_rectangle(px, py, size, size, TASK);
                        draw_text(
                            &id.to_string(),
                            px + size / 3.0,
                            py + size * 0.8,
                            self.font_size * size / 30.0 * 0.8,
                            BLACK,
                        );
                    }
                    _ => draw_rectangle(px, py, size, size, WHITE),
                }
                draw_rectangle_lines(px, py, size, size, 1.0, GRID_LINE);
            }
        }
    }

    fn draw_agent(&self, pos: Position) {
        let size = self.cell_pixels;
        draw_circle(
            pos.x as f32 * size + size / 2.0,
            pos.y as f32 * size + size / 2.0,
            size * 0.4,
            BLUE,
        );
    }

    fn draw_info(&self, sim: &Simulation, status: Option<&str>) {
        let engine = sim.engine();
        let completed: Vec<String> = engine.completed_tasks().iter().map(|id| id.to_string()).collect();
        let lines = [
            format!("Tasks Completed: {}", engine.completed_count()),
            format!("Position: ({}, {})", engine.position().x, engine.position().y),
            format!("Completed Tasks: {}", completed.join(", ")),
        ];

        for (i, line) in lines.iter().enumerate() {
            draw_text(line, self.panel_x, 40.0 + i as f32 * 40.0, self.font_size, BLACK);
        }

        if let Some(status) = status {
            draw_text(status, self.panel_x, 160.0, self.font_size * 0.6, BLACK);
        }
    }

    fn draw_start_button(&self) {
        let (mx, my) = mouse_position();
        let color = if self.button.contains(vec2(mx, my)) { BUTTON_HOVER } else { BUTTON };
        draw_rectangle(self.button.x, self.button.y, self.button.w, self.button.h, color);

        let dims = measure_text("Start", None, self.font_size as u16, 1.0);
        draw_text(
            "Start",
            self.button.x + (self.button.w - dims.width) / 2.0,
            self.button.y + (self.button.h + dims.offset_y) / 2.0,
            self.font_size,
            WHITE,
        );
    }

    fn start_clicked(&self) -> bool {
        if !is_mouse_button_pressed(MouseButton::Left) {
            return false;
        }
        let (mx, my) = mouse_position();
        self.button.contains(vec2(mx, my))
    }
}

fn copy_to_clipboard(text: &str) {
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                error!("Failed to copy to clipboard: {}", e);
            } else {
                info!("Grid layout copied to clipboard!");
                // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
        }
        Err(e) => {
            error!("Failed to access clipboard: {}", e);
        }
    }
}

fn save_run_log(config: &Config, sim: &Simulation) {
    if !config.logging.save_run_log {
        return;
    }
    match sim.log().save_to_file(&config.logging.run_log_path) {
        Ok(()) => info!("Run log saved to {}", config.logging.run_log_path),
        Err(e) => error!("Failed to save run log: {}", e),
    }
}

fn now_ms() -> u64 {
    (get_time() * 1000.0) as u64
}

/// Config shared by `window_conf` and `main`, loaded once after the logger
fn config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        Config::load()
    })
}

fn window_conf() -> Conf {
    let config = config();
    Conf {
        window_title: config.visual.window_title.clone(),
        window_width: config.visual.window_width,
        window_height: config.visual.window_height,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = config();

    let mut sim = match Simulation::from_config(config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Cannot start simulation: {}", e);
            return;
        }
    };

    let renderer = Renderer::new(config, sim.engine().world());
    let mut timer = TickTimer::new(config.simulation.movement_delay_ms);
    let mut started = false;
    let mut failure: Option<String> = None;

    loop {
        if !started && renderer.start_clicked() {
            started = true;
            timer.start();
        }

        // Copy layout to clipboard on C key
        if is_key_pressed(KeyCode::C) {
            let engine = sim.engine();
            copy_to_clipboard(&engine.world().to_layout_string(engine.position()));
        }

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if started && sim.status() == SimStatus::Running && timer.ready(now_ms()) {
            if let Err(e) = sim.tick() {
                error!("{}", e);
                failure = Some(e.to_string());
            }
        }

        let status = match (&failure, sim.status()) {
            (Some(message), _) => Some(message.clone()),
            (None, SimStatus::Finished) if !sim.skipped().is_empty() => {
                Some(format!("Done, skipped {} unreachable task(s)", sim.skipped().len()))
            }
            (None, SimStatus::Finished) => Some("All tasks completed".to_string()),
            _ => None,
        };

        clear_background(WHITE);
        renderer.draw_grid(sim.engine().world());
        renderer.draw_agent(sim.engine().position());
        renderer.draw_info(&sim, status.as_deref());
        if !started {
            renderer.draw_start_button();
        }

        next_frame().await
    }

    save_run_log(config, &sim);
}
