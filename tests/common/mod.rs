#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tasknav::{Cell, GridWorld, NavigationEngine, Position, StepOutcome};

/// Parse a layout, panicking with the parse error on failure
pub fn parse_layout(layout: &str) -> (GridWorld, Position) {
    GridWorld::from_layout(layout).unwrap_or_else(|e| panic!("bad test layout: {}", e))
}

pub fn engine_from_layout(layout: &str) -> NavigationEngine {
    let (world, start) = parse_layout(layout);
    NavigationEngine::with_world(world, start).unwrap()
}

fn layout_rows(layout: &str) -> Vec<Vec<char>> {
    layout
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.chars().collect())
        .collect()
}

fn join_rows(rows: Vec<Vec<char>>) -> String {
    rows.into_iter()
        .map(|r| r.into_iter().collect::<String>() + "\n")
        .collect()
}

/// Flip layout horizontally (mirror left-right)
pub fn flip_layout_horizontal(layout: &str) -> String {
    let rows = layout_rows(layout)
        .into_iter()
        .map(|mut r| {
            r.reverse();
            r
        })
        .collect();
    join_rows(rows)
}

/// Flip layout vertically (mirror top-bottom)
pub fn flip_layout_vertical(layout: &str) -> String {
    let mut rows = layout_rows(layout);
    rows.reverse();
    join_rows(rows)
}

/// Flip layout both horizontally and vertically
pub fn flip_layout_both(layout: &str) -> String {
    flip_layout_vertical(&flip_layout_horizontal(layout))
}

/// Shortest step counts from `source` by repeated relaxation
///
/// Independent of the BFS under test: keeps lowering each passable cell's
/// distance to 1 + its best neighbour until nothing changes.
pub fn brute_force_distances(world: &GridWorld, source: Position) -> Vec<Vec<Option<u32>>> {
    let cols = world.cols() as usize;
    let rows = world.rows() as usize;
    let mut dist: Vec<Vec<Option<u32>>> = vec![vec![None; rows]; cols];

    if !world.is_passable(source) {
        return dist;
    }
    dist[source.x as usize][source.y as usize] = Some(0);

    let mut changed = true;
    while changed {
        changed = false;
        for x in 0..cols {
            for y in 0..rows {
                let pos = Position::new(x as i32, y as i32);
                if !world.is_passable(pos) {
                    continue;
                }
                for n in pos.neighbors() {
                    if !world.is_passable(n) {
                        continue;
                    }
                    if let Some(d) = dist[n.x as usize][n.y as usize] {
                        let candidate = d + 1;
                        if dist[x][y].map_or(true, |cur| candidate < cur) {
                            dist[x][y] = Some(candidate);
                            changed = true;
                        }
                    }
                }
            }
        }
    }

    dist
}

/// Random world with roughly `density` of cells blocked, start at (0,0) kept free
pub fn random_world(seed: u64, size: i32, density: f64, num_tasks: usize) -> GridWorld {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut barriers = Vec::new();
    let mut free = Vec::new();

    for y in 0..size {
        for x in 0..size {
            let pos = Position::new(x, y);
            if pos == Position::new(0, 0) {
                continue;
            }
            if rng.gen_bool(density) {
                barriers.push(pos);
            } else {
                free.push(pos);
            }
        }
    }

    let tasks: Vec<Position> = free.into_iter().take(num_tasks).collect();
    GridWorld::with_cells(size, size, &barriers, &tasks).unwrap()
}

/// Drive an engine with `tick` until it finishes or stops on an error
///
/// Returns every cell the agent entered, in order.
pub fn drive(engine: &mut NavigationEngine, max_ticks: usize) -> Vec<Position> {
    let mut visited = Vec::new();
    for _ in 0..max_ticks {
        if engine.is_finished() {
            break;
        }
        match engine.state() {
            tasknav::MoveState::Idle => {
                if engine.select_nearest_task().is_err() {
                    break;
                }
            }
            tasknav::MoveState::EnRoute => {
                let before = engine.position();
                let outcome = engine.advance_one_step().unwrap();
                let to = match outcome {
                    StepOutcome::Moved { to } => to,
                    StepOutcome::Completed { at, .. } => at,
                };
                assert!(before.is_adjacent(&to), "jumped from {} to {}", before, to);
                visited.push(to);
            }
        }
    }
    visited
}

/// Count cells of each class: (empty, barrier, task)
pub fn census(world: &GridWorld) -> (usize, usize, usize) {
    let mut counts = (0, 0, 0);
    for y in 0..world.rows() {
        for x in 0..world.cols() {
            match world.cell(Position::new(x, y)) {
                Some(Cell::Empty) => counts.0 += 1,
                Some(Cell::Barrier) => counts.1 += 1,
                Some(Cell::Task(_)) => counts.2 += 1,
                None => {}
            }
        }
    }
    counts
}
