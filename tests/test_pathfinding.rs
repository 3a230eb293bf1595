mod common;

use common::{brute_force_distances, flip_layout_both, flip_layout_horizontal, flip_layout_vertical, parse_layout, random_world};
use tasknav::pathfinding::{find_path, format_path, nearest_task, BfsTree};
use tasknav::{GridWorld, Position};

/// Visualize a path on a grid
fn visualize_path(grid: &GridWorld, path: &[Position], start: Position, dest: Position) -> String {
    let mut result = String::new();

    result.push_str(&format!("\nPath: {}\n", format_path(path)));
    result.push_str(&format!("Length: {} steps\n\n", path.len()));

    for y in 0..grid.rows() {
        for x in 0..grid.cols() {
            let pos = Position::new(x, y);
            let symbol = if pos == start {
                'S'
            } else if pos == dest {
                'D'
            } else if path.contains(&pos) {
                '*'
            } else if !grid.is_passable(pos) {
                '█'
            } else {
                '.'
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}

fn assert_valid_route(grid: &GridWorld, start: Position, path: &[Position]) {
    let mut prev = start;
    for &step in path {
        assert!(prev.is_adjacent(&step), "{} -> {} is not an orthogonal step", prev, step);
        assert!(grid.is_passable(step), "route enters blocked cell {}", step);
        prev = step;
    }
}

#[test]
fn test_bfs_matches_brute_force_on_random_grids() {
    for seed in 0..40 {
        let size = 3 + (seed % 6) as i32;
        let grid = random_world(seed, size, 0.3, 0);
        let start = Position::new(0, 0);
        let expected = brute_force_distances(&grid, start);
        let tree = BfsTree::build(&grid, start);

        for y in 0..size {
            for x in 0..size {
                let goal = Position::new(x, y);
                let want = expected[x as usize][y as usize];
                assert_eq!(tree.distance(goal), want, "seed {} distance to {}", seed, goal);

                match find_path(&grid, start, goal) {
                    Some(path) => {
                        assert_eq!(Some(path.len() as u32), want, "seed {} path to {}", seed, goal);
                        assert_valid_route(&grid, start, &path);
                        if !path.is_empty() {
                            assert_eq!(path.last(), Some(&goal));
                        }
                    }
                    None => assert_eq!(want, None, "seed {} missed path to {}", seed, goal),
                }
            }
        }
    }
}

#[test]
fn test_u_corridor() {
    println!("\n=== U Corridor ===");

    let layout = "
        s□□□□
        ■■■■□
        t□□□□
    ";
    let (grid, start) = parse_layout(layout);
    let dest = Position::new(0, 2);

    let path = find_path(&grid, start, dest).expect("path around the wall");
    println!("{}", visualize_path(&grid, &path, start, dest));

    assert_eq!(path.len(), 10);
    assert_valid_route(&grid, start, &path);
}

#[test]
fn test_u_corridor_all_flips() {
    let layout = "
        s□□□□
        ■■■■□
        t□□□□
    ";

    for variant in [
        layout.to_string(),
        flip_layout_horizontal(layout),
        flip_layout_vertical(layout),
        flip_layout_both(layout),
    ] {
        let (grid, start) = parse_layout(&variant);
        let route = nearest_task(&grid, start).expect("task reachable");
        assert_eq!(route.len(), 10, "layout:\n{}", variant);
        assert_valid_route(&grid, start, &route.waypoints);
    }
}

#[test]
fn test_nearest_prefers_path_distance_over_straight_line() {
    // Task 1 at (2,0) is two cells away as the crow flies but behind a wall;
    // task 2 at (0,3) is three steps straight down.
    let layout = "
        s■t□
        □■■□
        □□□□
        t□□□
    ";
    let (grid, start) = parse_layout(layout);

    let route = nearest_task(&grid, start).unwrap();
    assert_eq!(route.destination(), Some(Position::new(0, 3)));
    assert_eq!(route.len(), 3);
}

#[test]
fn test_blocked_goal_has_no_path() {
    let layout = "
        s□□
        □■□
        □□□
    ";
    let (grid, start) = parse_layout(layout);
    assert_eq!(find_path(&grid, start, Position::new(1, 1)), None);
    assert_eq!(find_path(&grid, start, Position::new(3, 3)), None);
}

#[test]
fn test_large_open_grid_distance() {
    let grid = GridWorld::new(200, 200).unwrap();
    let tree = BfsTree::build(&grid, Position::new(0, 0));
    assert_eq!(tree.distance(Position::new(199, 199)), Some(398));
}
