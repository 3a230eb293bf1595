use crate::grid::{GridWorld, Position, TaskId};
use log::{debug, trace};
use std::collections::VecDeque;

/// A planned route to a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Task the route leads to
    pub task_id: TaskId,
    /// Cells to visit, excluding the origin and ending on the task cell
    pub waypoints: Vec<Position>,
}

impl Route {
    /// Final cell of the route (the task cell)
    pub fn destination(&self) -> Option<Position> {
        self.waypoints.last().copied()
    }

    /// Number of steps needed to reach the task
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Breadth-first search tree rooted at one cell
///
/// Holds the step distance and parent of every cell reachable from the
/// origin over the 4-connected passable cells. Unreachable cells have no
/// distance.
pub struct BfsTree {
    origin: Position,
    cols: i32,
    rows: i32,
    distances: Vec<Option<u32>>,
    parents: Vec<Option<usize>>,
}

impl BfsTree {
    /// Expand the whole reachable region from `origin`
    pub fn build(world: &GridWorld, origin: Position) -> Self {
        Self::search(world, origin, None)
    }

    /// Expand from `origin`, stopping once `goal` is dequeued
    fn search(world: &GridWorld, origin: Position, goal: Option<Position>) -> Self {
        let mut tree = BfsTree {
            origin,
            cols: world.cols(),
            rows: world.rows(),
            distances: vec![None; world.cell_count()],
            parents: vec![None; world.cell_count()],
        };

        if !world.is_passable(origin) {
            trace!("[bfs] origin {} is not passable", origin);
            return tree;
        }

        let mut queue = VecDeque::new();
        let origin_index = world.index(origin);
        tree.distances[origin_index] = Some(0);
        queue.push_back(origin_index);

        let mut expanded = 0usize;
        while let Some(current) = queue.pop_front() {
            let pos = world.position(current);
            expanded += 1;

            if goal == Some(pos) {
                break;
            }

            let next_distance = tree.distances[current].unwrap_or(0) + 1;
            for neighbor in pos.neighbors() {
                if !world.is_passable(neighbor) {
                    continue;
                }
                let index = world.index(neighbor);
                if tree.distances[index].is_some() {
                    continue;
                }
                tree.distances[index] = Some(next_distance);
                tree.parents[index] = Some(current);
                queue.push_back(index);
            }
        }

        trace!("[bfs] from {} expanded {} cells", origin, expanded);
        tree
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    /// Shortest step count from the origin, `None` if unreachable
    pub fn distance(&self, to: Position) -> Option<u32> {
        let index = self.index_of(to)?;
        self.distances[index]
    }

    /// Route from the origin (exclusive) to `to` (inclusive)
    pub fn path_to(&self, to: Position) -> Option<Vec<Position>> {
        let mut index = self.index_of(to)?;
        self.distances[index]?;

        let mut path = Vec::new();
        while let Some(parent) = self.parents[index] {
            path.push(self.position_of(index));
            index = parent;
        }
        path.reverse();
        Some(path)
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.cols || pos.y >= self.rows {
            return None;
        }
        Some((pos.x + pos.y * self.cols) as usize)
    }

    fn position_of(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index % self.cols, index / self.cols)
    }
}

/// Find a shortest 4-connected path from start to goal
///
/// Returns the cells after `start` up to and including `goal`, an empty
/// path when they coincide, or `None` if no path exists.
pub fn find_path(world: &GridWorld, start: Position, goal: Position) -> Option<Vec<Position>> {
    if !world.is_passable(goal) {
        return None;
    }
    BfsTree::search(world, start, Some(goal)).path_to(goal)
}

/// Pick the remaining task with the shortest route from `from`
///
/// Unreachable tasks are ignored. Among equally distant tasks the one with
/// the lowest (x, y) wins. Returns `None` if no task can be reached.
pub fn nearest_task(world: &GridWorld, from: Position) -> Option<Route> {
    let tree = BfsTree::build(world, from);

    let (target, task_id, distance) = world
        .remaining_tasks()
        .into_iter()
        .filter_map(|(pos, id)| tree.distance(pos).map(|d| (pos, id, d)))
        .min_by_key(|&(pos, _, d)| (d, pos))?;

    debug!(
        "[nearest_task] from {} chose task {} at {} ({} steps)",
        from, task_id, target, distance
    );

    let waypoints = tree.path_to(target)?;
    Some(Route { task_id, waypoints })
}

/// Format path for display
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    let mut result = String::new();
    for (i, pos) in path.iter().enumerate() {
        if i > 0 {
            result.push_str(" -> ");
        }
        result.push_str(&format!("({},{})", pos.x, pos.y));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_straight_line() {
        let grid = GridWorld::new(5, 5).unwrap();
        let path = find_path(&grid, p(0, 0), p(0, 3)).unwrap();
        assert_eq!(path, vec![p(0, 1), p(0, 2), p(0, 3)]);
    }

    #[test]
    fn test_same_cell_is_empty_path() {
        let grid = GridWorld::new(3, 3).unwrap();
        assert_eq!(find_path(&grid, p(1, 1), p(1, 1)), Some(vec![]));
    }

    #[test]
    fn test_detour_around_wall() {
        // Vertical wall at x=1 from y=0..3, gap at y=3
        let barriers = [p(1, 0), p(1, 1), p(1, 2)];
        let grid = GridWorld::with_cells(4, 4, &barriers, &[]).unwrap();

        let path = find_path(&grid, p(0, 0), p(2, 0)).unwrap();
        assert_eq!(path.len(), 8);
        assert!(path.iter().all(|&c| grid.is_passable(c)));
        assert_eq!(path.last(), Some(&p(2, 0)));
    }

    #[test]
    fn test_enclosed_goal_unreachable() {
        let barriers = [p(1, 0), p(0, 1), p(2, 1), p(1, 2)];
        let grid = GridWorld::with_cells(3, 3, &barriers, &[]).unwrap();

        assert_eq!(find_path(&grid, p(0, 0), p(1, 1)), None);
        assert_eq!(find_path(&grid, p(0, 0), p(1, 0)), None);
    }

    #[test]
    fn test_tree_distances() {
        let grid = GridWorld::with_cells(3, 3, &[p(1, 1)], &[]).unwrap();
        let tree = BfsTree::build(&grid, p(0, 0));

        assert_eq!(tree.distance(p(0, 0)), Some(0));
        assert_eq!(tree.distance(p(2, 2)), Some(4));
        assert_eq!(tree.distance(p(1, 1)), None);
        assert_eq!(tree.distance(p(5, 5)), None);
        assert_eq!(tree.distance(p(1, i32::MAX)), None);
        assert_eq!(tree.distance(p(i32::MAX, 1)), None);
        assert_eq!(tree.path_to(p(0, i32::MIN)), None);
        assert_eq!(tree.path_to(p(0, 0)), Some(vec![]));
    }

    #[test]
    fn test_nearest_task_tie_breaks_on_lowest_coordinate() {
        // Both tasks are two steps from (1,1)
        let grid = GridWorld::with_cells(3, 3, &[], &[p(2, 0), p(0, 2)]).unwrap();
        let route = nearest_task(&grid, p(1, 1)).unwrap();

        assert_eq!(route.task_id, TaskId(2));
        assert_eq!(route.destination(), Some(p(0, 2)));
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn test_nearest_task_skips_unreachable() {
        // Task 1 at (4,0) is walled in, task 2 at (0,4) is far but reachable
        let barriers = [p(3, 0), p(4, 1)];
        let grid = GridWorld::with_cells(5, 5, &barriers, &[p(4, 0), p(0, 4)]).unwrap();

        let route = nearest_task(&grid, p(2, 0)).unwrap();
        assert_eq!(route.task_id, TaskId(2));
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[]), "No path");
        assert_eq!(format_path(&[p(0, 0), p(0, 1)]), "(0,0) -> (0,1)");
    }
}
