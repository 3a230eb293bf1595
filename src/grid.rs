use crate::error::{NavError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest accepted grid side, keeps a single BFS bounded per tick
pub const MAX_GRID_SIZE: i32 = 512;

/// A position on the grid
///
/// Ordering is lexicographic on (x, y), which is the order remaining tasks
/// are reported in and the tie-break used when choosing between tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The four orthogonal neighbours (may be out of bounds)
    pub fn neighbors(&self) -> [Position; 4] {
        [
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x, self.y - 1),
        ]
    }

    /// True if `other` is exactly one orthogonal step away
    pub fn is_adjacent(&self, other: &Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position::new(x, y)
    }
}

/// Identifier of a task, assigned 1.. in placement order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Barrier,
    Task(TaskId),
}

/// Grid of cells plus the registry of unvisited tasks
///
/// Cells are stored row-major (`x + y * cols`). The registry and the
/// `Cell::Task` entries are only ever changed together by `complete_task`.
#[derive(Clone, Debug)]
pub struct GridWorld {
    cols: i32,
    rows: i32,
    cells: Vec<Cell>,
    tasks: BTreeMap<Position, TaskId>,
    /// Every task as originally placed, in placement order
    placed: Vec<(Position, TaskId)>,
}

impl GridWorld {
    /// Create a grid with every cell empty
    pub fn new(cols: i32, rows: i32) -> Result<Self> {
        check_dimensions(cols, rows)?;
        Ok(GridWorld {
            cols,
            rows,
            cells: vec![Cell::Empty; (cols * rows) as usize],
            tasks: BTreeMap::new(),
            placed: Vec::new(),
        })
    }

    /// Create a grid with specific barrier and task cells
    ///
    /// Tasks receive ids 1.. in the order given. Coordinates must be in
    /// bounds and pairwise distinct.
    pub fn with_cells(cols: i32, rows: i32, barriers: &[Position], tasks: &[Position]) -> Result<Self> {
        let mut world = Self::new(cols, rows)?;

        for &pos in barriers {
            world.claim(pos, Cell::Barrier)?;
        }
        for (i, &pos) in tasks.iter().enumerate() {
            let id = TaskId(i as u32 + 1);
            world.claim(pos, Cell::Task(id))?;
            world.tasks.insert(pos, id);
            world.placed.push((pos, id));
        }

        Ok(world)
    }

    /// Parse a text layout
    ///
    /// - `■`: barrier
    /// - `□` or `.`: empty
    /// - `s`: agent start (exactly one)
    /// - `t`: task, numbered in reading order
    ///
    /// Blank lines are ignored. Returns the world and the start position.
    pub fn from_layout(text: &str) -> Result<(Self, Position)> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(NavError::InvalidConfiguration("layout has no rows".into()));
        }

        let cols = lines[0].chars().count() as i32;
        let rows = lines.len() as i32;

        let mut barriers = Vec::new();
        let mut tasks = Vec::new();
        let mut start = None;

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() as i32 != cols {
                return Err(NavError::InvalidConfiguration(format!(
                    "layout row {} has {} cells, expected {}",
                    y,
                    line.chars().count(),
                    cols
                )));
            }

            for (x, ch) in line.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match ch {
                    '■' => barriers.push(pos),
                    't' => tasks.push(pos),
                    's' => {
                        if start.replace(pos).is_some() {
                            return Err(NavError::InvalidConfiguration(
                                "layout has more than one start cell".into(),
                            ));
                        }
                    }
                    '□' | '.' => {}
                    other => {
                        return Err(NavError::InvalidConfiguration(format!(
                            "unknown layout character '{}' at {}",
                            other, pos
                        )));
                    }
                }
            }
        }

        let start = start.ok_or_else(|| {
            NavError::InvalidConfiguration("layout has no start cell 's'".into())
        })?;

        let world = Self::with_cells(cols, rows, &barriers, &tasks)?;
        Ok((world, start))
    }

    /// Render the current state in the format read by `from_layout`
    pub fn to_layout_string(&self, agent: Position) -> String {
        let mut result = String::new();

        for y in 0..self.rows {
            for x in 0..self.cols {
                let pos = Position::new(x, y);
                let symbol = if pos == agent {
                    's'
                } else {
                    match self.cells[self.index(pos)] {
                        Cell::Barrier => '■',
                        Cell::Task(_) => 't',
                        Cell::Empty => '□',
                    }
                };
                result.push(symbol);
            }
            result.push('\n');
        }

        result
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.cols && pos.y >= 0 && pos.y < self.rows
    }

    /// Cell classification, `None` when out of bounds
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.cells[self.index(pos)])
    }

    /// True iff the cell is in bounds and not a barrier
    pub fn is_passable(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(Cell::Empty) | Some(Cell::Task(_)))
    }

    pub fn task_at(&self, pos: Position) -> Option<TaskId> {
        self.tasks.get(&pos).copied()
    }

    /// All unvisited tasks in ascending (x, y) order
    pub fn remaining_tasks(&self) -> Vec<(Position, TaskId)> {
        self.tasks.iter().map(|(&pos, &id)| (pos, id)).collect()
    }

    pub fn remaining_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of tasks originally placed, completed or not
    pub fn task_count(&self) -> usize {
        self.placed.len()
    }

    /// Every task as originally placed, in placement order
    pub fn original_tasks(&self) -> &[(Position, TaskId)] {
        &self.placed
    }

    /// Mark a task as visited: the cell becomes empty and leaves the registry
    pub fn complete_task(&mut self, pos: Position) -> Result<TaskId> {
        let id = self.tasks.remove(&pos).ok_or_else(|| {
            NavError::PreconditionViolation(format!("complete_task called on {} which holds no task", pos))
        })?;
        let index = self.index(pos);
        self.cells[index] = Cell::Empty;
        Ok(id)
    }

    /// Convert an in-bounds position to its cell index
    pub(crate) fn index(&self, pos: Position) -> usize {
        (pos.x + pos.y * self.cols) as usize
    }

    /// Convert a cell index back to a position
    pub(crate) fn position(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index % self.cols, index / self.cols)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn claim(&mut self, pos: Position, cell: Cell) -> Result<()> {
        if !self.in_bounds(pos) {
            return Err(NavError::InvalidConfiguration(format!(
                "{} is outside the {}x{} grid",
                pos, self.cols, self.rows
            )));
        }
        let index = self.index(pos);
        if self.cells[index] != Cell::Empty {
            return Err(NavError::InvalidConfiguration(format!("{} is placed twice", pos)));
        }
        self.cells[index] = cell;
        Ok(())
    }
}

/// Reject degenerate or oversized grids
pub fn check_dimensions(cols: i32, rows: i32) -> Result<()> {
    if cols < 1 || rows < 1 || cols > MAX_GRID_SIZE || rows > MAX_GRID_SIZE {
        return Err(NavError::InvalidConfiguration(format!(
            "grid must be between 1x1 and {}x{}, got {}x{}",
            MAX_GRID_SIZE, MAX_GRID_SIZE, cols, rows
        )));
    }
    Ok(())
}
