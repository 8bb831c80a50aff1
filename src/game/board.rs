use std::collections::{BTreeSet, VecDeque};

use super::tile::{Cell, PlacedTile, Position, TileMovement, TileProvider};

// Up, down, left, right. No diagonals.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Result of clearing a set of positions and letting the affected columns settle.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ExplosionOutcome {
    pub removed_positions: Vec<Position>,
    pub movements: Vec<TileMovement>,
    pub empty_positions: Vec<Position>,
}

// ============================================================================
// Board
// ============================================================================

/// Fixed-size grid of cells. Row 0 is the top; gravity pulls toward `rows - 1`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    grid: Vec<Vec<Cell>>,
    rows: usize,
    cols: usize,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: vec![vec![Cell::Empty; cols]; rows],
            rows,
            cols,
        }
    }

    /// Builds a board from explicit rows. Short rows are padded with empty cells
    /// so the grid stays rectangular.
    pub fn from_grid(mut grid: Vec<Vec<Cell>>) -> Self {
        let rows = grid.len();
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut grid {
            row.resize(cols, Cell::Empty);
        }
        Self { grid, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.is_within(self.rows, self.cols)
    }

    pub fn get_tile(&self, pos: Position) -> Cell {
        if self.is_in_bounds(pos) {
            self.grid[pos.row as usize][pos.col as usize]
        } else {
            Cell::Empty
        }
    }

    /// Writes to an out-of-range position are dropped.
    pub fn set_tile(&mut self, pos: Position, cell: impl Into<Cell>) {
        if self.is_in_bounds(pos) {
            self.grid[pos.row as usize][pos.col as usize] = cell.into();
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| !cell.is_empty()).count()
    }

    /// Exchanges two cells. Returns false without touching the grid if either
    /// position is out of range.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        if !self.is_in_bounds(a) || !self.is_in_bounds(b) {
            return false;
        }
        let first = self.get_tile(a);
        let second = self.get_tile(b);
        self.set_tile(a, second);
        self.set_tile(b, first);
        true
    }

    pub fn fill(&mut self, provider: &mut dyn TileProvider) {
        for row in self.grid.iter_mut() {
            for cell in row.iter_mut() {
                *cell = Cell::Occupied(provider.next_tile());
            }
        }
    }

    /// Drops a fresh tile into every listed cell that is in range and empty.
    pub fn refill(&mut self, positions: &[Position], provider: &mut dyn TileProvider) -> Vec<PlacedTile> {
        let mut placed = Vec::with_capacity(positions.len());
        for &pos in positions {
            if self.is_in_bounds(pos) && self.get_tile(pos).is_empty() {
                let tile = provider.next_tile();
                self.set_tile(pos, tile);
                placed.push(PlacedTile { pos, tile });
            }
        }
        placed
    }

    /// Breadth-first flood fill from `start` over same-colored orthogonal
    /// neighbors. A lone tile is not a group, so components smaller than two
    /// come back empty.
    pub fn get_connected_group(&self, start: Position) -> Vec<Position> {
        let Some(start_tile) = self.get_tile(start).tile() else {
            return Vec::new();
        };

        let mut visited = vec![vec![false; self.cols]; self.rows];
        let mut group = Vec::new();
        let mut queue = VecDeque::new();

        visited[start.row as usize][start.col as usize] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            group.push(current);

            for (dr, dc) in NEIGHBOR_OFFSETS {
                let next = Position::new(current.row + dr, current.col + dc);
                if !self.is_in_bounds(next) || visited[next.row as usize][next.col as usize] {
                    continue;
                }
                if self.get_tile(next).tile() == Some(start_tile) {
                    visited[next.row as usize][next.col as usize] = true;
                    queue.push_back(next);
                }
            }
        }

        if group.len() >= 2 {
            group
        } else {
            Vec::new()
        }
    }

    /// Clears `positions` and compacts every column that lost a tile.
    ///
    /// Out-of-range or already-empty positions are skipped and do not mark
    /// their column. `empty_positions` lists, top to bottom, the cells of the
    /// affected columns that held a tile before and are empty afterwards.
    /// Holes that were already there before the explosion are never listed,
    /// so a refill driven by this outcome leaves them empty.
    pub fn process_explosion(&mut self, positions: &[Position]) -> ExplosionOutcome {
        let mut outcome = ExplosionOutcome::default();
        let mut affected_columns = BTreeSet::new();
        let mut previously_occupied = Vec::new();

        for &pos in positions {
            if self.get_tile(pos).is_empty() {
                continue;
            }
            if affected_columns.insert(pos.col) {
                previously_occupied.push((pos.col, self.occupied_rows(pos.col as usize)));
            }
            self.set_tile(pos, Cell::Empty);
            outcome.removed_positions.push(pos);
        }

        previously_occupied.sort_by_key(|(col, _)| *col);

        for (col, was_occupied) in previously_occupied {
            let c = col as usize;

            // Bottom-to-top, preserving relative order.
            let survivors: Vec<(usize, Cell)> = (0..self.rows)
                .rev()
                .filter(|&r| !self.grid[r][c].is_empty())
                .map(|r| (r, self.grid[r][c]))
                .collect();

            let mut write_row = self.rows;
            for (original_row, cell) in &survivors {
                write_row -= 1;
                self.grid[write_row][c] = *cell;
                if *original_row != write_row {
                    if let Some(tile) = cell.tile() {
                        outcome.movements.push(TileMovement {
                            tile,
                            from: Position::new(*original_row as i32, col),
                            to: Position::new(write_row as i32, col),
                        });
                    }
                }
            }
            for r in 0..write_row {
                self.grid[r][c] = Cell::Empty;
            }

            outcome.empty_positions.extend(
                (0..write_row)
                    .filter(|r| was_occupied[*r])
                    .map(|r| Position::new(r as i32, col)),
            );
        }

        outcome
    }

    /// True iff at least one group of two or more tiles exists.
    pub fn has_valid_move(&self) -> bool {
        (0..self.rows).any(|r| {
            (0..self.cols).any(|c| {
                let pos = Position::new(r as i32, c as i32);
                !self.get_tile(pos).is_empty() && self.get_connected_group(pos).len() >= 2
            })
        })
    }

    fn occupied_rows(&self, col: usize) -> Vec<bool> {
        (0..self.rows).map(|r| !self.grid[r][col].is_empty()).collect()
    }
}
