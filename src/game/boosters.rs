use super::tile::Position;

pub const DEFAULT_BOMB_RADIUS: i32 = 1;

// ============================================================================
// Bomb
// ============================================================================

/// Clears a diamond of cells around a chosen center.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BombBooster {
    radius: i32,
}

impl BombBooster {
    pub fn new(radius: i32) -> Self {
        Self { radius: radius.max(0) }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// All in-bounds positions within Manhattan distance `radius` of `center`,
    /// row-major. Does not look at the board; callers drop empty cells.
    ///
    /// The scan is clamped to the grid, so any center or radius is safe.
    pub fn get_explosion_area(&self, center: Position, rows: usize, cols: usize) -> Vec<Position> {
        let mut area = Vec::new();
        let (Some(last_row), Some(last_col)) = (last_index(rows), last_index(cols)) else {
            return area;
        };

        let row_lo = center.row.saturating_sub(self.radius).max(0);
        let row_hi = center.row.saturating_add(self.radius).min(last_row);
        let col_lo = center.col.saturating_sub(self.radius).max(0);
        let col_hi = center.col.saturating_add(self.radius).min(last_col);

        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let pos = Position::new(row, col);
                if pos.manhattan(center) <= self.radius {
                    area.push(pos);
                }
            }
        }
        area
    }
}

/// Highest index on an axis of `len` cells, if it has any.
fn last_index(len: usize) -> Option<i32> {
    len.checked_sub(1).map(|last| i32::try_from(last).unwrap_or(i32::MAX))
}

impl Default for BombBooster {
    fn default() -> Self {
        Self::new(DEFAULT_BOMB_RADIUS)
    }
}

// ============================================================================
// Teleport
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TeleportBooster;

impl TeleportBooster {
    /// Distinct and both in bounds. Occupancy is the caller's concern.
    pub fn is_valid_swap(&self, pos1: Position, pos2: Position, rows: usize, cols: usize) -> bool {
        pos1 != pos2 && pos1.is_within(rows, cols) && pos2.is_within(rows, cols)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TeleportState {
    #[default]
    Inactive,
    WaitingFirst,
    WaitingSecond,
    Completed,
}

/// Two-click selection for a teleport swap.
///
/// Each call is only accepted in its own state; anything else returns
/// `false` and leaves the machine untouched. A new instance is built for every
/// activation so a stale pick cannot carry over.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TeleportModeState {
    state: TeleportState,
    first: Option<Position>,
    second: Option<Position>,
}

impl TeleportModeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TeleportState {
        self.state
    }

    pub fn first(&self) -> Option<Position> {
        self.first
    }

    pub fn activate(&mut self) -> bool {
        if self.state != TeleportState::Inactive {
            return false;
        }
        self.state = TeleportState::WaitingFirst;
        self.first = None;
        self.second = None;
        true
    }

    pub fn select_first(&mut self, pos: Position) -> bool {
        if self.state != TeleportState::WaitingFirst {
            return false;
        }
        self.first = Some(pos);
        self.state = TeleportState::WaitingSecond;
        true
    }

    pub fn select_second(&mut self, pos: Position) -> bool {
        if self.state != TeleportState::WaitingSecond {
            return false;
        }
        self.second = Some(pos);
        self.state = TeleportState::Completed;
        true
    }

    pub fn is_ready(&self) -> bool {
        self.state == TeleportState::Completed && self.first.is_some() && self.second.is_some()
    }

    pub fn selection(&self) -> Option<(Position, Position)> {
        if !self.is_ready() {
            return None;
        }
        self.first.zip(self.second)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
