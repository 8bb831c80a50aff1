use derive_more::{Display, Error};

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_ROWS: usize = 8;
pub const DEFAULT_COLS: usize = 8;
pub const DEFAULT_TARGET_SCORE: u32 = 200;
pub const DEFAULT_MAX_MOVES: i32 = 20;
pub const DEFAULT_BOMB_BOOSTERS: u32 = 3;
pub const DEFAULT_TELEPORT_BOOSTERS: u32 = 3;

pub const MIN_BOARD_SIDE: usize = 2;
pub const MAX_BOARD_SIDE: usize = 32;

/// Full-board regenerations attempted before giving up on a playable start.
pub const MAX_FILL_ATTEMPTS: usize = 1_000;

/// Whether a bomb or teleport costs the player a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BoosterMoveCost {
    #[default]
    ConsumesMove,
    Free,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub target_score: u32,
    pub max_moves: i32,
    pub bomb_booster_count: u32,
    pub teleport_booster_count: u32,
    pub booster_move_cost: BoosterMoveCost,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        let side_ok = |n: usize| (MIN_BOARD_SIDE..=MAX_BOARD_SIDE).contains(&n);
        if !side_ok(self.rows) || !side_ok(self.cols) {
            return Err(GameError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.target_score == 0 {
            return Err(GameError::InvalidTargetScore);
        }
        if self.max_moves < 1 {
            return Err(GameError::InvalidMaxMoves { max_moves: self.max_moves });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            target_score: DEFAULT_TARGET_SCORE,
            max_moves: DEFAULT_MAX_MOVES,
            bomb_booster_count: DEFAULT_BOMB_BOOSTERS,
            teleport_booster_count: DEFAULT_TELEPORT_BOOSTERS,
            booster_move_cost: BoosterMoveCost::default(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failures when setting up a session. Gameplay input never errors; it is
/// ignored instead.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    #[display(
        "board must be between {} and {} cells per side, got {}x{}",
        MIN_BOARD_SIDE,
        MAX_BOARD_SIDE,
        rows,
        cols
    )]
    InvalidDimensions { rows: usize, cols: usize },
    #[display("target score must be at least 1")]
    InvalidTargetScore,
    #[display("max moves must be at least 1, got {max_moves}")]
    InvalidMaxMoves { max_moves: i32 },
    #[display("no playable board after {attempts} attempts")]
    NoPlayableBoard { attempts: usize },
}
