//! Rules engine for a tile-blast puzzle: flood-fill groups, column gravity,
//! bomb and teleport boosters, scoring and win/lose evaluation.

mod board;
mod boosters;
mod config;
mod rules;
mod session;
mod tile;

pub use board::{Board, ExplosionOutcome};
pub use boosters::{BombBooster, TeleportBooster, TeleportModeState, TeleportState, DEFAULT_BOMB_RADIUS};
pub use config::{
    BoosterMoveCost, GameConfig, GameError, DEFAULT_BOMB_BOOSTERS, DEFAULT_COLS, DEFAULT_MAX_MOVES,
    DEFAULT_ROWS, DEFAULT_TARGET_SCORE, DEFAULT_TELEPORT_BOOSTERS, MAX_BOARD_SIDE, MAX_FILL_ATTEMPTS,
    MIN_BOARD_SIDE,
};
pub use rules::{GameRules, Outcome};
pub use session::{GameEvent, GameSession, Phase, Resolution};
pub use tile::{
    Cell, PlacedTile, Position, RandomTileProvider, SequenceTileProvider, Tile, TileColor, TileMovement,
    TileProvider,
};

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn tile(color: TileColor) -> Cell {
        Cell::Occupied(Tile::new(color))
    }

    pub fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    /// Builds a board from rows of characters: `R B G Y P` for colors, `.` for
    /// an empty cell. Whitespace is ignored.
    pub fn board_from_rows(rows: &[&str]) -> Board {
        let grid = rows
            .iter()
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c {
                        'R' => tile(TileColor::Red),
                        'B' => tile(TileColor::Blue),
                        'G' => tile(TileColor::Green),
                        'Y' => tile(TileColor::Yellow),
                        'P' => tile(TileColor::Purple),
                        _ => Cell::Empty,
                    })
                    .collect()
            })
            .collect();
        Board::from_grid(grid)
    }

    /// Renders one column top to bottom using the same letters.
    pub fn column_string(board: &Board, col: usize) -> String {
        board
            .grid()
            .iter()
            .map(|row| match row[col] {
                Cell::Empty => '.',
                Cell::Occupied(t) => match t.color {
                    TileColor::Red => 'R',
                    TileColor::Blue => 'B',
                    TileColor::Green => 'G',
                    TileColor::Yellow => 'Y',
                    TileColor::Purple => 'P',
                },
            })
            .collect()
    }

    pub fn single_color(color: TileColor) -> Box<dyn TileProvider> {
        Box::new(SequenceTileProvider::new(vec![color]))
    }
}
