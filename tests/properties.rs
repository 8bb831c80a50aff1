//! Property tests for the board and rules.
//!
//! Invariants covered:
//! - Groups are empty or have at least two same-colored, connected, unique members.
//! - Gravity keeps surviving tiles in order at the bottom of their column.
//! - Clearing never moves a tile sideways and conserves the tile count.
//! - The bomb area stays in bounds and within its radius.
//! - A zero-tile explosion costs exactly one move and no score.

use std::collections::HashSet;

use proptest::prelude::*;
use tile_blast::game::{BombBooster, Board, Cell, GameConfig, GameRules, Position, Tile, TileColor};

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        1 => Just(Cell::Empty),
        4 => (0..TileColor::ALL.len()).prop_map(|i| Cell::Occupied(Tile::new(TileColor::ALL[i]))),
    ]
}

fn board_strategy() -> impl Strategy<Value = Board> {
    (2usize..8, 2usize..8).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(cell_strategy(), cols), rows).prop_map(Board::from_grid)
    })
}

fn column(board: &Board, col: usize) -> Vec<Cell> {
    board.grid().iter().map(|row| row[col]).collect()
}

fn is_adjacent(a: Position, b: Position) -> bool {
    a.manhattan(b) == 1
}

proptest! {
    #[test]
    fn groups_are_connected_same_colored_and_unique(board in board_strategy(), r in 0i32..8, c in 0i32..8) {
        let start = Position::new(r, c);
        let group = board.get_connected_group(start);

        if !group.is_empty() {
            prop_assert!(group.len() >= 2);

            let start_tile = board.get_tile(start);
            prop_assert!(!start_tile.is_empty());

            let unique: HashSet<Position> = group.iter().copied().collect();
            prop_assert_eq!(unique.len(), group.len());

            for &p in &group {
                prop_assert_eq!(board.get_tile(p), start_tile);
            }

            // Every member after the first touches an earlier member.
            for (i, &p) in group.iter().enumerate().skip(1) {
                prop_assert!(group[..i].iter().any(|&q| is_adjacent(p, q)));
            }
        }
    }

    #[test]
    fn group_is_the_same_from_any_member(board in board_strategy(), r in 0i32..8, c in 0i32..8) {
        let group = board.get_connected_group(Position::new(r, c));
        let expected: HashSet<Position> = group.iter().copied().collect();

        for &p in &group {
            let other: HashSet<Position> = board.get_connected_group(p).into_iter().collect();
            prop_assert_eq!(&other, &expected);
        }
    }

    #[test]
    fn gravity_keeps_column_order(board in board_strategy(), picks in prop::collection::vec((0i32..8, 0i32..8), 0..12)) {
        let mut after = board.clone();
        let mut positions: Vec<Position> = picks.into_iter().map(|(r, c)| Position::new(r, c)).collect();
        positions.sort();
        positions.dedup();

        let outcome = after.process_explosion(&positions);
        let removed: HashSet<Position> = outcome.removed_positions.iter().copied().collect();

        for col in 0..board.cols() {
            let survivors: Vec<Cell> = column(&board, col)
                .into_iter()
                .enumerate()
                .filter(|(r, cell)| !cell.is_empty() && !removed.contains(&Position::new(*r as i32, col as i32)))
                .map(|(_, cell)| cell)
                .collect();

            let settled = column(&after, col);
            let touched = removed.iter().any(|p| p.col == col as i32);
            if touched {
                let gap = board.rows() - survivors.len();
                prop_assert!(settled[..gap].iter().all(Cell::is_empty));
                prop_assert_eq!(&settled[gap..], survivors.as_slice());
            } else {
                prop_assert_eq!(settled, column(&board, col));
            }
        }

        for m in &outcome.movements {
            prop_assert_eq!(m.from.col, m.to.col);
            prop_assert!(m.to.row > m.from.row);
        }
        prop_assert_eq!(after.occupied_count() + removed.len(), board.occupied_count());
    }

    #[test]
    fn bomb_area_is_in_bounds_and_within_radius(
        radius in prop_oneof![0i32..4, Just(i32::MAX)],
        rows in 1usize..10,
        cols in 1usize..10,
        r in prop_oneof![-2i32..12, any::<i32>()],
        c in prop_oneof![-2i32..12, any::<i32>()],
    ) {
        let center = Position::new(r, c);
        let area = BombBooster::new(radius).get_explosion_area(center, rows, cols);

        let unique: HashSet<Position> = area.iter().copied().collect();
        prop_assert_eq!(unique.len(), area.len());
        for p in area {
            prop_assert!(p.manhattan(center) <= radius);
            prop_assert!(p.row >= 0 && (p.row as usize) < rows);
            prop_assert!(p.col >= 0 && (p.col as usize) < cols);
        }
    }

    #[test]
    fn zero_tile_explosion_costs_one_move(max_moves in 1i32..50, prior in prop::collection::vec(0usize..10, 0..5)) {
        let mut rules = GameRules::new(GameConfig { max_moves, ..GameConfig::default() });
        for count in prior {
            rules.process_valid_explosion(count);
        }
        let (score, moves) = (rules.score(), rules.moves_left());

        rules.process_valid_explosion(0);

        prop_assert_eq!(rules.score(), score);
        prop_assert_eq!(rules.moves_left(), moves - 1);
    }
}
