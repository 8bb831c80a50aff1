use super::config::{BoosterMoveCost, GameConfig};

/// What the session should do once an action has been presented.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Continue,
    Won,
    Lost,
}

// ============================================================================
// Game Rules
// ============================================================================

/// Score, move budget and booster inventories for one session.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameRules {
    config: GameConfig,
    score: u32,
    moves_left: i32,
    bomb_boosters: u32,
    teleport_boosters: u32,
}

impl GameRules {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            score: 0,
            moves_left: config.max_moves,
            bomb_boosters: config.bomb_booster_count,
            teleport_boosters: config.teleport_booster_count,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_left(&self) -> i32 {
        self.moves_left
    }

    pub fn target_score(&self) -> u32 {
        self.config.target_score
    }

    pub fn bomb_boosters(&self) -> u32 {
        self.bomb_boosters
    }

    pub fn teleport_boosters(&self) -> u32 {
        self.teleport_boosters
    }

    /// A match clear always costs exactly one move.
    pub fn process_valid_explosion(&mut self, tile_count: usize) {
        self.add_score(tile_count);
        self.moves_left -= 1;
    }

    /// Bomb and teleport actions. Whether they cost a move is governed by
    /// [`BoosterMoveCost`].
    pub fn process_booster_action(&mut self, tile_count: usize) {
        self.add_score(tile_count);
        if self.config.booster_move_cost == BoosterMoveCost::ConsumesMove {
            self.moves_left -= 1;
        }
    }

    pub fn try_use_bomb(&mut self) -> bool {
        Self::take_one(&mut self.bomb_boosters)
    }

    pub fn try_use_teleport(&mut self) -> bool {
        Self::take_one(&mut self.teleport_boosters)
    }

    pub fn is_win_condition(&self) -> bool {
        self.score >= self.config.target_score
    }

    pub fn is_lose_condition(&self, has_valid_moves: bool) -> bool {
        self.moves_left <= 0 || !has_valid_moves
    }

    /// Win takes precedence when both conditions hold after the same action.
    pub fn evaluate(&self, has_valid_moves: bool) -> Outcome {
        if self.is_win_condition() {
            Outcome::Won
        } else if self.is_lose_condition(has_valid_moves) {
            Outcome::Lost
        } else {
            Outcome::Continue
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    fn add_score(&mut self, tile_count: usize) {
        let gained = u32::try_from(tile_count).unwrap_or(u32::MAX);
        self.score = self.score.saturating_add(gained);
    }

    fn take_one(counter: &mut u32) -> bool {
        if *counter == 0 {
            return false;
        }
        *counter -= 1;
        true
    }
}
