use tracing::{debug, info, instrument, warn};

use super::board::Board;
use super::boosters::{BombBooster, TeleportBooster, TeleportModeState, TeleportState};
use super::config::{GameConfig, GameError, MAX_FILL_ATTEMPTS};
use super::rules::{GameRules, Outcome};
use super::tile::{PlacedTile, Position, RandomTileProvider, TileMovement, TileProvider};

// ============================================================================
// Events
// ============================================================================

/// Everything a presenter needs to animate a clear.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Resolution {
    pub removed_positions: Vec<Position>,
    pub movements: Vec<TileMovement>,
    pub new_tiles: Vec<PlacedTile>,
    pub score: u32,
    pub moves_left: i32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    MatchResolved(Resolution),
    BombResolved(Resolution),
    TeleportResolved {
        first: Position,
        second: Position,
        score: u32,
        moves_left: i32,
    },
    GameWon {
        score: u32,
    },
    GameLost {
        score: u32,
    },
    BoosterCountChanged {
        bomb: u32,
        teleport: u32,
    },
    TeleportSelectionChanged {
        first: Position,
        second: Option<Position>,
    },
    GameRestarted,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    BombTargeting,
    TeleportTargeting,
    /// An action has been committed and handed to the presenter. Cleared by
    /// [`GameSession::presentation_complete`].
    Resolving { next: Outcome },
    Won,
    Lost,
}

// ============================================================================
// Session
// ============================================================================

/// Owns the board and rules for one game and runs every player action from
/// input to outcome. Only one action is ever in flight.
pub struct GameSession {
    board: Board,
    rules: GameRules,
    phase: Phase,
    bomb: BombBooster,
    teleport: TeleportBooster,
    teleport_mode: Option<TeleportModeState>,
    tile_provider: Box<dyn TileProvider>,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_provider(config, Box::new(RandomTileProvider))
    }

    pub fn with_provider(config: GameConfig, mut provider: Box<dyn TileProvider>) -> Result<Self, GameError> {
        config.validate()?;
        let board = generate_board(&config, provider.as_mut())?;
        Ok(Self::with_board(config, board, provider))
    }

    /// Starts from a prepared board. The board's dimensions win over the
    /// ones in `config`.
    ///
    /// Meant for tests and replays: neither `config` nor the board is
    /// validated, so the board may be smaller than the usual minimum, contain
    /// holes or have no valid move at all. Use [`GameSession::new`] or
    /// [`GameSession::with_provider`] for a real game.
    pub fn with_board(mut config: GameConfig, board: Board, provider: Box<dyn TileProvider>) -> Self {
        config.rows = board.rows();
        config.cols = board.cols();
        Self {
            board,
            rules: GameRules::new(config),
            phase: Phase::Idle,
            bomb: BombBooster::default(),
            teleport: TeleportBooster,
            teleport_mode: None,
            tile_provider: provider,
            events: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn teleport_mode(&self) -> Option<&TeleportModeState> {
        self.teleport_mode.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Resolving { .. })
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Lost)
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------------

    /// Replaces board, rules and booster inventories in one step. On error the
    /// current game is left untouched.
    #[instrument(skip(self))]
    pub fn configure(&mut self, config: GameConfig) -> Result<(), GameError> {
        config.validate()?;
        let board = generate_board(&config, self.tile_provider.as_mut())?;

        self.board = board;
        self.rules = GameRules::new(config);
        self.teleport_mode = None;
        self.phase = Phase::Idle;

        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        self.push_booster_counts();
        info!(rows = config.rows, cols = config.cols, "new game started");
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), GameError> {
        let config = *self.rules.config();
        self.configure(config)
    }

    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn select_position(&mut self, pos: Position) {
        if !self.board.is_in_bounds(pos) {
            debug!("ignoring out-of-range selection");
            return;
        }
        match self.phase {
            Phase::Idle => self.resolve_match(pos),
            Phase::BombTargeting => self.resolve_bomb(pos),
            Phase::TeleportTargeting => self.select_teleport_target(pos),
            Phase::Resolving { .. } | Phase::Won | Phase::Lost => {
                debug!("ignoring selection while not accepting input");
            }
        }
    }

    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn activate_bomb_mode(&mut self) {
        if self.phase != Phase::Idle {
            debug!("bomb mode unavailable");
            return;
        }
        if !self.rules.try_use_bomb() {
            debug!("no bombs left");
            return;
        }
        self.push_booster_counts();
        self.phase = Phase::BombTargeting;
    }

    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn activate_teleport_mode(&mut self) {
        if self.phase != Phase::Idle {
            debug!("teleport mode unavailable");
            return;
        }
        if !self.rules.try_use_teleport() {
            debug!("no teleports left");
            return;
        }
        self.push_booster_counts();

        let mut mode = TeleportModeState::new();
        mode.activate();
        self.teleport_mode = Some(mode);
        self.phase = Phase::TeleportTargeting;
    }

    /// Leaves bomb or teleport targeting. The booster stays spent.
    pub fn cancel_targeting(&mut self) {
        if matches!(self.phase, Phase::BombTargeting | Phase::TeleportTargeting) {
            self.teleport_mode = None;
            self.phase = Phase::Idle;
        }
    }

    /// The presenter finished showing the last resolved action.
    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn presentation_complete(&mut self) {
        let Phase::Resolving { next } = self.phase else {
            return;
        };
        let score = self.rules.score();
        self.phase = match next {
            Outcome::Continue => Phase::Idle,
            Outcome::Won => {
                info!(score, "game won");
                self.events.push(GameEvent::GameWon { score });
                Phase::Won
            }
            Outcome::Lost => {
                info!(score, moves_left = self.rules.moves_left(), "game lost");
                self.events.push(GameEvent::GameLost { score });
                Phase::Lost
            }
        };
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    fn resolve_match(&mut self, pos: Position) {
        let group = self.board.get_connected_group(pos);
        if group.is_empty() {
            debug!("no group at selection");
            return;
        }
        self.rules.process_valid_explosion(group.len());
        let resolution = self.explode(&group);
        debug!(removed = resolution.removed_positions.len(), "match resolved");
        self.events.push(GameEvent::MatchResolved(resolution));
        self.enter_resolving();
    }

    fn resolve_bomb(&mut self, center: Position) {
        let targets: Vec<Position> = self
            .bomb
            .get_explosion_area(center, self.board.rows(), self.board.cols())
            .into_iter()
            .filter(|&p| !self.board.get_tile(p).is_empty())
            .collect();

        self.rules.process_booster_action(targets.len());
        let resolution = self.explode(&targets);
        debug!(removed = resolution.removed_positions.len(), "bomb resolved");
        self.events.push(GameEvent::BombResolved(resolution));
        self.enter_resolving();
    }

    fn select_teleport_target(&mut self, pos: Position) {
        let Some(mode) = self.teleport_mode.as_mut() else {
            self.phase = Phase::Idle;
            return;
        };

        match mode.state() {
            TeleportState::WaitingFirst => {
                if mode.select_first(pos) {
                    self.events.push(GameEvent::TeleportSelectionChanged { first: pos, second: None });
                }
            }
            TeleportState::WaitingSecond => {
                if !mode.select_second(pos) {
                    return;
                }
                if let Some(first) = mode.first() {
                    self.events.push(GameEvent::TeleportSelectionChanged {
                        first,
                        second: Some(pos),
                    });
                }
                self.commit_teleport();
            }
            TeleportState::Inactive | TeleportState::Completed => {}
        }
    }

    fn commit_teleport(&mut self) {
        let selection = self.teleport_mode.take().and_then(|mode| mode.selection());
        self.phase = Phase::Idle;
        let Some((first, second)) = selection else {
            return;
        };

        let occupied = !self.board.get_tile(first).is_empty() && !self.board.get_tile(second).is_empty();
        if !occupied || !self.teleport.is_valid_swap(first, second, self.board.rows(), self.board.cols()) {
            warn!(?first, ?second, "teleport swap rejected");
            return;
        }

        self.board.swap(first, second);
        self.rules.process_booster_action(0);
        self.events.push(GameEvent::TeleportResolved {
            first,
            second,
            score: self.rules.score(),
            moves_left: self.rules.moves_left(),
        });
        self.enter_resolving();
    }

    /// Clears `positions`, lets columns settle and refills the holes.
    /// Expects the rules to be updated already.
    fn explode(&mut self, positions: &[Position]) -> Resolution {
        let outcome = self.board.process_explosion(positions);
        let new_tiles = self.board.refill(&outcome.empty_positions, self.tile_provider.as_mut());
        Resolution {
            removed_positions: outcome.removed_positions,
            movements: outcome.movements,
            new_tiles,
            score: self.rules.score(),
            moves_left: self.rules.moves_left(),
        }
    }

    fn enter_resolving(&mut self) {
        let next = self.rules.evaluate(self.board.has_valid_move());
        self.phase = Phase::Resolving { next };
    }

    fn push_booster_counts(&mut self) {
        self.events.push(GameEvent::BoosterCountChanged {
            bomb: self.rules.bomb_boosters(),
            teleport: self.rules.teleport_boosters(),
        });
    }
}

/// Fills a fresh board, regenerating it whole until at least one group exists.
fn generate_board(config: &GameConfig, provider: &mut dyn TileProvider) -> Result<Board, GameError> {
    let mut board = Board::new(config.rows, config.cols);
    for attempt in 1..=MAX_FILL_ATTEMPTS {
        board.fill(provider);
        if board.has_valid_move() {
            return Ok(board);
        }
        debug!(attempt, "generated board has no valid move, regenerating");
    }
    Err(GameError::NoPlayableBoard {
        attempts: MAX_FILL_ATTEMPTS,
    })
}
