//! Game state, move validation and move application

use crate::board::{Board, Color, Palette, PlayerSlot};
use crate::config::GameConfig;
use crate::error::{ConfigError, InvalidMove, StateError};
use crate::generator::generate;
use crate::hex::Hex;
use crate::territory::TerritoryResolver;
use crate::turn::TurnController;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Stable player identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A participant. `score` and `color` are derived from the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: usize,
    /// Color of the player's whole territory
    pub color: Color,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0,
            color: Color(0),
        }
    }
}

/// Final result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Player(PlayerId),
    Draw,
}

/// Tile count for one player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player: PlayerId,
    pub score: usize,
}

/// What an applied move changed.
///
/// Ownership delta: the `captured` tiles gain `player` as owner, and every
/// tile owned by `player` (old territory and captured tiles) takes `color`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub player: PlayerId,
    pub color: Color,
    /// Newly owned tiles, in discovery order
    pub captured: Vec<Hex>,
    pub scores: Vec<Score>,
    pub game_over: bool,
    pub winner: Option<Winner>,
    pub version: u64,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Authoritative game aggregate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    seed: u64,
    palette: Palette,
    board: Board,
    /// Turn order
    players: [Player; 2],
    turn: TurnController,
    /// Color played on the previous move
    last_color: Option<Color>,
    /// Moves applied so far
    turn_number: u32,
    /// Strictly increases on every mutation
    version: u64,
    winner: Option<Winner>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game on a generated board; `players[0]` moves first
    pub fn new(config: &GameConfig, players: [Player; 2]) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = generate(config.size, config.seed, &config.palette)?;
        let mut state = Self::from_board(board, config.palette.clone(), players)?;
        state.seed = config.seed;
        Ok(state)
    }

    /// New game on a prepared board. Each player must already own a tile;
    /// the player's color is read from their territory.
    pub fn from_board(
        board: Board,
        palette: Palette,
        players: [Player; 2],
    ) -> Result<Self, ConfigError> {
        palette.validate()?;
        let [first, second] = &players;
        if first.id.as_str().is_empty() || second.id.as_str().is_empty() || first.id == second.id {
            return Err(ConfigError::InvalidPlayers);
        }
        if let Some(tile) = board.tiles().find(|t| !palette.contains(t.color)) {
            return Err(ConfigError::ColorOutsidePalette(tile.color));
        }

        let mut state = Self {
            seed: 0,
            palette,
            board,
            players,
            turn: TurnController::new(),
            last_color: None,
            turn_number: 0,
            version: 1,
            winner: None,
        };

        for slot in PlayerSlot::BOTH {
            let color = state
                .board
                .owned_by(slot)
                .next()
                .map(|t| t.color)
                .ok_or(ConfigError::NoTerritory(slot))?;
            state.players[slot.index()].color = color;
        }
        state.refresh_scores();

        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    /// Turn-order slot of a player id
    pub fn slot_of(&self, id: &PlayerId) -> Option<PlayerSlot> {
        PlayerSlot::BOTH
            .into_iter()
            .find(|slot| &self.players[slot.index()].id == id)
    }

    pub fn current_slot(&self) -> PlayerSlot {
        self.turn.current()
    }

    /// Player to move (the last mover once the game is over)
    pub fn current_player(&self) -> &Player {
        self.player(self.turn.current())
    }

    pub fn turn(&self) -> &TurnController {
        &self.turn
    }

    pub fn last_color(&self) -> Option<Color> {
        self.last_color
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_over(&self) -> bool {
        self.turn.is_over()
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.winner.as_ref()
    }

    /// Scores in turn order
    pub fn scores(&self) -> Vec<Score> {
        self.players
            .iter()
            .map(|p| Score {
                player: p.id.clone(),
                score: p.score,
            })
            .collect()
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Tiles `slot` would capture with `color`, ignoring turn rules
    pub fn preview_capture(&self, slot: PlayerSlot, color: Color) -> Vec<Hex> {
        TerritoryResolver::new().capture_set(&self.board, slot, color)
    }

    /// Check a move without applying it.
    ///
    /// Checked in order: `GameOver`, `NotYourTurn` (also for unknown ids),
    /// `UnknownColor`, `ColorJustUsed`, `NoCaptures`. Re-confirming the
    /// mover's own current color is always legal, even when it equals the
    /// color the opponent just played, so a player is never left without a
    /// move.
    pub fn validate_move(&self, player: &PlayerId, color: Color) -> Result<(), InvalidMove> {
        self.resolve_move(player, color).map(|_| ())
    }

    /// Colors `player` may pick right now
    pub fn legal_colors(&self, player: &PlayerId) -> Vec<Color> {
        self.palette
            .colors()
            .filter(|&color| self.validate_move(player, color).is_ok())
            .collect()
    }

    /// Full rule check; yields the mover's slot and the capture set
    fn resolve_move(
        &self,
        player: &PlayerId,
        color: Color,
    ) -> Result<(PlayerSlot, Vec<Hex>), InvalidMove> {
        if self.is_over() {
            return Err(InvalidMove::GameOver);
        }
        let slot = self
            .slot_of(player)
            .filter(|&slot| self.turn.is_turn_of(slot))
            .ok_or(InvalidMove::NotYourTurn)?;
        if !self.palette.contains(color) {
            return Err(InvalidMove::UnknownColor);
        }

        // Re-confirming one's own color is always allowed
        let own = self.player(slot).color;
        if self.last_color == Some(color) && color != own {
            return Err(InvalidMove::ColorJustUsed);
        }

        let captured = self.preview_capture(slot, color);
        if captured.is_empty() && color != own {
            return Err(InvalidMove::NoCaptures);
        }

        Ok((slot, captured))
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Validate and apply a move in one step
    pub fn apply_move(&mut self, player: &PlayerId, color: Color) -> Result<MoveOutcome, InvalidMove> {
        let (slot, captured) = self.resolve_move(player, color)?;

        for &hex in &captured {
            self.board.set_owner(hex, Some(slot));
        }
        // Whole territory adopts the new color
        for tile in self.board.tiles_mut() {
            if tile.owner == Some(slot) {
                tile.color = color;
            }
        }

        self.players[slot.index()].color = color;
        self.last_color = Some(color);
        self.turn_number += 1;
        self.refresh_scores();

        if self.board.is_saturated() {
            self.winner = Some(self.decide_winner());
            self.turn.finish();
        } else {
            self.turn.advance();
        }
        self.version += 1;

        tracing::debug!(
            "Move {}: {} played color {} capturing {} tiles (v{})",
            self.turn_number,
            player,
            color.0,
            captured.len(),
            self.version
        );

        Ok(MoveOutcome {
            player: player.clone(),
            color,
            captured,
            scores: self.scores(),
            game_over: self.is_over(),
            winner: self.winner.clone(),
            version: self.version,
        })
    }

    /// End the game in favor of the other player.
    ///
    /// Returns `Ok(false)` if the game had already ended.
    pub fn forfeit(&mut self, player: &PlayerId) -> Result<bool, InvalidMove> {
        if self.is_over() {
            return Ok(false);
        }
        let slot = self.slot_of(player).ok_or(InvalidMove::NotAParticipant)?;
        let opponent = self.player(slot.opponent()).id.clone();

        tracing::info!("{} forfeits, {} wins", player, opponent);

        self.winner = Some(Winner::Player(opponent));
        self.turn.finish();
        self.version += 1;
        Ok(true)
    }

    fn refresh_scores(&mut self) {
        for slot in PlayerSlot::BOTH {
            self.players[slot.index()].score = self.board.count_owned(slot);
        }
    }

    fn decide_winner(&self) -> Winner {
        let [one, two] = &self.players;
        if one.score > two.score {
            Winner::Player(one.id.clone())
        } else if two.score > one.score {
            Winner::Player(two.id.clone())
        } else {
            Winner::Draw
        }
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Full state as JSON
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(|e| StateError::Serialization(e.to_string()))
    }

    /// Parse and structurally check a serialized state
    pub fn from_json(raw: &str) -> Result<Self, StateError> {
        let state: GameState =
            serde_json::from_str(raw).map_err(|e| StateError::Deserialization(e.to_string()))?;
        state.check_structure()?;
        Ok(state)
    }

    /// Whether `candidate` may replace this state
    pub fn validate_incoming_state(&self, candidate: &GameState) -> bool {
        candidate.version > self.version && candidate.check_structure().is_ok()
    }

    /// Parse a pushed state and reject it if malformed or not newer
    pub fn check_incoming(&self, raw: &str) -> Result<GameState, StateError> {
        let candidate = Self::from_json(raw)?;
        if candidate.version <= self.version {
            return Err(StateError::Stale {
                incoming: candidate.version,
                current: self.version,
            });
        }
        Ok(candidate)
    }

    fn check_structure(&self) -> Result<(), StateError> {
        let malformed = |msg: &str| Err(StateError::Deserialization(msg.to_string()));

        if self.palette.validate().is_err() {
            return malformed("palette has too few or too many colors");
        }
        if !self.board.is_consistent() {
            return malformed("board tiles do not match board size");
        }
        if self.board.tiles().any(|t| !self.palette.contains(t.color)) {
            return malformed("tile color outside palette");
        }
        if self.players[0].id == self.players[1].id {
            return malformed("duplicate player ids");
        }
        for slot in PlayerSlot::BOTH {
            let player = self.player(slot);
            if player.score != self.board.count_owned(slot) {
                return malformed("score does not match board");
            }
            if !self.palette.contains(player.color) {
                return malformed("player color outside palette");
            }
        }
        if self.last_color.is_some_and(|c| !self.palette.contains(c)) {
            return malformed("last color outside palette");
        }
        match &self.winner {
            None if self.turn.is_over() => return malformed("finished game without winner"),
            Some(_) if !self.turn.is_over() => return malformed("winner on running game"),
            Some(Winner::Player(id)) if self.slot_of(id).is_none() => {
                return malformed("winner is not a participant")
            }
            _ => {}
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
