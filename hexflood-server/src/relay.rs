//! Relay: challenge lobby and authoritative game rooms
//!
//! All rooms live behind one mutex, so every inbound message is handled
//! to completion (validation, mutation, broadcasts) before the next one.
//! Outbound messages go through per-connection unbounded channels and
//! are written to the socket by the connection's own task.

use crate::protocol::{ClientMessage, ServerMessage};
use hexflood_core::{
    Color, ConfigError, GameConfig, GameState, MoveResponse, Player, PlayerId, PlayerSlot,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Challenge code length
pub const CODE_LENGTH: usize = 5;

/// Uppercase letters without I and O
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

// ============================================================================
// CORE TYPES
// ============================================================================

pub type ConnId = u64;

/// Outbound queue of one connection
pub type Outbox = UnboundedSender<ServerMessage>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("unknown challenge code")]
    UnknownChallenge,

    #[error("cannot join your own challenge")]
    OwnChallenge,

    #[error("already hosting a challenge")]
    AlreadyHosting,

    #[error("already in a game")]
    AlreadyInGame,

    #[error("unknown game")]
    UnknownGame,

    #[error("not a participant")]
    NotAParticipant,

    #[error("unknown connection")]
    UnknownConnection,

    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
}

struct Connection {
    outbox: Outbox,
    /// Code of the open challenge this connection hosts
    hosting: Option<String>,
    /// Game this connection is seated in
    game: Option<String>,
}

struct Challenge {
    host: ConnId,
    host_name: String,
}

struct Room {
    state: GameState,
    /// Connection per turn-order slot
    seats: [ConnId; 2],
}

struct RelayState {
    config: GameConfig,
    rng: ChaCha8Rng,
    next_conn: ConnId,
    next_game: u64,
    connections: FxHashMap<ConnId, Connection>,
    challenges: FxHashMap<String, Challenge>,
    games: FxHashMap<String, Room>,
}

impl RelayState {
    fn send(&self, conn: ConnId, msg: ServerMessage) {
        if let Some(connection) = self.connections.get(&conn) {
            if connection.outbox.send(msg).is_err() {
                tracing::debug!("Connection {} outbox closed", conn);
            }
        }
    }

    fn connection(&self, conn: ConnId) -> Result<&Connection, RelayError> {
        self.connections
            .get(&conn)
            .ok_or(RelayError::UnknownConnection)
    }

    fn fresh_code(&mut self) -> String {
        loop {
            let code: String = (0..CODE_LENGTH)
                .map(|_| CODE_ALPHABET[self.rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !self.challenges.contains_key(&code) {
                return code;
            }
        }
    }

    /// Drop a room and free both seats
    fn close_room(&mut self, game_id: &str) -> Option<Room> {
        let room = self.games.remove(game_id)?;
        for conn in room.seats {
            if let Some(connection) = self.connections.get_mut(&conn) {
                connection.game = None;
            }
        }
        Some(room)
    }
}

// ============================================================================
// RELAY
// ============================================================================

/// Authoritative owner of every live game
pub struct Relay {
    inner: Mutex<RelayState>,
}

impl Relay {
    /// `seed` fixes challenge codes and game seeds (for tests)
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            inner: Mutex::new(RelayState {
                config,
                rng,
                next_conn: 1,
                next_game: 1,
                connections: FxHashMap::default(),
                challenges: FxHashMap::default(),
                games: FxHashMap::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // CONNECTIONS
    // ========================================================================

    /// Register a connection and its outbound queue
    pub fn connect(&self, outbox: Outbox) -> ConnId {
        let mut relay = self.lock();
        let conn = relay.next_conn;
        relay.next_conn += 1;
        relay.connections.insert(
            conn,
            Connection {
                outbox,
                hosting: None,
                game: None,
            },
        );
        tracing::debug!("Connection {} opened", conn);
        conn
    }

    /// Forget a connection, withdrawing its challenge and forfeiting its game
    pub fn disconnect(&self, conn: ConnId) {
        let mut relay = self.lock();
        let Some(connection) = relay.connections.remove(&conn) else {
            return;
        };

        if let Some(code) = connection.hosting {
            relay.challenges.remove(&code);
            tracing::info!("Challenge {} withdrawn", code);
        }

        let Some(game_id) = connection.game else {
            tracing::debug!("Connection {} closed", conn);
            return;
        };
        let Some(mut room) = relay.close_room(&game_id) else {
            return;
        };
        let Some(slot) = room.seats.iter().position(|&c| c == conn) else {
            return;
        };
        let slot = PlayerSlot::BOTH[slot];
        let leaver = room.state.player(slot).id.clone();
        let opponent = room.seats[slot.opponent().index()];

        if room.state.forfeit(&leaver).unwrap_or(false) {
            tracing::info!("Game {}: {} disconnected and forfeits", game_id, leaver);
            relay.send(
                opponent,
                ServerMessage::OpponentDisconnected {
                    game_id: game_id.clone(),
                },
            );
            if let Some(msg) = ServerMessage::game_over(&game_id, &room.state) {
                relay.send(opponent, msg);
            }
        }
    }

    // ========================================================================
    // LOBBY
    // ========================================================================

    /// Open a challenge hosted by `conn`; returns its code
    pub fn create_challenge(&self, conn: ConnId, player_name: &str) -> Result<String, RelayError> {
        let mut relay = self.lock();
        let connection = relay.connection(conn)?;
        if connection.game.is_some() {
            return Err(RelayError::AlreadyInGame);
        }
        if connection.hosting.is_some() {
            return Err(RelayError::AlreadyHosting);
        }

        let code = relay.fresh_code();
        relay.challenges.insert(
            code.clone(),
            Challenge {
                host: conn,
                host_name: display_name(player_name, "Host"),
            },
        );
        if let Some(connection) = relay.connections.get_mut(&conn) {
            connection.hosting = Some(code.clone());
        }

        tracing::info!("Challenge {} created by connection {}", code, conn);
        Ok(code)
    }

    /// Accept a challenge and start the game; returns the game id.
    ///
    /// Both players receive `game_start`. The host moves first.
    pub fn join_challenge(
        &self,
        conn: ConnId,
        code: &str,
        player_name: &str,
    ) -> Result<String, RelayError> {
        let mut relay = self.lock();
        let code = code.trim().to_ascii_uppercase();
        let joiner = relay.connection(conn)?;
        let (hosting, seated) = (joiner.hosting.is_some(), joiner.game.is_some());
        let (host, host_name) = relay
            .challenges
            .get(&code)
            .map(|c| (c.host, c.host_name.clone()))
            .ok_or(RelayError::UnknownChallenge)?;
        if host == conn {
            return Err(RelayError::OwnChallenge);
        }
        if hosting {
            return Err(RelayError::AlreadyHosting);
        }
        if seated {
            return Err(RelayError::AlreadyInGame);
        }

        let game_id = format!("game-{}", relay.next_game);
        let seed: u64 = relay.rng.gen();
        let config = relay.config.clone().with_seed(seed);
        let players = [
            Player::new(format!("{}:one", game_id), host_name),
            Player::new(format!("{}:two", game_id), display_name(player_name, "Guest")),
        ];
        let state = GameState::new(&config, players)?;

        relay.next_game += 1;
        relay.challenges.remove(&code);
        if let Some(connection) = relay.connections.get_mut(&host) {
            connection.hosting = None;
            connection.game = Some(game_id.clone());
        }
        if let Some(connection) = relay.connections.get_mut(&conn) {
            connection.game = Some(game_id.clone());
        }

        let seats = [host, conn];
        for slot in PlayerSlot::BOTH {
            relay.send(
                seats[slot.index()],
                ServerMessage::GameStart {
                    game_id: game_id.clone(),
                    player_id: state.player(slot).id.clone(),
                    state: Box::new(state.clone()),
                },
            );
        }

        tracing::info!(
            "Game {} started from challenge {} (seed {}, {}x{})",
            game_id,
            code,
            seed,
            config.size,
            config.size
        );
        relay.games.insert(game_id.clone(), Room { state, seats });
        Ok(game_id)
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Apply a move for the player seated at `conn`.
    ///
    /// Rule violations come back as an unsuccessful response, not an error.
    /// On success both seats receive `game_update` (and `game_over` when
    /// the move ends the game).
    pub fn place_move(
        &self,
        conn: ConnId,
        game_id: &str,
        player_id: &PlayerId,
        color: Color,
    ) -> Result<MoveResponse, RelayError> {
        let mut relay = self.lock();
        relay.connection(conn)?;
        let room = relay
            .games
            .get_mut(game_id)
            .ok_or(RelayError::UnknownGame)?;
        let slot = room
            .state
            .slot_of(player_id)
            .filter(|slot| room.seats[slot.index()] == conn)
            .ok_or(RelayError::NotAParticipant)?;

        let outcome = match room.state.apply_move(player_id, color) {
            Ok(outcome) => outcome,
            Err(reason) => {
                tracing::debug!("Game {}: rejected {:?} from {}: {}", game_id, color, player_id, reason);
                return Ok(MoveResponse {
                    success: false,
                    captured: Vec::new(),
                    new_state: None,
                    reason: Some(reason),
                });
            }
        };

        let state = room.state.clone();
        let seats = room.seats;
        tracing::debug!(
            "Game {}: {:?} played color {} (v{})",
            game_id,
            slot,
            color.0,
            state.version()
        );

        for seat in seats {
            relay.send(
                seat,
                ServerMessage::GameUpdate {
                    game_id: game_id.to_string(),
                    state: Box::new(state.clone()),
                    captured: outcome.captured.clone(),
                },
            );
        }
        if let Some(msg) = ServerMessage::game_over(game_id, &state) {
            tracing::info!("Game {} over: {:?}", game_id, state.winner());
            for seat in seats {
                relay.send(seat, msg.clone());
            }
            relay.close_room(game_id);
        }

        Ok(MoveResponse {
            success: true,
            captured: outcome.captured,
            new_state: Some(state),
            reason: None,
        })
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Handle one inbound message, replying on the sender's outbox
    pub fn handle(&self, conn: ConnId, msg: ClientMessage) {
        let reply = match msg {
            ClientMessage::CreateChallenge { player_name } => self
                .create_challenge(conn, &player_name)
                .map(|code| Some(ServerMessage::ChallengeCreated { code })),
            ClientMessage::JoinChallenge { code, player_name } => {
                self.join_challenge(conn, &code, &player_name).map(|_| None)
            }
            ClientMessage::PlaceMove {
                game_id,
                player_id,
                color,
            } => self
                .place_move(conn, &game_id, &player_id, color)
                .map(|response| Some(response.into())),
        };

        match reply {
            Ok(Some(msg)) => self.send(conn, msg),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("Connection {}: {}", conn, e);
                self.send(conn, ServerMessage::error(e));
            }
        }
    }

    pub fn send(&self, conn: ConnId, msg: ServerMessage) {
        self.lock().send(conn, msg);
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn game_count(&self) -> usize {
        self.lock().games.len()
    }

    pub fn challenge_count(&self) -> usize {
        self.lock().challenges.len()
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Copy of a live game's state
    pub fn game_state(&self, game_id: &str) -> Option<GameState> {
        self.lock().games.get(game_id).map(|room| room.state.clone())
    }

    /// Board settings used for new games
    pub fn game_config(&self) -> GameConfig {
        self.lock().config.clone()
    }
}

fn display_name(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_codes_use_alphabet() {
        let relay = Relay::new(GameConfig::new(4, 0), Some(1));
        let (tx, _rx) = unbounded_channel();
        let conn = relay.connect(tx);
        let code = relay.create_challenge(conn, "Ann").unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_fresh_codes_are_unique() {
        let relay = Relay::new(GameConfig::new(4, 0), Some(2));
        let mut codes = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..50 {
            let (tx, rx) = unbounded_channel();
            receivers.push(rx);
            let conn = relay.connect(tx);
            codes.push(relay.create_challenge(conn, "").unwrap());
        }
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 50);
        assert_eq!(relay.challenge_count(), 50);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name("  ", "Guest"), "Guest");
        assert_eq!(display_name(" Bo ", "Guest"), "Bo");
    }

    #[test]
    fn test_unknown_connection() {
        let relay = Relay::new(GameConfig::default(), Some(3));
        assert_eq!(
            relay.create_challenge(99, "x"),
            Err(RelayError::UnknownConnection)
        );
    }
}
