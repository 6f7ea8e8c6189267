//! The game-record store boundary.
//!
//! A [`GameStore`] is constructed explicitly and passed in wherever
//! persistence is needed; the engine has no process-wide store state. All
//! data crossing the boundary is a typed record, and the only place a
//! record is checked is [`GameRecord::into_session`]; past that point the
//! core works with well-typed state and never re-validates shapes.
//!
//! The snapshot record is the canonical source of truth for board, bag,
//! racks and scores. The move log is append-only and feeds the history
//! panel alone; resuming never replays it onto the board.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::game::board::{Board, Position};
use crate::game::moves::MoveRecord;
use crate::game::session::{GameSession, GameState, Player};
use crate::game::tile::{PlacedTile, Rack, Tile, TileBag, RACK_SIZE};

mod file;
mod memory;
mod saver;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use saver::DebouncedSaver;

/// Whether a game can still be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Finished,
}

/// One player's persisted data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: Box<str>,
    pub name: Box<str>,
    pub score: u32,
    pub rack: Vec<Tile>,
    #[serde(default)]
    pub is_ai: bool,
}

/// The full persisted snapshot of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// Display name of the game.
    pub name: Box<str>,
    pub status: GameStatus,
    /// In turn order.
    pub players: Vec<PlayerRecord>,
    /// Index into `players`, never a player id.
    pub current_player: usize,
    /// Every tile on the board, sparse. Uncommitted tiles keep their
    /// new-tile marker so an interrupted turn survives a reload. The bonus
    /// layout is static and rebuilt on load, never stored.
    pub board_tiles: Vec<PlacedTile>,
    /// Undrawn tiles, in draw order.
    pub tile_bag: Vec<Tile>,
}

impl GameRecord {
    /// Captures the session as a record ready to persist.
    pub fn snapshot(name: &str, session: &GameSession) -> Self {
        let state = session.state();

        Self {
            name: name.into(),
            status: if state.is_game_over {
                GameStatus::Finished
            } else {
                GameStatus::InProgress
            },
            players: state
                .players
                .iter()
                .map(|player| PlayerRecord {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    score: player.score,
                    rack: player.rack.tiles().to_vec(),
                    is_ai: player.is_ai,
                })
                .collect(),
            current_player: state.current_player,
            board_tiles: state.board.occupied().cloned().collect(),
            tile_bag: state.tile_bag.tiles().to_vec(),
        }
    }

    /// Validates this record and rebuilds the in-memory session from it,
    /// together with the game's move history. This is the single decode
    /// step at the store boundary.
    ///
    /// An out-of-range turn pointer is repaired to the first player rather
    /// than rejected; everything else inconsistent yields a [`LoadError`].
    pub fn into_session(self, history: Vec<MoveRecord>) -> Result<GameSession, LoadError> {
        if self.players.is_empty() {
            return Err(LoadError::NoPlayers);
        }

        let mut seen = std::collections::HashSet::new();
        let mut check = |tile: &Tile| {
            if seen.insert(tile.id().to_owned()) {
                Ok(())
            } else {
                Err(LoadError::DuplicateTile { id: tile.id().into() })
            }
        };

        for tile in &self.tile_bag {
            check(tile)?;
        }
        for player in &self.players {
            if player.rack.len() > RACK_SIZE {
                return Err(LoadError::OversizedRack { id: player.id.clone() });
            }
            for tile in &player.rack {
                check(tile)?;
            }
        }

        let mut board = Board::new();
        let mut placed_tiles = Vec::new();
        for placed in self.board_tiles {
            check(placed.tile())?;
            if board.is_occupied(placed.position()) {
                return Err(LoadError::CellCollision { position: placed.position() });
            }
            if placed.is_new() {
                placed_tiles.push(placed.clone());
            }
            board.put_tile(placed);
        }

        let current_player = if self.current_player < self.players.len() {
            self.current_player
        } else {
            0
        };

        let players: Vec<Player> = self
            .players
            .into_iter()
            .enumerate()
            .map(|(index, record)| Player {
                id: record.id,
                name: record.name,
                score: record.score,
                rack: Rack::from_tiles(record.rack),
                is_ai: record.is_ai,
                is_active: index == current_player,
            })
            .collect();

        let is_game_over = self.status == GameStatus::Finished;
        let winner = if is_game_over {
            players
                .iter()
                .enumerate()
                .max_by(|(a_idx, a), (b_idx, b)| a.score.cmp(&b.score).then(b_idx.cmp(a_idx)))
                .map(|(index, _)| index)
        } else {
            None
        };

        Ok(GameSession::resume(
            GameState {
                board,
                players,
                current_player,
                tile_bag: TileBag::from_tiles(self.tile_bag),
                placed_tiles,
                is_game_over,
                winner,
            },
            history,
        ))
    }
}

/// Why a stored snapshot could not be turned into a playable game. The
/// caller decides the fallback: a fresh board and bag for inconsistent
/// tile data, a surfaced error when no players can be recovered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("the stored game has no players")]
    NoPlayers,
    #[error("tile \"{id}\" appears in more than one place")]
    DuplicateTile { id: Box<str> },
    #[error("two tiles stored at {position}")]
    CellCollision { position: Position },
    #[error("player \"{id}\" holds more than a rack of tiles")]
    OversizedRack { id: Box<str> },
}

/// A failure in the store itself. Never fatal to gameplay: the in-memory
/// state stays authoritative and a failed save is retried on the next
/// change.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("game \"{0}\" was not found")]
    NotFound(Box<str>),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where game snapshots and move logs live, keyed by game id.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Reads a game's snapshot.
    async fn load(&self, game_id: &str) -> Result<GameRecord, StoreError>;

    /// Writes a game's snapshot, replacing any previous one.
    async fn save(&self, game_id: &str, record: &GameRecord) -> Result<(), StoreError>;

    /// Appends one entry to a game's move log.
    async fn append_move(&self, game_id: &str, entry: &MoveRecord) -> Result<(), StoreError>;

    /// Reads a game's move log, oldest first. A game with no moves yet
    /// yields an empty log.
    async fn moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, StoreError>;
}
