use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::game::moves::MoveRecord;

use super::{GameRecord, GameStore, StoreError};

/// An in-memory store. Serves as the test fake and for offline play where
/// nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<Box<str>, GameRecord>>,
    moves: Mutex<HashMap<Box<str>, Vec<MoveRecord>>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshot writes accepted so far. Lets tests observe
    /// debounce coalescing.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn load(&self, game_id: &str) -> Result<GameRecord, StoreError> {
        self.games
            .lock()
            .unwrap()
            .get(game_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(game_id.into()))
    }

    async fn save(&self, game_id: &str, record: &GameRecord) -> Result<(), StoreError> {
        self.games
            .lock()
            .unwrap()
            .insert(game_id.into(), record.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn append_move(&self, game_id: &str, entry: &MoveRecord) -> Result<(), StoreError> {
        self.moves
            .lock()
            .unwrap()
            .entry(game_id.into())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, StoreError> {
        Ok(self
            .moves
            .lock()
            .unwrap()
            .get(game_id)
            .cloned()
            .unwrap_or_default())
    }
}
