use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::game::moves::MoveRecord;

use super::{GameRecord, GameStore, StoreError};

/// Keeps each game as a pair of JSON documents under one directory:
/// `<id>.json` for the snapshot and `<id>.moves.json` for the move log.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn game_path(&self, game_id: &str) -> PathBuf {
        self.root.join(format!("{game_id}.json"))
    }

    fn moves_path(&self, game_id: &str) -> PathBuf {
        self.root.join(format!("{game_id}.moves.json"))
    }
}

#[async_trait]
impl GameStore for JsonFileStore {
    async fn load(&self, game_id: &str) -> Result<GameRecord, StoreError> {
        let bytes = match fs::read(self.game_path(game_id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(game_id.into()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, game_id: &str, record: &GameRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;
        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(self.game_path(game_id), bytes).await?;
        Ok(())
    }

    async fn append_move(&self, game_id: &str, entry: &MoveRecord) -> Result<(), StoreError> {
        let mut log = self.moves(game_id).await?;
        log.push(entry.clone());

        fs::create_dir_all(&self.root).await?;
        let bytes = serde_json::to_vec_pretty(&log)?;
        fs::write(self.moves_path(game_id), bytes).await?;
        Ok(())
    }

    async fn moves(&self, game_id: &str) -> Result<Vec<MoveRecord>, StoreError> {
        let bytes = match fs::read(self.moves_path(game_id)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
