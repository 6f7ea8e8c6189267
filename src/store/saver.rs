use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::{GameRecord, GameStore};

/// Debounces snapshot writes so gameplay never waits on the store.
///
/// Queuing a snapshot is cheap and non-blocking; a background task saves
/// it once no newer snapshot has arrived for the quiescence window. Rapid
/// successive snapshots coalesce into a single write, and a newer snapshot
/// always supersedes an older un-persisted one, so writes can never land
/// out of order. The in-memory state therefore stays the source of truth,
/// with the persisted copy lagging by at most the window.
///
/// Dropping the sender (via [`shutdown`](Self::shutdown)) flushes the
/// latest pending snapshot before the task exits.
#[derive(Debug)]
pub struct DebouncedSaver {
    sender: mpsc::UnboundedSender<GameRecord>,
    task: JoinHandle<()>,
}

impl DebouncedSaver {
    /// The quiescence window used by the game binary.
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

    pub fn new(store: Arc<dyn GameStore>, game_id: impl Into<Box<str>>, window: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(store, game_id.into(), window, receiver));
        Self { sender, task }
    }

    /// Queues a snapshot for saving, superseding any snapshot still
    /// waiting out the quiescence window.
    pub fn queue(&self, record: GameRecord) {
        // The task only exits once the sender is dropped
        self.sender.send(record).ok();
    }

    /// Flushes the pending snapshot, if any, and stops the background
    /// task.
    pub async fn shutdown(self) {
        drop(self.sender);
        self.task.await.ok();
    }
}

async fn run(
    store: Arc<dyn GameStore>,
    game_id: Box<str>,
    window: Duration,
    mut receiver: mpsc::UnboundedReceiver<GameRecord>,
) {
    while let Some(mut pending) = receiver.recv().await {
        // Let the snapshot age for one quiescence window, taking the
        // newest arrival instead whenever one supersedes it.
        loop {
            match timeout(window, receiver.recv()).await {
                Ok(Some(newer)) => pending = newer,
                // Sender dropped: flush what we have and stop
                Ok(None) => {
                    save(&*store, &game_id, &pending).await;
                    return;
                }
                Err(_quiescent) => break,
            }
        }

        save(&*store, &game_id, &pending).await;
    }
}

async fn save(store: &dyn GameStore, game_id: &str, record: &GameRecord) {
    // A failed save is not fatal; the next queued snapshot retries.
    if let Err(why) = store.save(game_id, record).await {
        eprintln!("warning: could not save game \"{game_id}\": {why}");
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::game::session::{GameSession, PlayerSeed};
    use crate::store::{GameStatus, MemoryStore};

    use super::*;

    fn record(name: &str) -> GameRecord {
        let seeds = [
            PlayerSeed { id: "a".into(), name: "A".into() },
            PlayerSeed { id: "b".into(), name: "B".into() },
        ];
        let session = GameSession::start_with_rng(&seeds, &mut StdRng::seed_from_u64(2));
        GameRecord::snapshot(name, &session)
    }

    #[tokio::test]
    async fn rapid_snapshots_coalesce_into_the_newest() {
        let store = Arc::new(MemoryStore::new());
        let saver = DebouncedSaver::new(store.clone(), "g1", Duration::from_millis(20));

        saver.queue(record("first"));
        saver.queue(record("second"));
        saver.queue(record("third"));

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.save_count(), 1);
        assert_eq!(&*store.load("g1").await.unwrap().name, "third");

        saver.shutdown().await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn separated_snapshots_each_persist() {
        let store = Arc::new(MemoryStore::new());
        let saver = DebouncedSaver::new(store.clone(), "g1", Duration::from_millis(10));

        saver.queue(record("first"));
        tokio::time::sleep(Duration::from_millis(60)).await;
        saver.queue(record("second"));
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(store.save_count(), 2);
        assert_eq!(&*store.load("g1").await.unwrap().name, "second");

        saver.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_flushes_the_pending_snapshot() {
        let store = Arc::new(MemoryStore::new());
        // A window long enough that only the shutdown flush can save
        let saver = DebouncedSaver::new(store.clone(), "g1", Duration::from_secs(60));

        let mut finished = record("lokið");
        finished.status = GameStatus::Finished;
        saver.queue(finished);
        saver.shutdown().await;

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load("g1").await.unwrap().status, GameStatus::Finished);
    }
}
