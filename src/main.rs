use std::sync::Arc;

use clap::Parser;
use rand::Rng;

mod cli;
mod client;
mod game;
mod store;

use client::LocalClient;
use game::session::{GameSession, PlayerSeed, MAX_PLAYERS};
use store::{DebouncedSaver, GameRecord, GameStore, JsonFileStore, LoadError, StoreError};

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cannot resume: {0}")]
    Unrecoverable(LoadError),
    #[error("a game seats one to {MAX_PLAYERS} players")]
    BadPlayerCount,
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let store = Arc::new(JsonFileStore::new(cli.store));

    let result = match cli.intent {
        cli::Intent::New { player, name } => new_game(store, player, name).await,
        cli::Intent::Resume { game_id } => resume(store, game_id).await,
    };

    if let Err(why) = result {
        eprintln!("Could not run the game: {why}");
        std::process::exit(1);
    }
}

/// Starts a fresh game, persists its first snapshot, and hands off to the
/// terminal client.
async fn new_game(
    store: Arc<JsonFileStore>,
    players: Vec<String>,
    name: Option<String>,
) -> Result<(), RunError> {
    if players.is_empty() || players.len() > MAX_PLAYERS {
        return Err(RunError::BadPlayerCount);
    }

    // Local hot-seat players get synthetic ids; an identity collaborator
    // would supply real ones.
    let seeds: Vec<PlayerSeed> = players
        .into_iter()
        .enumerate()
        .map(|(index, name)| PlayerSeed {
            id: format!("player-{index}").into_boxed_str(),
            name: name.into_boxed_str(),
        })
        .collect();

    let game_id = format!("leikur-{:06x}", rand::thread_rng().gen_range(0..0x100_0000));
    let game_name = name.unwrap_or_else(|| format!("Leikur {game_id}"));

    let session = GameSession::start(&seeds);
    store
        .save(&game_id, &GameRecord::snapshot(&game_name, &session))
        .await?;
    println!("Created game {game_id}. Resume it later with: ordaleikur resume {game_id}");

    run_client(store, session, game_id, game_name).await
}

/// Loads a stored game. An inconsistent snapshot falls back to a fresh
/// board and bag for the same players; a snapshot with no recoverable
/// players is fatal.
async fn resume(store: Arc<JsonFileStore>, game_id: String) -> Result<(), RunError> {
    let record = store.load(&game_id).await?;
    let game_name = record.name.to_string();

    let history = match store.moves(&game_id).await {
        Ok(history) => history,
        Err(why) => {
            eprintln!("warning: could not read the move history: {why}");
            Vec::new()
        }
    };

    let fallback_seeds: Vec<PlayerSeed> = record
        .players
        .iter()
        .map(|player| PlayerSeed { id: player.id.clone(), name: player.name.clone() })
        .collect();

    let session = match record.into_session(history) {
        Ok(session) => session,
        Err(LoadError::NoPlayers) => return Err(RunError::Unrecoverable(LoadError::NoPlayers)),
        Err(why) if fallback_seeds.len() > MAX_PLAYERS => return Err(RunError::Unrecoverable(why)),
        Err(why) => {
            // The stored tile data is inconsistent; the players are still
            // good, so restart them on a fresh board and bag.
            eprintln!("warning: stored game is inconsistent ({why}); dealing a fresh board and bag");
            let session = GameSession::start(&fallback_seeds);
            store
                .save(&game_id, &GameRecord::snapshot(&game_name, &session))
                .await?;
            session
        }
    };

    run_client(store, session, game_id, game_name).await
}

async fn run_client(
    store: Arc<JsonFileStore>,
    session: GameSession,
    game_id: String,
    game_name: String,
) -> Result<(), RunError> {
    let store: Arc<dyn GameStore> = store;
    let saver = DebouncedSaver::new(store.clone(), game_id.clone(), DebouncedSaver::DEFAULT_WINDOW);

    LocalClient::new(session, game_id, game_name, store, saver)
        .run()
        .await?;
    Ok(())
}
