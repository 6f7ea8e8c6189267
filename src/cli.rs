use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for orðaleikur, the Icelandic word game!
#[derive(Debug, Parser)]
pub struct Cli {
    #[command(subcommand)]
    pub intent: Intent,
    /// Directory in which game records are kept
    #[arg(short, long, default_value = "games")]
    pub store: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Intent {
    /// Start a new game
    New {
        /// Player display names, in turn order (up to four)
        #[arg(short, long, required = true)]
        player: Vec<String>,
        /// Display name of the game
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Resume a stored game
    Resume {
        /// Identifier of the game to resume
        game_id: String,
    },
}
