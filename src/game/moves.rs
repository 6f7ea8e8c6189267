use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::Position;
use super::tile::PlacedTile;

/// What a player did on a committed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Tiles were laid on the board and scored as a word.
    PlaceTiles,
    /// The player reordered their rack.
    Shuffle,
    /// The turn was given up without scoring.
    Pass,
}

/// One entry in a game's append-only move log. The log exists for the
/// history panel only; resuming a game rebuilds state from the snapshot,
/// never by replaying these entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Id of the player who acted.
    pub actor: Box<str>,
    /// The word that was formed, or empty for shuffle and pass moves.
    pub word: Box<str>,
    pub score: u32,
    pub kind: MoveKind,
    /// Coordinates and letters of this turn's placements; empty unless
    /// `kind` is [`MoveKind::PlaceTiles`].
    pub placed: Box<[PlacedTile]>,
}

/// Writes this record as it appears in the history panel.
impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::PlaceTiles => {
                write!(f, "{} played \"{}\" for {} points", self.actor, self.word, self.score)
            }
            MoveKind::Shuffle => write!(f, "{} shuffled their rack", self.actor),
            MoveKind::Pass => write!(f, "{} passed", self.actor),
        }
    }
}

/// An attempted word play that cannot be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum PlayRejection {
    /// The player asked to play before laying any tile on the board.
    #[error("no tiles have been placed this turn")]
    NoTilesPlaced,
    /// This turn's tiles do not all share a row or a column.
    #[error("placed tiles must form a single horizontal or vertical line")]
    NotInLine,
}

/// Reason a player action was refused. Rejections are local and non-fatal:
/// the action is a no-op and the game state is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum ActionRejection {
    /// The player tried to select a tile they do not hold.
    #[error("that tile is not in the rack")]
    TileNotInRack,
    /// A cell was clicked with no tile selected.
    #[error("no tile is selected")]
    NoTileSelected,
    /// The target cell already holds a tile.
    #[error("cell {position} is already occupied")]
    CellOccupied { position: Position },
    #[error("cannot play: {0}")]
    UnplayableWord(#[from] PlayRejection),
    /// The game has ended; no further moves are accepted.
    #[error("the game is over")]
    GameOver,
}
