//! Word extraction and scoring.
//!
//! Only the single line through this turn's placements is considered; a
//! placement that incidentally completes a word in the crossing direction
//! does not score it. Word multipliers covered by several new tiles in one
//! play compound multiplicatively. Both behaviors are deliberate.

use super::board::{Board, Position};
use super::moves::PlayRejection;
use super::tile::PlacedTile;

/// The axis a play runs along. A single placed tile satisfies both and
/// resolves to horizontal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Expands this turn's placements into the complete word they take part
/// in, picking up neighboring tiles committed in earlier turns.
///
/// The scan starts at the outermost placed coordinates and walks outward
/// along the line while cells are occupied, stopping at the first gap or
/// the board edge. The result is every collected position in reading
/// order, and is independent of the order the tiles were placed.
pub fn extract_word(
    board: &Board,
    placed: &[PlacedTile],
) -> Result<Vec<Position>, PlayRejection> {
    let first = match placed.first() {
        Some(tile) => tile.position(),
        None => return Err(PlayRejection::NoTilesPlaced),
    };

    let horizontal = placed.iter().all(|tile| tile.position().y() == first.y());
    let vertical = placed.iter().all(|tile| tile.position().x() == first.x());

    let orientation = if horizontal {
        Orientation::Horizontal
    } else if vertical {
        Orientation::Vertical
    } else {
        return Err(PlayRejection::NotInLine);
    };

    let mut positions: Vec<Position> = placed.iter().map(PlacedTile::position).collect();

    let (axis, back, forward): (
        fn(&Position) -> u8,
        fn(&Position) -> Option<Position>,
        fn(&Position) -> Option<Position>,
    ) = match orientation {
        Orientation::Horizontal => (Position::x, Position::left, Position::right),
        Orientation::Vertical => (Position::y, Position::up, Position::down),
    };

    let start = positions.iter().copied().min_by_key(|p| axis(p)).unwrap();
    let end = positions.iter().copied().max_by_key(|p| axis(p)).unwrap();

    // Walk toward the start of the line
    let mut cursor = back(&start);
    while let Some(position) = cursor {
        if !board.is_occupied(position) {
            break;
        }
        positions.push(position);
        cursor = back(&position);
    }

    // Walk toward the end of the line
    let mut cursor = forward(&end);
    while let Some(position) = cursor {
        if !board.is_occupied(position) {
            break;
        }
        positions.push(position);
        cursor = forward(&position);
    }

    positions.sort_by_key(|p| axis(p));
    Ok(positions)
}

/// Scores the word covering `word_positions`.
///
/// Two passes: the first sums letter values, doubling or tripling the
/// contribution of newly placed tiles on letter-bonus cells and
/// accumulating word multipliers from newly placed tiles on word-bonus
/// cells; the second applies the accumulated word multiplier to the sum.
/// Tiles committed in earlier turns always contribute their raw value,
/// whatever cell they sit on.
pub fn score_word(
    board: &Board,
    placed: &[PlacedTile],
    word_positions: &[Position],
) -> u32 {
    let mut letter_score = 0;
    let mut word_multiplier = 1;

    for &position in word_positions {
        let cell = &board[position];
        let tile = match cell.tile() {
            Some(tile) => tile,
            None => continue,
        };

        let mut value = tile.tile().value() as u32;

        let newly_placed = placed.iter().any(|t| t.position() == position);
        if newly_placed {
            value *= cell.bonus().letter_multiplier();
            word_multiplier *= cell.bonus().word_multiplier();
        }

        letter_score += value;
    }

    letter_score * word_multiplier
}

/// Reads the word's text off the board in order. Blanks contribute no
/// letter.
pub fn word_text(board: &Board, word_positions: &[Position]) -> String {
    word_positions
        .iter()
        .filter_map(|&position| board.tile_at(position))
        .filter_map(|placed| placed.tile().letter())
        .collect()
}
