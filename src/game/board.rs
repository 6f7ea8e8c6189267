use std::{fmt, ops, str::FromStr};

use serde::{Deserialize, Serialize};

use super::tile::PlacedTile;

/// A coordinate on the 15×15 board. `x` runs left to right across the
/// columns `a` through `o`, `y` top to bottom across the rows `1` through
/// `15`. The textual form is `"<row>-<column>"`, e.g. `"8-h"` for the
/// center cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    x: u8,
    y: u8,
}

impl Position {
    /// Cells per side of the board.
    pub const GRID: u8 = 15;

    /// # Panics
    ///
    /// Panics if either coordinate is outside `0..15`. Positions built from
    /// player input go through [`FromStr`], which validates instead.
    pub fn new(x: u8, y: u8) -> Self {
        assert!(
            x < Self::GRID && y < Self::GRID,
            "position ({x}, {y}) is off the board"
        );
        Self { x, y }
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    /// The neighboring position one column to the left, if it exists.
    pub fn left(&self) -> Option<Position> {
        if self.x == 0 { None } else { Some(Position { x: self.x - 1, y: self.y }) }
    }

    /// The neighboring position one column to the right, if it exists.
    pub fn right(&self) -> Option<Position> {
        if self.x + 1 == Self::GRID { None } else { Some(Position { x: self.x + 1, y: self.y }) }
    }

    /// The neighboring position one row up, if it exists.
    pub fn up(&self) -> Option<Position> {
        if self.y == 0 { None } else { Some(Position { x: self.x, y: self.y - 1 }) }
    }

    /// The neighboring position one row down, if it exists.
    pub fn down(&self) -> Option<Position> {
        if self.y + 1 == Self::GRID { None } else { Some(Position { x: self.x, y: self.y + 1 }) }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.y + 1, (b'a' + self.x) as char)
    }
}

impl FromStr for Position {
    type Err = PositionFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use PositionFromStrError::*;

        let mut split = s.split('-');
        let row_str = split.next().ok_or(NoDash)?;
        let col_str = split.next().ok_or(NoDash)?;
        if split.next().is_some() {
            return Err(TwoDashes);
        }

        let row: u8 = row_str.parse()?;
        if !(1..=Self::GRID).contains(&row) {
            return Err(InvalidRow(row));
        }

        // The column is a single letter
        let mut col_chars = col_str.chars();
        let col = match (col_chars.next(), col_chars.next()) {
            (Some(col @ 'a'..='o'), None) => col,
            (Some(col @ 'A'..='O'), None) => col.to_ascii_lowercase(),
            _ => return Err(InvalidColumn(col_str.to_owned())),
        };

        Ok(Position { x: col as u8 - b'a', y: row - 1 })
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>
    {
        let string: String = Deserialize::deserialize(deserializer)?;
        string.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionFromStrError {
    #[error("expected \"-\"")]
    NoDash,
    #[error("found two dashes in position")]
    TwoDashes,
    #[error("error parsing row: {0}")]
    ErrorParsingRow(#[from] std::num::ParseIntError),
    #[error("invalid row: {0}")]
    InvalidRow(u8),
    #[error("invalid column: {0}")]
    InvalidColumn(String),
}

/// Scoring bonus tied to a board cell. Assigned once when the board is
/// created and fixed for the lifetime of the game. Bonuses scale the score
/// of a play only for tiles newly placed on them that turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bonus {
    #[default]
    None,
    DoubleLetter,
    TripleLetter,
    DoubleWord,
    TripleWord,
    /// The starting cell at the middle of the board. Carries no multiplier.
    CenterStar,
}

impl Bonus {
    /// Factor applied to the value of a newly placed tile on this cell.
    pub fn letter_multiplier(self) -> u32 {
        match self {
            Bonus::DoubleLetter => 2,
            Bonus::TripleLetter => 3,
            _ => 1,
        }
    }

    /// Factor this cell contributes to the whole word's multiplier when a
    /// tile is newly placed on it.
    pub fn word_multiplier(self) -> u32 {
        match self {
            Bonus::DoubleWord => 2,
            Bonus::TripleWord => 3,
            _ => 1,
        }
    }

    /// Icelandic description shown to players.
    pub fn description(self) -> &'static str {
        match self {
            Bonus::None => "",
            Bonus::DoubleLetter => "Tvöfaldur stafur",
            Bonus::TripleLetter => "Þrefaldur stafur",
            Bonus::DoubleWord => "Tvöfalt orð",
            Bonus::TripleWord => "Þrefalt orð",
            Bonus::CenterStar => "Miðjureitur",
        }
    }
}

/// Bonus cell layouts as `(row, column)` pairs.
const TRIPLE_WORD_CELLS: [(u8, u8); 8] = [
    (0, 0), (0, 7), (0, 14),
    (7, 0), (7, 14),
    (14, 0), (14, 7), (14, 14),
];

const DOUBLE_WORD_CELLS: [(u8, u8); 16] = [
    (1, 1), (2, 2), (3, 3), (4, 4),
    (1, 13), (2, 12), (3, 11), (4, 10),
    (10, 4), (11, 3), (12, 2), (13, 1),
    (10, 10), (11, 11), (12, 12), (13, 13),
];

const TRIPLE_LETTER_CELLS: [(u8, u8); 12] = [
    (1, 5), (1, 9),
    (5, 1), (5, 5), (5, 9), (5, 13),
    (9, 1), (9, 5), (9, 9), (9, 13),
    (13, 5), (13, 9),
];

const DOUBLE_LETTER_CELLS: [(u8, u8); 24] = [
    (0, 3), (0, 11),
    (2, 6), (2, 8),
    (3, 0), (3, 7), (3, 14),
    (6, 2), (6, 6), (6, 8), (6, 12),
    (7, 3), (7, 11),
    (8, 2), (8, 6), (8, 8), (8, 12),
    (11, 0), (11, 7), (11, 14),
    (12, 6), (12, 8),
    (14, 3), (14, 11),
];

/// One of the 225 cells on the board. Holds at most one tile; once a play
/// is committed the occupying tile never moves again.
#[derive(Debug, Clone)]
pub struct BoardCell {
    position: Position,
    bonus: Bonus,
    tile: Option<PlacedTile>,
}

impl BoardCell {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn bonus(&self) -> Bonus {
        self.bonus
    }

    pub fn tile(&self) -> Option<&PlacedTile> {
        self.tile.as_ref()
    }
}

/// The 15×15 play grid. Bonus assignment is data-driven from the fixed
/// coordinate tables above and never recomputed; because of that, the
/// layout is not persisted either, and loading a game rebuilds it.
#[derive(Debug, Clone)]
pub struct Board {
    /// Row-major, `y * 15 + x`.
    cells: Vec<BoardCell>,
}

impl Board {
    /// Creates a new empty board with every bonus in place.
    pub fn new() -> Self {
        let mut cells = Vec::with_capacity(Position::GRID as usize * Position::GRID as usize);
        for y in 0..Position::GRID {
            for x in 0..Position::GRID {
                cells.push(BoardCell {
                    position: Position::new(x, y),
                    bonus: Self::bonus_at(x, y),
                    tile: None,
                });
            }
        }
        Self { cells }
    }

    fn bonus_at(x: u8, y: u8) -> Bonus {
        if (y, x) == (7, 7) {
            Bonus::CenterStar
        } else if TRIPLE_WORD_CELLS.contains(&(y, x)) {
            Bonus::TripleWord
        } else if DOUBLE_WORD_CELLS.contains(&(y, x)) {
            Bonus::DoubleWord
        } else if TRIPLE_LETTER_CELLS.contains(&(y, x)) {
            Bonus::TripleLetter
        } else if DOUBLE_LETTER_CELLS.contains(&(y, x)) {
            Bonus::DoubleLetter
        } else {
            Bonus::None
        }
    }

    fn index_of(position: Position) -> usize {
        position.y() as usize * Position::GRID as usize + position.x() as usize
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self[position].tile.is_some()
    }

    pub fn tile_at(&self, position: Position) -> Option<&PlacedTile> {
        self[position].tile.as_ref()
    }

    /// Writes a tile into its cell.
    ///
    /// # Panics
    ///
    /// The cell must be empty; callers check occupancy first and reject the
    /// placement otherwise.
    pub(crate) fn put_tile(&mut self, placed: PlacedTile) {
        let cell = &mut self.cells[Self::index_of(placed.position())];
        assert!(cell.tile.is_none(), "cell {} is already occupied", cell.position);
        cell.tile = Some(placed);
    }

    /// Removes and returns the tile at a position. Used only to recall
    /// uncommitted tiles.
    pub(crate) fn take_tile(&mut self, position: Position) -> Option<PlacedTile> {
        self.cells[Self::index_of(position)].tile.take()
    }

    /// Clears the new-tile marker on every occupied cell. Called exactly
    /// once per play, at commit.
    pub(crate) fn commit_all(&mut self) {
        for cell in &mut self.cells {
            if let Some(tile) = cell.tile.as_mut() {
                tile.commit();
            }
        }
    }

    /// All tiles currently on the board, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = &PlacedTile> {
        self.cells.iter().filter_map(|cell| cell.tile.as_ref())
    }

    /// Iterates the cells of one row, left to right.
    pub fn row(&self, y: u8) -> impl Iterator<Item = &BoardCell> {
        let start = Self::index_of(Position::new(0, y));
        self.cells[start..start + Position::GRID as usize].iter()
    }
}

impl ops::Index<Position> for Board {
    type Output = BoardCell;

    fn index(&self, index: Position) -> &Self::Output {
        &self.cells[Self::index_of(index)]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn position_parsing() {
        assert_eq!("8-h".parse(), Ok(Position::new(7, 7)));
        assert_eq!("8-H".parse(), Ok(Position::new(7, 7)));
        assert_eq!("1-a".parse(), Ok(Position::new(0, 0)));
        assert_eq!("15-o".parse(), Ok(Position::new(14, 14)));
        assert_eq!("16-a".parse::<Position>(), Err(PositionFromStrError::InvalidRow(16)));
        assert_eq!(
            "8-p".parse::<Position>(),
            Err(PositionFromStrError::InvalidColumn("p".to_owned()))
        );
        assert_eq!("h".parse::<Position>(), Err(PositionFromStrError::NoDash));
        assert_eq!("".parse::<Position>(), Err(PositionFromStrError::NoDash));
    }

    #[test]
    fn position_display_round_trip() {
        for y in 0..Position::GRID {
            for x in 0..Position::GRID {
                let position = Position::new(x, y);
                assert_eq!(position.to_string().parse(), Ok(position));
            }
        }
    }

    #[test]
    fn neighbors_respect_edges() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.left(), None);
        assert_eq!(corner.up(), None);
        assert_eq!(corner.right(), Some(Position::new(1, 0)));
        assert_eq!(corner.down(), Some(Position::new(0, 1)));

        let far = Position::new(14, 14);
        assert_eq!(far.right(), None);
        assert_eq!(far.down(), None);
    }

    #[test]
    fn bonus_layout() {
        let board = Board::new();

        assert_eq!(board[Position::new(7, 7)].bonus(), Bonus::CenterStar);
        assert_eq!(board[Position::new(0, 0)].bonus(), Bonus::TripleWord);
        assert_eq!(board[Position::new(7, 0)].bonus(), Bonus::TripleWord);
        assert_eq!(board[Position::new(1, 1)].bonus(), Bonus::DoubleWord);
        assert_eq!(board[Position::new(5, 1)].bonus(), Bonus::TripleLetter);
        assert_eq!(board[Position::new(3, 0)].bonus(), Bonus::DoubleLetter);
        assert_eq!(board[Position::new(2, 1)].bonus(), Bonus::None);

        let mut counts = std::collections::HashMap::new();
        for y in 0..Position::GRID {
            for cell in board.row(y) {
                *counts.entry(cell.bonus()).or_insert(0) += 1;
            }
        }
        assert_eq!(counts[&Bonus::TripleWord], 8);
        assert_eq!(counts[&Bonus::DoubleWord], 16);
        assert_eq!(counts[&Bonus::TripleLetter], 12);
        assert_eq!(counts[&Bonus::DoubleLetter], 24);
        assert_eq!(counts[&Bonus::CenterStar], 1);
        assert_eq!(counts[&Bonus::None], 225 - 61);
    }

    #[test]
    fn new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.occupied().count(), 0);
    }
}
