use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::Position;
use super::letters::{BLANK_COUNT, LETTER_DISTRIBUTION, TILE_COUNT};

/// Tiles a rack is refilled up to after every committed play.
pub const RACK_SIZE: usize = 7;

/// A single letter piece. Every tile in a game has a unique id, and lives
/// in exactly one place at a time: the bag, one player's rack, or one
/// board cell. Blanks have no letter and are worth nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: Box<str>,
    letter: Option<char>,
    value: u8,
}

impl Tile {
    pub fn new(id: impl Into<Box<str>>, letter: Option<char>, value: u8) -> Self {
        Self { id: id.into(), letter, value }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_blank(&self) -> bool {
        self.letter.is_none()
    }

    /// Wraps this tile for the board as part of the current turn.
    pub fn place(self, position: Position) -> PlacedTile {
        PlacedTile { tile: self, position, is_new: true }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter {
            Some(letter) => write!(f, "{letter}"),
            None => write!(f, "?"),
        }
    }
}

/// A tile positioned on the board. `is_new` marks tiles placed in the
/// current, not-yet-committed turn; it is cleared exactly once, when the
/// play is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    #[serde(flatten)]
    tile: Tile,
    position: Position,
    is_new: bool,
}

impl PlacedTile {
    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub(crate) fn commit(&mut self) {
        self.is_new = false;
    }

    /// Strips the placement wrapping, returning the bare tile. Used when a
    /// player recalls this turn's tiles to the rack.
    pub fn into_tile(self) -> Tile {
        self.tile
    }
}

/// The shared pool of undrawn tiles. Built once per game from the letter
/// distribution and only ever shrinks; drawn tiles never return.
#[derive(Debug, Clone)]
pub struct TileBag {
    tiles: Vec<Tile>,
}

impl TileBag {
    /// Builds the full Icelandic tile set in uniformly random order.
    pub fn standard() -> Self {
        Self::standard_with_rng(&mut rand::thread_rng())
    }

    /// Builds the bag using a specific RNG (for testing/seeding).
    pub fn standard_with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut tiles = Vec::with_capacity(TILE_COUNT);

        for &(letter, count, value) in LETTER_DISTRIBUTION.iter() {
            for n in 0..count {
                tiles.push(Tile::new(format!("{letter}-{n}"), Some(letter), value));
            }
        }
        for n in 0..BLANK_COUNT {
            tiles.push(Tile::new(format!("?-{n}"), None, 0));
        }

        // Fisher-Yates
        tiles.shuffle(rng);

        Self { tiles }
    }

    /// Rebuilds a bag from persisted tiles, preserving their order.
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Removes and returns the next `count` tiles, or all remaining tiles
    /// if fewer are left. Never fails on over-request.
    pub fn draw(&mut self, count: usize) -> Vec<Tile> {
        let count = count.min(self.tiles.len());
        self.tiles.drain(..count).collect()
    }
}

/// A player's private hand of up to [`RACK_SIZE`] tiles.
#[derive(Debug, Clone, Default)]
pub struct Rack {
    tiles: Vec<Tile>,
}

impl Rack {
    /// Rebuilds a rack from persisted tiles.
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tiles.iter().any(|tile| tile.id() == id)
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Removes the tile with the given id, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Tile> {
        let index = self.tiles.iter().position(|tile| tile.id() == id)?;
        Some(self.tiles.remove(index))
    }

    /// Inserts a tile back into the rack. If the rack is already full, the
    /// tile is returned rather than inserted.
    pub fn insert(&mut self, tile: Tile) -> Result<(), Tile> {
        if self.tiles.len() == RACK_SIZE {
            return Err(tile);
        }
        self.tiles.push(tile);
        Ok(())
    }

    /// Draws from the bag until the rack holds [`RACK_SIZE`] tiles or the
    /// bag runs out, whichever comes first.
    pub fn refill_from(&mut self, bag: &mut TileBag) {
        let missing = RACK_SIZE.saturating_sub(self.tiles.len());
        self.tiles.extend(bag.draw(missing));
    }

    /// Reorders the rack uniformly at random. The tiles themselves are
    /// untouched.
    pub fn shuffle_with_rng<R: Rng>(&mut self, rng: &mut R) {
        self.tiles.shuffle(rng);
    }
}
