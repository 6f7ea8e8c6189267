use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::{Board, Position};
use super::moves::{ActionRejection, MoveKind, MoveRecord};
use super::tile::{PlacedTile, Rack, TileBag};
use super::word;

/// Hard maximum number of players at one board.
pub const MAX_PLAYERS: usize = 4;

/// Identity of a player joining a new game, supplied by the caller; the
/// engine attributes moves to the id and never authenticates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSeed {
    pub id: Box<str>,
    pub name: Box<str>,
}

/// A participant in the game.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Box<str>,
    pub name: Box<str>,
    pub score: u32,
    pub rack: Rack,
    /// Reserved for computer opponents. Nothing in the engine branches on
    /// it.
    pub is_ai: bool,
    /// Exactly one player is active at any time: the one whose turn it is.
    pub is_active: bool,
}

/// Complete in-memory state of one game. This is the authoritative copy
/// while a session runs; the persisted record may lag behind it. All
/// mutation goes through [`GameSession`].
#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    /// Turn order.
    pub players: Vec<Player>,
    /// Index into `players`. Always an index, never a player id.
    pub current_player: usize,
    pub tile_bag: TileBag,
    /// Tiles placed in the in-progress, uncommitted turn. Always a subset
    /// of the tiles on the board; empty at every turn boundary.
    pub placed_tiles: Vec<PlacedTile>,
    pub is_game_over: bool,
    /// Index of the winning player once the game is over.
    pub winner: Option<usize>,
}

/// What a successful play produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub word: String,
    pub score: u32,
}

/// Drives one game: applies the five player actions, enforces placement
/// rules, and keeps the move history. Invalid input yields an
/// [`ActionRejection`] and leaves the state untouched; no action can move
/// a tile into two places or lose one.
#[derive(Debug)]
pub struct GameSession {
    state: GameState,
    /// Id of the selected rack tile, if any. Cleared whenever the turn
    /// changes, so it always refers to the active player's rack.
    selected: Option<Box<str>>,
    history: Vec<MoveRecord>,
}

impl GameSession {
    /// Begins a new game: fresh board, full shuffled bag, every rack dealt
    /// seven tiles, first seed active.
    ///
    /// # Panics
    ///
    /// Panics if called with no players or with more than [`MAX_PLAYERS`].
    pub fn start(seeds: &[PlayerSeed]) -> Self {
        Self::start_with_rng(seeds, &mut rand::thread_rng())
    }

    /// Begins a new game using a specific RNG (for testing/seeding).
    ///
    /// # Panics
    ///
    /// Panics if called with no players or with more than [`MAX_PLAYERS`].
    pub fn start_with_rng<R: Rng>(seeds: &[PlayerSeed], rng: &mut R) -> Self {
        assert!(!seeds.is_empty(), "game started with no players");
        assert!(
            seeds.len() <= MAX_PLAYERS,
            "game has too many players, max is {MAX_PLAYERS}, got {}",
            seeds.len()
        );

        let mut tile_bag = TileBag::standard_with_rng(rng);

        let players = seeds
            .iter()
            .enumerate()
            .map(|(order, seed)| {
                let mut rack = Rack::default();
                rack.refill_from(&mut tile_bag);

                Player {
                    id: seed.id.clone(),
                    name: seed.name.clone(),
                    score: 0,
                    rack,
                    is_ai: false,
                    is_active: order == 0,
                }
            })
            .collect();

        Self {
            state: GameState {
                board: Board::new(),
                players,
                current_player: 0,
                tile_bag,
                placed_tiles: Vec::new(),
                is_game_over: false,
                winner: None,
            },
            selected: None,
            history: Vec::new(),
        }
    }

    /// Rebuilds a session around state restored from the store. The state
    /// is trusted; validation happens in the store's decode step.
    pub fn resume(state: GameState, history: Vec<MoveRecord>) -> Self {
        Self { state, selected: None, history }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// The most recent history entry, if any.
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn active_player(&self) -> &Player {
        &self.state.players[self.state.current_player]
    }

    /// Id of the currently selected rack tile.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selects a rack tile, or deselects it if it was already selected.
    /// Selecting a second tile simply replaces the selection. Touches no
    /// game state.
    pub fn select_tile(&mut self, id: &str) -> Result<(), ActionRejection> {
        self.ensure_in_progress()?;

        if !self.active_player().rack.contains(id) {
            return Err(ActionRejection::TileNotInRack);
        }

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.into());
        }
        Ok(())
    }

    /// Moves the selected tile from the active rack onto an empty cell,
    /// marking it as this turn's placement and clearing the selection.
    pub fn place_tile(&mut self, position: Position) -> Result<(), ActionRejection> {
        self.ensure_in_progress()?;

        let id = match self.selected.clone() {
            Some(id) => id,
            None => return Err(ActionRejection::NoTileSelected),
        };

        if self.state.board.is_occupied(position) {
            return Err(ActionRejection::CellOccupied { position });
        }

        let state = &mut self.state;
        let rack = &mut state.players[state.current_player].rack;
        // The selection is cleared on every turn change, so the id is still
        // in the active rack.
        let tile = match rack.remove(&id) {
            Some(tile) => tile,
            None => return Err(ActionRejection::TileNotInRack),
        };

        let placed = tile.place(position);
        state.board.put_tile(placed.clone());
        state.placed_tiles.push(placed);
        self.selected = None;
        Ok(())
    }

    /// Commits this turn's placements as a word: validates the line,
    /// scores it, records the move, refills the rack from the bag and
    /// advances the turn. On rejection nothing changes; the placed tiles
    /// stay on the board for correction or recall.
    pub fn play_word(&mut self) -> Result<PlayOutcome, ActionRejection> {
        self.ensure_in_progress()?;

        let positions = word::extract_word(&self.state.board, &self.state.placed_tiles)?;
        let score = word::score_word(&self.state.board, &self.state.placed_tiles, &positions);
        let text = word::word_text(&self.state.board, &positions);

        let state = &mut self.state;
        let player = &mut state.players[state.current_player];
        player.score += score;

        // Record the placements in their committed form
        let placed: Box<[PlacedTile]> = state
            .placed_tiles
            .iter()
            .cloned()
            .map(|mut tile| {
                tile.commit();
                tile
            })
            .collect();
        self.history.push(MoveRecord {
            actor: player.id.clone(),
            word: text.clone().into_boxed_str(),
            score,
            kind: MoveKind::PlaceTiles,
            placed,
        });

        player.rack.refill_from(&mut state.tile_bag);
        state.board.commit_all();
        state.placed_tiles.clear();

        if state.tile_bag.is_empty() && state.players[state.current_player].rack.is_empty() {
            self.finish_game();
        } else {
            self.advance_turn();
        }

        Ok(PlayOutcome { word: text, score })
    }

    /// Reorders the active player's rack at random. Board, scores and turn
    /// order are unaffected.
    pub fn shuffle_rack(&mut self) -> Result<(), ActionRejection> {
        self.shuffle_rack_with_rng(&mut rand::thread_rng())
    }

    /// Reorders the active player's rack using a specific RNG.
    pub fn shuffle_rack_with_rng<R: Rng>(&mut self, rng: &mut R) -> Result<(), ActionRejection> {
        self.ensure_in_progress()?;

        let state = &mut self.state;
        let player = &mut state.players[state.current_player];
        player.rack.shuffle_with_rng(rng);

        self.history.push(MoveRecord {
            actor: player.id.clone(),
            word: Box::default(),
            score: 0,
            kind: MoveKind::Shuffle,
            placed: Box::default(),
        });
        Ok(())
    }

    /// Gives up the turn: recalls any tiles placed this turn, then
    /// advances to the next player without scoring or drawing.
    pub fn pass_turn(&mut self) -> Result<(), ActionRejection> {
        self.ensure_in_progress()?;

        self.recall_tiles();

        self.history.push(MoveRecord {
            actor: self.active_player().id.clone(),
            word: Box::default(),
            score: 0,
            kind: MoveKind::Pass,
            placed: Box::default(),
        });

        self.advance_turn();
        Ok(())
    }

    /// Returns every tile placed this turn to the active player's rack,
    /// stripped of its placement wrapping, and clears the cells. A no-op
    /// when nothing is placed.
    pub fn recall_tiles(&mut self) {
        let state = &mut self.state;

        for placed in state.placed_tiles.drain(..) {
            if let Some(recalled) = state.board.take_tile(placed.position()) {
                // The tile came out of this rack, so reinsertion cannot
                // overflow it.
                state.players[state.current_player]
                    .rack
                    .insert(recalled.into_tile())
                    .unwrap();
            }
        }
    }

    fn advance_turn(&mut self) {
        let state = &mut self.state;
        state.players[state.current_player].is_active = false;
        state.current_player = (state.current_player + 1) % state.players.len();
        state.players[state.current_player].is_active = true;
        self.selected = None;
    }

    /// Ends the game: the winner is the highest score, ties broken by turn
    /// order.
    fn finish_game(&mut self) {
        let state = &mut self.state;
        state.is_game_over = true;
        state.winner = state
            .players
            .iter()
            .enumerate()
            .max_by(|(a_idx, a), (b_idx, b)| a.score.cmp(&b.score).then(b_idx.cmp(a_idx)))
            .map(|(index, _)| index);
        self.selected = None;
    }

    fn ensure_in_progress(&self) -> Result<(), ActionRejection> {
        if self.state.is_game_over {
            Err(ActionRejection::GameOver)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::game::letters::TILE_COUNT;
    use crate::game::moves::PlayRejection;
    use crate::game::tile::RACK_SIZE;

    use super::*;

    fn seeds(count: usize) -> Vec<PlayerSeed> {
        (0..count)
            .map(|i| PlayerSeed {
                id: format!("player-{i}").into_boxed_str(),
                name: format!("Player {}", i + 1).into_boxed_str(),
            })
            .collect()
    }

    fn session() -> GameSession {
        GameSession::start_with_rng(&seeds(2), &mut StdRng::seed_from_u64(42))
    }

    /// Every tile is in exactly one of bag, rack or board, and the total
    /// matches the distribution.
    fn assert_conservation(session: &GameSession) {
        let state = session.state();
        let mut ids = HashSet::new();
        let mut total = 0;

        for tile in state.tile_bag.tiles() {
            assert!(ids.insert(tile.id().to_owned()), "duplicate {}", tile.id());
            total += 1;
        }
        for player in &state.players {
            for tile in player.rack.tiles() {
                assert!(ids.insert(tile.id().to_owned()), "duplicate {}", tile.id());
                total += 1;
            }
        }
        for placed in state.board.occupied() {
            let id = placed.tile().id();
            assert!(ids.insert(id.to_owned()), "duplicate {id}");
            total += 1;
        }

        assert_eq!(total, TILE_COUNT);
    }

    fn assert_single_active(session: &GameSession) {
        let state = session.state();
        let active: Vec<usize> = state
            .players
            .iter()
            .enumerate()
            .filter(|(_, player)| player.is_active)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(active, vec![state.current_player]);
    }

    /// Selects the active player's rack tile at `index` and places it.
    fn put(session: &mut GameSession, index: usize, position: Position) {
        let id = session.active_player().rack.get(index).unwrap().id().to_owned();
        session.select_tile(&id).unwrap();
        session.place_tile(position).unwrap();
    }

    #[test]
    fn start_deals_seven_each() {
        let session = session();
        let state = session.state();

        assert_eq!(state.players.len(), 2);
        for player in &state.players {
            assert_eq!(player.rack.len(), RACK_SIZE);
            assert_eq!(player.score, 0);
        }
        assert_eq!(state.tile_bag.len(), TILE_COUNT - 2 * RACK_SIZE);
        assert_eq!(state.current_player, 0);
        assert!(!state.is_game_over);
        assert_conservation(&session);
        assert_single_active(&session);
    }

    #[test]
    fn selection_toggles_and_replaces() {
        let mut session = session();
        let first = session.active_player().rack.get(0).unwrap().id().to_owned();
        let second = session.active_player().rack.get(1).unwrap().id().to_owned();

        session.select_tile(&first).unwrap();
        assert_eq!(session.selected(), Some(first.as_str()));

        // Selecting another tile replaces the selection
        session.select_tile(&second).unwrap();
        assert_eq!(session.selected(), Some(second.as_str()));

        // Selecting it again deselects
        session.select_tile(&second).unwrap();
        assert_eq!(session.selected(), None);

        assert_eq!(
            session.select_tile("not-a-tile"),
            Err(ActionRejection::TileNotInRack)
        );
    }

    #[test]
    fn placement_requires_selection_and_empty_cell() {
        let mut session = session();
        let position = Position::new(7, 7);

        assert_eq!(
            session.place_tile(position),
            Err(ActionRejection::NoTileSelected)
        );

        put(&mut session, 0, position);
        assert!(session.state().board.is_occupied(position));
        assert_eq!(session.state().placed_tiles.len(), 1);
        assert_eq!(session.selected(), None);

        let id = session.active_player().rack.get(0).unwrap().id().to_owned();
        session.select_tile(&id).unwrap();
        assert_eq!(
            session.place_tile(position),
            Err(ActionRejection::CellOccupied { position })
        );
        assert_conservation(&session);
    }

    #[test]
    fn recall_returns_the_same_tiles() {
        let mut session = session();
        let before: Vec<String> = session
            .active_player()
            .rack
            .tiles()
            .iter()
            .map(|tile| tile.id().to_owned())
            .collect();

        put(&mut session, 0, Position::new(7, 7));
        put(&mut session, 0, Position::new(8, 7));
        assert_eq!(session.active_player().rack.len(), RACK_SIZE - 2);

        session.recall_tiles();
        assert_eq!(session.active_player().rack.len(), RACK_SIZE);
        assert!(session.state().placed_tiles.is_empty());
        assert!(!session.state().board.is_occupied(Position::new(7, 7)));

        let after: HashSet<String> = session
            .active_player()
            .rack
            .tiles()
            .iter()
            .map(|tile| tile.id().to_owned())
            .collect();
        let expected: HashSet<String> = before.into_iter().collect();
        assert_eq!(after, expected);

        // Recall with nothing placed is a no-op
        session.recall_tiles();
        assert_eq!(session.active_player().rack.len(), RACK_SIZE);
        assert_conservation(&session);
    }

    #[test]
    fn play_rejects_empty_and_scattered_turns() {
        let mut session = session();

        assert_eq!(
            session.play_word(),
            Err(ActionRejection::UnplayableWord(PlayRejection::NoTilesPlaced))
        );

        put(&mut session, 0, Position::new(2, 2));
        put(&mut session, 0, Position::new(3, 3));
        let racks_before: Vec<usize> =
            session.state().players.iter().map(|p| p.rack.len()).collect();

        assert_eq!(
            session.play_word(),
            Err(ActionRejection::UnplayableWord(PlayRejection::NotInLine))
        );

        // The rejection left everything in place: same racks, same board,
        // same turn, no history entry.
        let racks_after: Vec<usize> =
            session.state().players.iter().map(|p| p.rack.len()).collect();
        assert_eq!(racks_before, racks_after);
        assert_eq!(session.state().current_player, 0);
        assert_eq!(session.state().placed_tiles.len(), 2);
        assert!(session.history().is_empty());
        assert_conservation(&session);
    }

    #[test]
    fn play_commits_scores_refills_and_advances() {
        let mut session = session();

        put(&mut session, 0, Position::new(7, 7));
        put(&mut session, 0, Position::new(8, 7));

        let outcome = session.play_word().unwrap();
        let state = session.state();

        assert_eq!(state.players[0].score, outcome.score);
        assert_eq!(state.players[0].rack.len(), RACK_SIZE);
        assert!(state.placed_tiles.is_empty());
        assert!(state.board.occupied().all(|tile| !tile.is_new()));
        assert_eq!(state.current_player, 1);
        assert_eq!(session.history().len(), 1);
        let record = session.last_move().unwrap();
        assert_eq!(record.kind, MoveKind::PlaceTiles);
        assert_eq!(&*record.word, outcome.word.as_str());
        assert_eq!(record.placed.len(), 2);

        assert_conservation(&session);
        assert_single_active(&session);
    }

    #[test]
    fn committed_tiles_survive_recall() {
        let mut session = session();

        put(&mut session, 0, Position::new(7, 7));
        session.play_word().unwrap();

        // The next player cannot recall the committed tile
        session.recall_tiles();
        assert!(session.state().board.is_occupied(Position::new(7, 7)));
        assert_conservation(&session);
    }

    #[test]
    fn pass_recalls_first_and_skips_drawing() {
        let mut session = session();

        put(&mut session, 0, Position::new(5, 5));
        let bag_before = session.state().tile_bag.len();

        session.pass_turn().unwrap();
        let state = session.state();

        assert_eq!(state.current_player, 1);
        assert!(state.placed_tiles.is_empty());
        assert!(!state.board.is_occupied(Position::new(5, 5)));
        assert_eq!(state.players[0].rack.len(), RACK_SIZE);
        assert_eq!(state.players[0].score, 0);
        // Pass never draws
        assert_eq!(state.tile_bag.len(), bag_before);
        assert_eq!(session.last_move().unwrap().kind, MoveKind::Pass);
        assert_conservation(&session);
        assert_single_active(&session);
    }

    #[test]
    fn shuffle_only_reorders_the_active_rack() {
        let mut session = session();
        let before: HashSet<String> = session
            .active_player()
            .rack
            .tiles()
            .iter()
            .map(|tile| tile.id().to_owned())
            .collect();

        session
            .shuffle_rack_with_rng(&mut StdRng::seed_from_u64(7))
            .unwrap();

        let after: HashSet<String> = session
            .active_player()
            .rack
            .tiles()
            .iter()
            .map(|tile| tile.id().to_owned())
            .collect();
        assert_eq!(before, after);
        assert_eq!(session.state().current_player, 0);
        assert_eq!(session.last_move().unwrap().kind, MoveKind::Shuffle);
        assert_conservation(&session);
    }

    #[test]
    fn refill_is_best_effort_when_bag_runs_low() {
        let mut session = session();

        // Drain the bag down to two tiles
        let remaining = session.state.tile_bag.len();
        session.state.tile_bag.draw(remaining - 2);

        put(&mut session, 0, Position::new(7, 7));
        put(&mut session, 0, Position::new(8, 7));
        put(&mut session, 0, Position::new(9, 7));
        put(&mut session, 0, Position::new(10, 7));
        session.play_word().unwrap();

        let player = &session.state().players[0];
        // Held three after playing four; drew the last two
        assert_eq!(player.rack.len(), 5);
        assert!(session.state().tile_bag.is_empty());
        assert!(!session.state().is_game_over);
    }

    #[test]
    fn game_ends_when_bag_and_rack_are_empty() {
        let mut session = session();

        // Empty the bag entirely, then play out the whole rack
        let remaining = session.state.tile_bag.len();
        session.state.tile_bag.draw(remaining);
        session.state.players[0].score = 30;

        for offset in 0..RACK_SIZE {
            put(&mut session, 0, Position::new(offset as u8 + 2, 7));
        }
        session.play_word().unwrap();

        let state = session.state();
        assert!(state.is_game_over);
        assert_eq!(state.winner, Some(0));

        // Every further action is refused
        assert_eq!(session.pass_turn(), Err(ActionRejection::GameOver));
        assert_eq!(session.play_word(), Err(ActionRejection::GameOver));
        assert_eq!(session.shuffle_rack(), Err(ActionRejection::GameOver));
    }

    #[test]
    fn conservation_holds_across_many_turns() {
        let mut session = session();
        let mut rng = StdRng::seed_from_u64(1234);

        for turn in 0..20 {
            match turn % 4 {
                0 => {
                    put(&mut session, 0, Position::new(turn as u8 % 15, 2 * (turn as u8 / 4)));
                    session.play_word().unwrap();
                }
                1 => session.shuffle_rack_with_rng(&mut rng).unwrap(),
                2 => {
                    put(&mut session, 0, Position::new(turn as u8 % 15, 2 * (turn as u8 / 4) + 1));
                    session.recall_tiles();
                    session.pass_turn().unwrap();
                }
                _ => session.pass_turn().unwrap(),
            }
            assert_conservation(&session);
            assert_single_active(&session);
        }
    }

    #[test]
    fn resume_preserves_history() {
        let mut session = session();
        put(&mut session, 0, Position::new(7, 7));
        session.play_word().unwrap();

        let history = session.history().to_vec();
        let state = session.state().clone();
        let resumed = GameSession::resume(state, history.clone());

        assert_eq!(resumed.history(), history.as_slice());
        assert_eq!(resumed.selected(), None);
        assert_conservation(&resumed);
    }

    #[test]
    #[should_panic(expected = "no players")]
    fn start_requires_players() {
        GameSession::start(&[]);
    }
}
