use std::io;
use std::sync::Arc;

use termion::color;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::game::board::{Board, Bonus, Position};
use crate::game::session::GameSession;
use crate::game::tile::Tile;
use crate::store::{DebouncedSaver, GameRecord, GameStore};

/// A player action typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select (or deselect) the numbered rack tile.
    Pick(usize),
    /// Place the selected tile on a cell.
    Put(Position),
    Play,
    Shuffle,
    Pass,
    Recall,
    Quit,
}

/// Decodes a text command into a [`Command`].
pub fn parse_action_command(command: &str) -> Result<Command, CommandParseErr> {
    use CommandParseErr::*;

    if command.is_empty() {
        return Err(EmptyInput);
    }

    let mut tokens = command.split(' ');

    match tokens.next() {
        Some("pick") => {
            let number: usize = tokens
                .next()
                .and_then(|token| token.parse().ok())
                .ok_or(Expected("tile number"))?;
            if number == 0 {
                return Err(Expected("tile number starting at 1"));
            }
            Ok(Command::Pick(number))
        }
        Some("put") => {
            let position_str = tokens.next().ok_or(Expected("position"))?;
            let position = position_str.parse().or(Err(Expected("position like 8-h")))?;
            Ok(Command::Put(position))
        }
        Some("play") => Ok(Command::Play),
        Some("shuffle") => Ok(Command::Shuffle),
        Some("pass") => Ok(Command::Pass),
        Some("recall") => Ok(Command::Recall),
        Some("quit") => Ok(Command::Quit),
        Some(_) => Err(Expected(
            "\"pick\", \"put\", \"play\", \"shuffle\", \"pass\", \"recall\" or \"quit\"",
        )),
        None => Err(EmptyInput),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseErr {
    #[error("empty command")]
    EmptyInput,
    #[error("expected {0}")]
    Expected(&'static str),
}

/// Runs a game for players sharing one terminal. Commands prefixed with
/// `/` act for whoever's turn it is; commands prefixed with `?` display
/// state. Every accepted action queues a debounced snapshot save, and
/// committed moves are appended to the game's move log right away.
pub struct LocalClient {
    session: GameSession,
    game_id: Box<str>,
    game_name: Box<str>,
    store: Arc<dyn GameStore>,
    saver: DebouncedSaver,
}

impl LocalClient {
    pub fn new(
        session: GameSession,
        game_id: impl Into<Box<str>>,
        game_name: impl Into<Box<str>>,
        store: Arc<dyn GameStore>,
        saver: DebouncedSaver,
    ) -> Self {
        Self {
            session,
            game_id: game_id.into(),
            game_name: game_name.into(),
            store,
            saver,
        }
    }

    /// Runs the input loop until the players quit. Store failures are
    /// reported and played through; only losing stdin ends the loop early.
    pub async fn run(mut self) -> io::Result<()> {
        println!("Playing \"{}\". Type ?help for the commands.", self.game_name);
        self.print_board();
        self.print_turn();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end();

            match line.chars().next() {
                Some('/') => {
                    let command = match parse_action_command(&line[1..]) {
                        Ok(command) => command,
                        Err(err) => {
                            if !matches!(err, CommandParseErr::EmptyInput) {
                                println!("Invalid command: {err}");
                            }
                            continue;
                        }
                    };

                    if self.apply(command).await {
                        break;
                    }
                }
                Some('?') => self.display(&line[1..]),
                Some(_) => println!("Invalid prefix character (use '/' or '?')."),
                None => {}
            }
        }

        // Flush whatever snapshot is still pending
        self.saver.shutdown().await;
        Ok(())
    }

    /// Applies one action command. Returns `true` when the players quit.
    async fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Pick(number) => {
                let tile = self
                    .session
                    .active_player()
                    .rack
                    .get(number - 1)
                    .map(|tile| (tile.id().to_owned(), tile.to_string()));
                match tile {
                    Some((id, letter)) => match self.session.select_tile(&id) {
                        Ok(()) => {
                            if self.session.selected().is_some() {
                                println!("Selected {letter}. Use /put <position> to place it.");
                            } else {
                                println!("Deselected {letter}.");
                            }
                        }
                        Err(rejection) => println!("{rejection}"),
                    },
                    None => println!("No tile numbered {number} in the rack."),
                }
            }
            Command::Put(position) => match self.session.place_tile(position) {
                Ok(()) => {
                    let cell = &self.session.state().board[position];
                    match cell.bonus() {
                        Bonus::None => println!("Placed on {position}."),
                        bonus => println!("Placed on {position} ({}).", bonus.description()),
                    }
                    self.queue_save();
                    self.print_board();
                    self.print_rack();
                }
                Err(rejection) => println!("{rejection}"),
            },
            Command::Play => match self.session.play_word() {
                Ok(outcome) => {
                    println!("Played \"{}\" for {} points.", outcome.word, outcome.score);
                    self.record_last_move().await;
                    self.queue_save();
                    self.print_board();
                    if self.session.state().is_game_over {
                        self.print_game_over();
                    } else {
                        self.print_turn();
                    }
                }
                Err(rejection) => println!("{rejection}"),
            },
            Command::Shuffle => match self.session.shuffle_rack() {
                Ok(()) => {
                    self.record_last_move().await;
                    self.queue_save();
                    self.print_rack();
                }
                Err(rejection) => println!("{rejection}"),
            },
            Command::Pass => match self.session.pass_turn() {
                Ok(()) => {
                    self.record_last_move().await;
                    self.queue_save();
                    self.print_turn();
                }
                Err(rejection) => println!("{rejection}"),
            },
            Command::Recall => {
                self.session.recall_tiles();
                println!("Returned this turn's tiles to the rack.");
                self.queue_save();
                self.print_rack();
            }
            Command::Quit => return true,
        }

        false
    }

    fn display(&self, what: &str) {
        match what {
            "board" => self.print_board(),
            "rack" => self.print_rack(),
            "score" => self.print_scores(),
            "bag" => println!("{} tiles left in the bag.", self.session.state().tile_bag.len()),
            "history" => {
                if self.session.history().is_empty() {
                    println!("No moves yet.");
                }
                for record in self.session.history() {
                    println!("  {record}");
                }
            }
            "help" | "" => print_help(),
            _ => println!("Unknown display command (try ?help)."),
        }
    }

    fn queue_save(&self) {
        self.saver
            .queue(GameRecord::snapshot(&self.game_name, &self.session));
    }

    /// Appends the newest history entry to the store's move log. Failures
    /// are reported but never interrupt play.
    async fn record_last_move(&self) {
        if let Some(record) = self.session.last_move() {
            if let Err(why) = self.store.append_move(&self.game_id, record).await {
                eprintln!("warning: could not record the move: {why}");
            }
        }
    }

    fn print_board(&self) {
        render_board(&self.session.state().board);
    }

    fn print_rack(&self) {
        let player = self.session.active_player();
        print!("Rack of {}:", player.name);
        for (index, tile) in player.rack.tiles().iter().enumerate() {
            let marker = if self.session.selected() == Some(tile.id()) { "*" } else { "" };
            print!("  {}:{}{}", index + 1, render_tile(tile), marker);
        }
        println!();
    }

    fn print_scores(&self) {
        for player in &self.session.state().players {
            let marker = if player.is_active { " <- playing" } else { "" };
            println!("  {} {} points{marker}", player.name, player.score);
        }
    }

    fn print_turn(&self) {
        self.print_rack();
        println!("It is {}'s turn.", self.session.active_player().name);
    }

    fn print_game_over(&self) {
        let state = self.session.state();
        println!("The bag is empty and the rack is played out. Game over!");
        self.print_scores();
        if let Some(winner) = state.winner {
            println!("{} wins!", state.players[winner].name);
        }
    }
}

fn print_help() {
    println!("Actions (for the player whose turn it is):");
    println!("  /pick <n>          select or deselect the n-th rack tile");
    println!("  /put <position>    place the selected tile, e.g. /put 8-h");
    println!("  /play              commit the placed tiles as a word");
    println!("  /shuffle           reorder the rack");
    println!("  /pass              give up the turn (recalls placed tiles)");
    println!("  /recall            take this turn's tiles back");
    println!("  /quit              save and leave");
    println!("Displays: ?board ?rack ?score ?bag ?history ?help");
}

fn render_tile(tile: &Tile) -> String {
    format!("{}({})", tile, tile.value())
}

/// Draws the board: tiles as their letters (this turn's in green), empty
/// bonus cells as colored multiplier digits, and the center star.
fn render_board(board: &Board) {
    print!("   ");
    for x in 0..Position::GRID {
        print!(" {}", (b'a' + x) as char);
    }
    println!();

    for y in 0..Position::GRID {
        print!("{:>2} ", y + 1);
        for cell in board.row(y) {
            match cell.tile() {
                Some(placed) if placed.is_new() => {
                    print!(
                        " {}{}{}",
                        color::Fg(color::LightGreen),
                        placed.tile(),
                        color::Fg(color::Reset)
                    );
                }
                Some(placed) => print!(" {}", placed.tile()),
                None => match cell.bonus() {
                    Bonus::None => print!(" ."),
                    Bonus::DoubleLetter => {
                        print!(" {}2{}", color::Fg(color::Cyan), color::Fg(color::Reset))
                    }
                    Bonus::TripleLetter => {
                        print!(" {}3{}", color::Fg(color::Cyan), color::Fg(color::Reset))
                    }
                    Bonus::DoubleWord => {
                        print!(" {}2{}", color::Fg(color::Red), color::Fg(color::Reset))
                    }
                    Bonus::TripleWord => {
                        print!(" {}3{}", color::Fg(color::Red), color::Fg(color::Reset))
                    }
                    Bonus::CenterStar => {
                        print!(" {}*{}", color::Fg(color::Yellow), color::Fg(color::Reset))
                    }
                },
            }
        }
        println!();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn command_parsing() {
        assert_eq!(parse_action_command("pick 3"), Ok(Command::Pick(3)));
        assert_eq!(
            parse_action_command("put 8-h"),
            Ok(Command::Put(Position::new(7, 7)))
        );
        assert_eq!(parse_action_command("play"), Ok(Command::Play));
        assert_eq!(parse_action_command("pass"), Ok(Command::Pass));
        assert_eq!(parse_action_command("quit"), Ok(Command::Quit));

        assert!(matches!(
            parse_action_command("pick"),
            Err(CommandParseErr::Expected(_))
        ));
        assert!(matches!(
            parse_action_command("pick 0"),
            Err(CommandParseErr::Expected(_))
        ));
        assert!(matches!(
            parse_action_command("put 99-z"),
            Err(CommandParseErr::Expected(_))
        ));
        assert!(matches!(
            parse_action_command("dance"),
            Err(CommandParseErr::Expected(_))
        ));
        assert!(matches!(
            parse_action_command(""),
            Err(CommandParseErr::EmptyInput)
        ));
    }
}
