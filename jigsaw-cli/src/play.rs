//! Line-driven game loop over stdin.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use jigsaw_core::{
    Artwork, Feedback, MISMATCH_CLEAR_DELAY, Session, Transition, WIN_REVEAL_DELAY,
};
use jigsaw_svg::{BoardMarks, build_board_svg};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::CliError;
use crate::trivia::FactClient;

const BOARD_WIDTH: u32 = 600;
const BOARD_HEIGHT: u32 = 800;

pub const HELP: &str = "\
commands:
  tray            list the pieces still in the tray
  select <id>     pick a tray piece, drop the selection, or take a placed piece back
  place <slot>    put the selected piece into a board slot
  status          show progress
  board <file>    write the board as SVG
  fact            show the curator's note
  help            this text
  quit            leave the gallery";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Tray,
    Select(usize),
    Place(usize),
    Status,
    Board(PathBuf),
    Fact,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let cmd = words.next()?.to_ascii_lowercase();
    let arg = words.next();
    if words.next().is_some() {
        return None;
    }
    match (cmd.as_str(), arg) {
        ("tray" | "t", None) => Some(Command::Tray),
        ("select" | "s", Some(n)) => n.parse().ok().map(Command::Select),
        ("place" | "p", Some(n)) => n.parse().ok().map(Command::Place),
        ("status", None) => Some(Command::Status),
        ("board", Some(path)) => Some(Command::Board(PathBuf::from(path))),
        ("fact", None) => Some(Command::Fact),
        ("help" | "?", None) => Some(Command::Help),
        ("quit" | "exit" | "q", None) => Some(Command::Quit),
        _ => None,
    }
}

/// Side effects a command asks the loop to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Print(String),
    ClearMismatchAfter(u64),
    RevealWinAfter,
    WriteFile(PathBuf, String),
    Quit,
}

fn cue(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Pick => "*tick*",
        Feedback::Success => "*click*",
        Feedback::Error => "*buzz*",
        Feedback::Win => "*fanfare*",
    }
}

pub struct Game {
    session: Session,
    artwork: &'static Artwork,
    fact: Option<String>,
}

impl Game {
    pub fn new(session: Session, artwork: &'static Artwork) -> Self {
        Self {
            session,
            artwork,
            fact: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_fact(&mut self, fact: String) {
        self.fact = Some(fact);
    }

    pub fn clear_mismatch(&mut self, token: u64) {
        if self.session.clear_mismatch(token) {
            debug!(token, "mismatch cleared");
        }
    }

    pub fn win_text(&self) -> String {
        format!(
            "Restored! \"{}\" by {} ({}) is whole again in {} moves.",
            self.artwork.title,
            self.artwork.artist,
            self.artwork.year,
            self.session.moves()
        )
    }

    fn tray_text(&self) -> String {
        let lines: Vec<String> = self
            .session
            .tray()
            .map(|p| {
                format!(
                    "  #{:<3} {:.2} x {:.2}  tilt {:+.0}°",
                    p.id,
                    p.bounds.w,
                    p.bounds.h,
                    self.session.tray_tilt(p.id).unwrap_or(0.0)
                )
            })
            .collect();
        if lines.is_empty() {
            "tray is empty".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn status_text(&self) -> String {
        let grid = self.session.grid();
        let mut s = format!(
            "{} ({}x{}): {} restored, {} moves",
            self.artwork.title,
            grid.rows(),
            grid.cols(),
            self.session.progress(),
            self.session.moves()
        );
        if let Some(id) = self.session.selected() {
            s.push_str(&format!(", holding #{id}"));
        }
        if let Some(m) = self.session.mismatch() {
            s.push_str(&format!(", slot {} flashing", m.slot));
        }
        s
    }

    fn transition_text(&self, transition: &Transition) -> String {
        let cues: Vec<&str> = transition.feedback().iter().map(|f| cue(*f)).collect();
        let what = match *transition {
            Transition::Ignored => "nothing happens".to_string(),
            Transition::Selected { id } => format!("holding #{id}"),
            Transition::Deselected { id } => format!("put #{id} down"),
            Transition::Retrieved { id, slot } => {
                format!("took #{id} back from slot {slot}")
            }
            Transition::Mismatch { id, mismatch } => {
                format!("#{id} does not fit slot {}", mismatch.slot)
            }
            Transition::Placed { id, slot } | Transition::Won { id, slot } => format!(
                "#{id} fits slot {slot} ({})",
                self.session.progress()
            ),
        };
        if cues.is_empty() {
            what
        } else {
            format!("{} {}", cues.join(" "), what)
        }
    }

    pub fn handle(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::Tray => vec![Effect::Print(self.tray_text())],
            Command::Status => vec![Effect::Print(self.status_text())],
            Command::Help => vec![Effect::Print(HELP.to_string())],
            Command::Quit => vec![Effect::Quit],
            Command::Fact => {
                let text = match &self.fact {
                    Some(fact) => format!("Curator's note: {fact}"),
                    None => "The curator is still looking that up...".to_string(),
                };
                vec![Effect::Print(text)]
            }
            Command::Board(path) => {
                let svg = build_board_svg(
                    self.session.pieces(),
                    BOARD_WIDTH,
                    BOARD_HEIGHT,
                    &BoardMarks::from_session(&self.session),
                    Some(self.artwork.title),
                );
                vec![Effect::WriteFile(path, svg)]
            }
            Command::Select(id) => {
                let transition = self.session.select_piece(id);
                vec![Effect::Print(self.transition_text(&transition))]
            }
            Command::Place(slot) => {
                let transition = self.session.attempt_place(slot);
                let mut out = vec![Effect::Print(self.transition_text(&transition))];
                match transition {
                    Transition::Mismatch { mismatch, .. } => {
                        out.push(Effect::ClearMismatchAfter(mismatch.token));
                    }
                    Transition::Won { .. } => out.push(Effect::RevealWinAfter),
                    _ => {}
                }
                out
            }
        }
    }
}

enum Event {
    Line(String),
    Eof,
    ClearMismatch(u64),
    RevealWin,
    Fact(String),
}

/// Feed stdin lines into the loop from a plain thread. A blocking read there
/// does not hold up runtime shutdown once the game ends.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<Event>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::Eof);
    });
}

/// Run `game` against stdin until the player quits, input ends, or the
/// board is restored.
pub async fn run(game: Game, facts: FactClient) -> Result<(), CliError> {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    spawn_stdin_reader(tx.clone());
    event_loop(game, facts, tx, rx, &mut std::io::stdout()).await
}

async fn event_loop<W: Write>(
    mut game: Game,
    facts: FactClient,
    tx: mpsc::UnboundedSender<Event>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    out: &mut W,
) -> Result<(), CliError> {
    let title = game.artwork.title;
    let fact_tx = tx.clone();
    tokio::spawn(async move {
        let fact = facts.fetch_fact(title).await;
        let _ = fact_tx.send(Event::Fact(fact));
    });

    writeln!(
        out,
        "{} by {}: {} pieces in the tray. Type `help` for commands.",
        game.artwork.title,
        game.artwork.artist,
        game.session().pieces().len()
    )?;

    while let Some(event) = rx.recv().await {
        match event {
            Event::Eof => break,
            Event::Fact(fact) => game.set_fact(fact),
            Event::ClearMismatch(token) => game.clear_mismatch(token),
            Event::RevealWin => {
                writeln!(out, "{}", game.win_text())?;
                if let Some(fact) = &game.fact {
                    writeln!(out, "Curator's note: {fact}")?;
                }
                break;
            }
            Event::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let Some(command) = parse_command(&line) else {
                    writeln!(out, "unrecognised command; type `help`")?;
                    continue;
                };
                for effect in game.handle(command) {
                    match effect {
                        Effect::Print(text) => writeln!(out, "{text}")?,
                        Effect::Quit => return Ok(()),
                        Effect::WriteFile(path, contents) => match std::fs::write(&path, contents) {
                            Ok(()) => writeln!(out, "board written to {}", path.display())?,
                            Err(err) => {
                                warn!(path = %path.display(), %err, "board write failed");
                                writeln!(out, "could not write {}: {err}", path.display())?;
                            }
                        },
                        Effect::ClearMismatchAfter(token) => {
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(MISMATCH_CLEAR_DELAY).await;
                                let _ = tx.send(Event::ClearMismatch(token));
                            });
                        }
                        Effect::RevealWinAfter => {
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(WIN_REVEAL_DELAY).await;
                                let _ = tx.send(Event::RevealWin);
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jigsaw_core::{Grid, Tiling, default_artwork};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn game() -> Game {
        let tiling = Tiling::generate(Grid::new(2, 2).unwrap(), &mut StdRng::seed_from_u64(5));
        let session = Session::with_tray_order(tiling, vec![3, 1, 0, 2]).unwrap();
        Game::new(session, default_artwork())
    }

    fn printed(effects: &[Effect]) -> String {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Print(s) => Some(s.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(parse_command("select 3"), Some(Command::Select(3)));
        assert_eq!(parse_command("  P 7 "), Some(Command::Place(7)));
        assert_eq!(parse_command("tray"), Some(Command::Tray));
        assert_eq!(
            parse_command("board out.svg"),
            Some(Command::Board(PathBuf::from("out.svg")))
        );
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("select"), None);
        assert_eq!(parse_command("select -1"), None);
        assert_eq!(parse_command("place 1 2"), None);
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn tray_lists_pieces_in_session_order() {
        let mut g = game();
        let text = printed(&g.handle(Command::Tray));
        let ids: Vec<&str> = text.lines().map(|l| l.split_whitespace().next().unwrap()).collect();
        assert_eq!(ids, ["#3", "#1", "#0", "#2"]);
    }

    #[test]
    fn mismatch_schedules_a_scoped_clear() {
        let mut g = game();
        g.handle(Command::Select(2));
        let effects = g.handle(Command::Place(1));
        let token = g.session().mismatch().unwrap().token;
        assert!(effects.contains(&Effect::ClearMismatchAfter(token)));
        assert!(printed(&effects).contains("*buzz*"));

        g.handle(Command::Place(0));
        let newer = g.session().mismatch().unwrap().token;
        g.clear_mismatch(token);
        assert_eq!(g.session().mismatch().map(|m| m.token), Some(newer));
        g.clear_mismatch(newer);
        assert!(g.session().mismatch().is_none());
    }

    #[test]
    fn last_placement_schedules_the_reveal() {
        let mut g = game();
        for id in 0..3 {
            g.handle(Command::Select(id));
            let effects = g.handle(Command::Place(id));
            assert!(!effects.contains(&Effect::RevealWinAfter));
        }
        g.handle(Command::Select(3));
        let effects = g.handle(Command::Place(3));
        assert!(effects.contains(&Effect::RevealWinAfter));
        assert!(printed(&effects).contains("*fanfare*"));
        assert!(g.win_text().contains("Mona Lisa"));
        assert!(g.win_text().contains("4 moves"));
    }

    #[test]
    fn fact_waits_for_lookup() {
        let mut g = game();
        assert!(printed(&g.handle(Command::Fact)).contains("still looking"));
        g.set_fact("Painted on poplar.".into());
        assert_eq!(
            printed(&g.handle(Command::Fact)),
            "Curator's note: Painted on poplar."
        );
    }

    #[test]
    fn board_command_writes_svg() {
        let mut g = game();
        let effects = g.handle(Command::Board(PathBuf::from("b.svg")));
        match &effects[..] {
            [Effect::WriteFile(path, svg)] => {
                assert_eq!(path, &PathBuf::from("b.svg"));
                assert!(svg.contains("<title>Mona Lisa</title>"));
            }
            other => panic!("unexpected effects {other:?}"),
        }
    }

    fn single_piece_game() -> Game {
        let tiling = Tiling::generate(Grid::new(1, 1).unwrap(), &mut StdRng::seed_from_u64(1));
        let session = Session::with_tray_order(tiling, vec![0]).unwrap();
        Game::new(session, default_artwork())
    }

    async fn drive(game: Game, lines: &[&str]) -> (mpsc::UnboundedSender<Event>, String) {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send(Event::Line(line.to_string())).unwrap();
        }
        let mut out = Vec::new();
        let finished = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            event_loop(game, FactClient::new(None), tx.clone(), rx, &mut out),
        )
        .await;
        assert!(matches!(finished, Ok(Ok(()))), "loop did not finish cleanly");
        (tx, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn failed_board_write_keeps_the_session_going() {
        let path = std::env::temp_dir()
            .join("jigsaw-no-such-dir")
            .join("nested")
            .join("b.svg");
        let board = format!("board {}", path.display());
        let (_tx, out) = drive(game(), &["select 0", "place 0", &board, "status", "quit"]).await;
        assert!(out.contains("could not write"));
        assert!(out.contains("1 / 4 restored"));
    }

    #[tokio::test]
    async fn win_ends_the_loop_while_input_stays_open() {
        // The sender stays alive for the whole call, as an unclosed stdin would.
        let (_tx, out) = drive(single_piece_game(), &["select 0", "place 0"]).await;
        assert!(out.contains("*fanfare*"));
        assert!(out.contains("Restored!"));
    }
}
