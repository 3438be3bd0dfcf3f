//! The `mathrank play` command.
//!
//! This is the presentation layer: it owns the session value, the player's
//! live selection and the countdown. A one-second tokio interval drives the
//! [`Countdown`]; when it expires, whatever is selected is submitted against
//! the round the countdown was armed for.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use mathrank_core::config::load_config_from;
use mathrank_core::countdown::{Countdown, Tick};
use mathrank_core::expression::Difficulty;
use mathrank_core::report::{render_sequence, SessionReport};
use mathrank_core::round::{Round, ROUND_SIZE};
use mathrank_core::session::{GameMode, Session};

use super::{make_rng, print_report_table};

/// The player's picks for the active round, in click order.
#[derive(Debug, Default)]
struct Selection {
    ids: Vec<String>,
}

impl Selection {
    /// Pick `id`, or un-pick it if it is already selected. Ignored when full.
    fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
        } else if self.ids.len() < ROUND_SIZE {
            self.ids.push(id.to_string());
        }
    }

    fn is_full(&self) -> bool {
        self.ids.len() == ROUND_SIZE
    }

    fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// One line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// 1-based positions, in the order typed.
    Pick(Vec<usize>),
    Submit,
    Shuffle,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => return Command::Submit,
        "s" | "shuffle" => return Command::Shuffle,
        "q" | "quit" | "menu" => return Command::Quit,
        _ => {}
    }

    let positions: Option<Vec<usize>> = trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok().filter(|p| (1..=ROUND_SIZE).contains(p)))
        .collect();
    match positions {
        Some(p) if !p.is_empty() => Command::Pick(p),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Forward stdin lines from a detached thread, so a pending read never
/// holds up runtime shutdown. The channel closes at EOF or after the first
/// read error.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// What ended the input loop for a round.
enum RoundEvent {
    Submitted,
    TimedOut { round_id: uuid::Uuid },
    Shuffle,
    Quit,
}

pub async fn execute(
    mode: Option<GameMode>,
    difficulty: Option<Difficulty>,
    seed: Option<u64>,
    round_seconds: Option<u32>,
    no_save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(secs) = round_seconds {
        anyhow::ensure!(secs >= 1, "round-seconds must be at least 1");
        config.round_seconds = secs;
    }
    let mode = mode.unwrap_or(config.default_mode);
    let difficulty = difficulty.unwrap_or(config.default_difficulty);
    let builder = config.round_builder();
    let mut rng = make_rng(seed.or(config.seed));
    let mut lines = spawn_stdin_reader();

    println!(
        "mathrank: {} rounds, {difficulty}, {}s per round",
        mode.total_rounds(),
        config.round_seconds
    );
    println!("Type positions (e.g. `2 3 1`) lowest to highest. Repeat a position to un-pick it.");
    println!("Enter on an empty line submits early. `q` returns to the menu.");
    if mode.allows_shuffle() {
        println!("`s` swaps in three new expressions.");
    }

    let mut session = Session::start(mode, difficulty, &builder, &mut rng)?;

    while session.is_playing() {
        let round = session
            .active_round
            .clone()
            .context("playing session has no active round")?;
        print_round(&session, &round);

        let mut selection = Selection::default();
        let mut countdown = Countdown::new(round.id, config.round_seconds);
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // the first tick completes immediately
        ticker.tick().await;

        let event = loop {
            tokio::select! {
                _ = ticker.tick() => match countdown.tick() {
                    Tick::Running { remaining } if remaining <= 5 => println!("  {remaining}s left"),
                    Tick::Running { .. } | Tick::Idle => {}
                    Tick::Expired { round_id } => break RoundEvent::TimedOut { round_id },
                },
                line = lines.recv() => {
                    let Some(line) = line else {
                        break RoundEvent::Quit;
                    };
                    let line = line.context("failed to read input")?;
                    match parse_command(&line) {
                        Command::Pick(positions) => {
                            for p in positions {
                                selection.toggle(&round.expressions[p - 1].id);
                            }
                            print_selection(&round, &selection);
                            if selection.is_full() {
                                break RoundEvent::Submitted;
                            }
                        }
                        Command::Submit => break RoundEvent::Submitted,
                        Command::Shuffle if session.mode.allows_shuffle() => break RoundEvent::Shuffle,
                        Command::Shuffle => println!("  Shuffle is not available in {} mode.", session.mode),
                        Command::Quit => break RoundEvent::Quit,
                        Command::Unknown(input) => println!("  Didn't understand '{input}'."),
                    }
                }
            }
        };
        countdown.cancel();

        match event {
            RoundEvent::Submitted => {
                session = session.submit(round.id, selection.ids())?;
                print_verdict(&session);
                session = session.advance(&builder, &mut rng)?;
            }
            RoundEvent::TimedOut { round_id } => {
                println!("  Time's up!");
                session = session.submit(round_id, selection.ids())?;
                print_verdict(&session);
                tokio::time::sleep(Duration::from_millis(config.advance_delay_ms)).await;
                session = session.advance(&builder, &mut rng)?;
            }
            RoundEvent::Shuffle => {
                session = session.shuffle(&builder, &mut rng)?;
            }
            RoundEvent::Quit => {
                let menu = session.reset();
                println!("Back to the menu ({}, {}).", menu.mode, menu.difficulty);
                return Ok(());
            }
        }
    }

    let report = SessionReport::from_session(&session);
    println!();
    println!("{}", report.headline());
    print_report_table(&report);

    if !no_save {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = config.output_dir.join(format!("session-{timestamp}.json"));
        report.save_json(&path)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_round(session: &Session, round: &Round) {
    println!();
    println!(
        "ROUND {} / {}   score {}",
        session.current_round, session.total_rounds, session.score
    );
    for (i, expr) in round.expressions.iter().enumerate() {
        println!("  [{}] {}", i + 1, expr.display_text);
    }
}

fn print_selection(round: &Round, selection: &Selection) {
    let picked: Vec<&str> = selection
        .ids()
        .iter()
        .filter_map(|id| round.expression(id))
        .map(|e| e.display_text.as_str())
        .collect();
    println!("  picked: {}", picked.join(" < "));
}

fn print_verdict(session: &Session) {
    let Some(result) = session.history.last() else {
        return;
    };
    if result.is_correct {
        println!("  Correct!");
    } else {
        println!(
            "  Wrong. Correct order: {}",
            render_sequence(result, &result.correct_sequence)
        );
    }
}
