//! The `mathrank simulate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::Rng;

use mathrank_core::config::load_config_from;
use mathrank_core::evaluate::correct_order;
use mathrank_core::expression::Difficulty;
use mathrank_core::report::SessionReport;
use mathrank_core::round::Round;
use mathrank_core::session::{GameMode, Session};

use super::{make_rng, print_report_table};

/// How the simulated player handles one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Correct,
    /// All three picked, in the wrong order.
    Wrong,
    /// Ran out of time after one pick.
    Partial,
    /// Ran out of time with nothing picked.
    Timeout,
}

fn choose_answer<R: Rng + ?Sized>(rng: &mut R, accuracy: f64) -> Answer {
    if rng.gen_bool(accuracy) {
        return Answer::Correct;
    }
    match rng.gen_range(0..3) {
        0 => Answer::Wrong,
        1 => Answer::Partial,
        _ => Answer::Timeout,
    }
}

fn answer_sequence(round: &Round, answer: Answer) -> Vec<String> {
    let mut order = correct_order(round);
    match answer {
        Answer::Correct => order,
        Answer::Wrong => {
            order.rotate_left(1);
            order
        }
        Answer::Partial => {
            order.truncate(1);
            order
        }
        Answer::Timeout => Vec::new(),
    }
}

pub fn execute(
    mode: Option<GameMode>,
    difficulty: Option<Difficulty>,
    accuracy: f64,
    seed: Option<u64>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&accuracy),
        "accuracy must be between 0.0 and 1.0"
    );
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json" | "markdown" | "md"),
        "unknown format: {format}"
    );

    let config = load_config_from(config_path.as_deref())?;
    let mode = mode.unwrap_or(config.default_mode);
    let difficulty = difficulty.unwrap_or(config.default_difficulty);
    let builder = config.round_builder();
    let mut rng = make_rng(seed.or(config.seed));

    let mut session = Session::start(mode, difficulty, &builder, &mut rng)?;
    while session.is_playing() {
        let round = session
            .active_round
            .as_ref()
            .context("playing session has no active round")?;
        let answer = choose_answer(&mut rng, accuracy);
        let sequence = answer_sequence(round, answer);
        session = session
            .submit(round.id, &sequence)?
            .advance(&builder, &mut rng)?;
    }

    let report = SessionReport::from_session(&session);

    if let Some(path) = &output {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => {
            println!("{}", report.headline());
            print_report_table(&report);
        }
        other => anyhow::bail!("unknown format: {other}"),
    }

    Ok(())
}
