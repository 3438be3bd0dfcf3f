//! The `mathrank generate` command.

use std::path::PathBuf;

use anyhow::Result;

use mathrank_core::config::load_config_from;
use mathrank_core::evaluate::correct_order;
use mathrank_core::expression::Difficulty;
use mathrank_core::round::Round;

use super::{format_value, make_rng};

pub fn execute(
    difficulty: Option<Difficulty>,
    count: u32,
    seed: Option<u64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(count >= 1, "count must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let difficulty = difficulty.unwrap_or(config.default_difficulty);
    let builder = config.round_builder();
    let mut rng = make_rng(seed.or(config.seed));

    let rounds = (1..=count)
        .map(|number| builder.build(number, difficulty, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&rounds)?),
        "text" => print_rounds(&rounds, difficulty),
        other => anyhow::bail!("unknown format: {other}"),
    }

    Ok(())
}

fn print_rounds(rounds: &[Round], difficulty: Difficulty) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Round", "Expression", "Value", "Rank"]);

    for round in rounds {
        let order = correct_order(round);
        for expr in &round.expressions {
            let rank = order
                .iter()
                .position(|id| *id == expr.id)
                .map(|i| (i + 1).to_string())
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(round.number),
                Cell::new(&expr.display_text),
                Cell::new(format_value(expr.value)),
                Cell::new(rank),
            ]);
        }
    }

    println!("{} rounds at {difficulty} difficulty", rounds.len());
    println!("{table}");
}
