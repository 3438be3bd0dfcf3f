pub mod generate;
pub mod init;
pub mod play;
pub mod simulate;
pub mod summary;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mathrank_core::report::SessionReport;

/// Seeded RNG when a seed is given, otherwise one seeded from the OS.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            tracing::debug!(seed, "using fixed seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

/// Render a value compactly: integers plain, others to at most 4 places.
pub(crate) fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    let s = format!("{value:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub(crate) fn print_report_table(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Mode",
        "Difficulty",
        "Score",
        "Threshold",
        "Result",
        "Accuracy",
        "Streak",
        "Timeouts",
    ]);
    table.add_row(vec![
        Cell::new(report.mode),
        Cell::new(report.difficulty),
        Cell::new(format!("{}/{}", report.outcome.score, report.outcome.total_rounds)),
        Cell::new(
            report
                .outcome
                .threshold
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        Cell::new(if report.outcome.passed { "PASS" } else { "FAIL" }),
        Cell::new(format!("{:.1}%", report.stats.accuracy * 100.0)),
        Cell::new(report.stats.longest_streak),
        Cell::new(report.stats.timeouts),
    ]);

    println!("{table}");
}
