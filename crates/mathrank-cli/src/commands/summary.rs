//! The `mathrank summary` command.

use std::path::PathBuf;

use anyhow::Result;

use mathrank_core::report::SessionReport;

use super::print_report_table;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = SessionReport::load_json(&report_path)?;

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
