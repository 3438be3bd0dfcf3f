//! Session report with JSON persistence and a markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluate::RoundResult;
use crate::expression::Difficulty;
use crate::session::{GameMode, Outcome, Session};
use crate::statistics::{compute_session_stats, SessionStats};

/// A completed (or abandoned) play-through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub outcome: Outcome,
    pub stats: SessionStats,
    /// Per-round results in play order.
    pub results: Vec<RoundResult>,
}

impl SessionReport {
    pub fn from_session(session: &Session) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            mode: session.mode,
            difficulty: session.difficulty,
            outcome: session.outcome(),
            stats: compute_session_stats(&session.history),
            results: session.history.clone(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// One line: "PASS 26/30 (threshold 25)".
    pub fn headline(&self) -> String {
        let verdict = if self.outcome.passed { "PASS" } else { "FAIL" };
        match self.outcome.threshold {
            Some(t) => format!(
                "{verdict} {}/{} (threshold {t})",
                self.outcome.score, self.outcome.total_rounds
            ),
            None => format!("{verdict} {}/{}", self.outcome.score, self.outcome.total_rounds),
        }
    }

    /// Format the report as markdown with a per-round breakdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "## {} ({} / {})\n\n",
            self.headline(),
            self.mode,
            self.difficulty
        ));
        md.push_str(&format!(
            "**Accuracy:** {:.1}%, longest streak {}, {} timed out, {} partial\n\n",
            self.stats.accuracy * 100.0,
            self.stats.longest_streak,
            self.stats.timeouts,
            self.stats.partial
        ));

        if !self.results.is_empty() {
            md.push_str("| Round | Result | Your order | Correct order |\n");
            md.push_str("|-------|--------|------------|---------------|\n");
            for r in &self.results {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    r.round_number,
                    if r.is_correct { "correct" } else { "wrong" },
                    render_sequence(r, &r.user_sequence),
                    render_sequence(r, &r.correct_sequence),
                ));
            }
        }

        md
    }
}

/// Display texts joined with `<`, or a dash for an empty selection.
pub fn render_sequence(result: &RoundResult, ids: &[String]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| result.display_text(id).unwrap_or("?"))
        .collect::<Vec<_>>()
        .join(" < ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::correct_order;
    use crate::round::RoundBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn finished_session(correct_rounds: u32) -> Session {
        let mut rng = StdRng::seed_from_u64(77);
        let builder = RoundBuilder::default();
        let mut session =
            Session::start(GameMode::PracticeShort, Difficulty::Hard, &builder, &mut rng).unwrap();
        for n in 1..=15 {
            let round = session.active_round.as_ref().unwrap();
            let seq = if n <= correct_rounds {
                correct_order(round)
            } else {
                vec![]
            };
            session = session
                .submit(round.id, &seq)
                .unwrap()
                .advance(&builder, &mut rng)
                .unwrap();
        }
        session
    }

    #[test]
    fn report_from_finished_session() {
        let report = SessionReport::from_session(&finished_session(13));
        assert_eq!(report.outcome.score, 13);
        assert!(report.outcome.passed);
        assert_eq!(report.stats.timeouts, 2);
        assert_eq!(report.results.len(), 15);
        assert_eq!(report.headline(), "PASS 13/15 (threshold 12)");
    }

    #[test]
    fn json_roundtrip() {
        let report = SessionReport::from_session(&finished_session(3));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = SessionReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.mode, GameMode::PracticeShort);
        assert_eq!(loaded.results, report.results);
        assert!(!loaded.outcome.passed);
    }

    #[test]
    fn load_missing_file_has_context() {
        let err = SessionReport::load_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read report"));
    }

    #[test]
    fn markdown_lists_every_round() {
        let report = SessionReport::from_session(&finished_session(14));
        let md = report.to_markdown();
        assert!(md.contains("PASS 14/15"));
        assert!(md.contains("| Round | Result |"));
        assert_eq!(md.matches("| correct |").count(), 14);
        assert_eq!(md.matches("| wrong | - |").count(), 1);
    }
}
