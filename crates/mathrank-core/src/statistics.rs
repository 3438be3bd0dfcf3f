//! Aggregate statistics over a session's round history.

use serde::{Deserialize, Serialize};

use crate::evaluate::RoundResult;

/// Summary counts for a run of rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds_played: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Rounds submitted with no selection at all.
    pub timeouts: u32,
    /// Rounds submitted with one or two picks.
    pub partial: u32,
    /// Fraction of played rounds answered correctly (0.0 when nothing was played).
    pub accuracy: f64,
    pub longest_streak: u32,
}

/// Compute [`SessionStats`] from a history of results.
pub fn compute_session_stats(history: &[RoundResult]) -> SessionStats {
    let mut stats = SessionStats::default();
    let mut streak = 0u32;

    for result in history {
        stats.rounds_played += 1;
        if result.is_correct {
            stats.correct += 1;
            streak += 1;
            stats.longest_streak = stats.longest_streak.max(streak);
        } else {
            stats.incorrect += 1;
            streak = 0;
        }
        if result.is_empty_submission() {
            stats.timeouts += 1;
        } else if result.is_partial_submission() {
            stats.partial += 1;
        }
    }

    if stats.rounds_played > 0 {
        stats.accuracy = stats.correct as f64 / stats.rounds_played as f64;
    }
    stats
}
