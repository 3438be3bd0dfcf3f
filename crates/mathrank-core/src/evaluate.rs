//! Round evaluation and pass/fail classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::round::{Round, ROUND_SIZE};

/// Immutable record of one evaluated round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round_number: u32,
    pub is_correct: bool,
    /// Ids in the order the player picked them (0 to 3 entries).
    pub user_sequence: Vec<String>,
    /// All three ids, ascending by value.
    pub correct_sequence: Vec<String>,
    pub display_text_by_id: BTreeMap<String, String>,
    pub value_by_id: BTreeMap<String, f64>,
}

impl RoundResult {
    /// The player made no selection at all (typically a timeout).
    pub fn is_empty_submission(&self) -> bool {
        self.user_sequence.is_empty()
    }

    /// The player picked some but not all expressions.
    pub fn is_partial_submission(&self) -> bool {
        !self.user_sequence.is_empty() && self.user_sequence.len() < ROUND_SIZE
    }

    pub fn display_text(&self, id: &str) -> Option<&str> {
        self.display_text_by_id.get(id).map(String::as_str)
    }
}

/// Ids of the round's expressions sorted ascending by value.
///
/// Equal values (which the builder never produces) fall back to the order
/// the expressions were drawn in, not the order they are shown in.
pub fn correct_order(round: &Round) -> Vec<String> {
    let mut sorted: Vec<_> = round.expressions.iter().collect();
    sorted.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then(a.generated.cmp(&b.generated))
    });
    sorted.into_iter().map(|e| e.id.clone()).collect()
}

/// Evaluate the player's click order against the round.
///
/// Correct only if all three ids were picked in exactly ascending order;
/// shorter sequences, including an empty one, are always wrong.
pub fn evaluate(round: &Round, user_sequence: &[String]) -> RoundResult {
    let correct_sequence = correct_order(round);
    let is_correct = user_sequence.len() == ROUND_SIZE && user_sequence == correct_sequence.as_slice();

    RoundResult {
        round_number: round.number,
        is_correct,
        user_sequence: user_sequence.to_vec(),
        correct_sequence,
        display_text_by_id: round
            .expressions
            .iter()
            .map(|e| (e.id.clone(), e.display_text.clone()))
            .collect(),
        value_by_id: round
            .expressions
            .iter()
            .map(|e| (e.id.clone(), e.value))
            .collect(),
    }
}

/// Minimum score needed to pass a session of `total_rounds`.
///
/// This is a fixed table, not a percentage.
pub fn pass_threshold(total_rounds: u32) -> Option<u32> {
    match total_rounds {
        30 => Some(25),
        15 => Some(12),
        20 => Some(15),
        _ => None,
    }
}

/// `score >= threshold`; totals outside the table never pass.
pub fn passed(total_rounds: u32, score: u32) -> bool {
    pass_threshold(total_rounds).is_some_and(|threshold| score >= threshold)
}
