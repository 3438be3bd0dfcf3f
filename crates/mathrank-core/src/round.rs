//! Round builder.
//!
//! Draws candidates from the generator until three expressions with
//! pairwise-distinct values and pairwise-distinct display texts have been
//! collected, tags each with an id, and shuffles the presentation order.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::expression::{generate_with, Candidate, Difficulty};
use crate::fraction::Fraction;

/// Number of expressions in a round.
pub const ROUND_SIZE: usize = 3;

/// Default cap on candidate draws per round.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// An expression the player can select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Selection identity, unique within the round.
    pub id: String,
    pub display_text: String,
    pub value: f64,
    /// Position in draw order before the presentation shuffle.
    #[serde(default)]
    pub generated: usize,
}

/// Three expressions to rank, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Identifies this built instance; a shuffle produces a new id.
    pub id: Uuid,
    /// 1-based round number within the session.
    pub number: u32,
    pub expressions: [Expression; ROUND_SIZE],
}

impl Round {
    pub fn expression(&self, id: &str) -> Option<&Expression> {
        self.expressions.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.expression(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.expressions.iter().map(|e| e.id.as_str())
    }
}

/// Builds rounds from the expression generator.
#[derive(Debug, Clone)]
pub struct RoundBuilder {
    max_attempts: usize,
}

impl Default for RoundBuilder {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RoundBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-round cap on candidate draws (at least one).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Build round `number` at `difficulty` using the thread-local RNG.
    pub fn build_thread(&self, number: u32, difficulty: Difficulty) -> Result<Round, EngineError> {
        let mut rng = rand::thread_rng();
        self.build(number, difficulty, &mut rng)
    }

    /// Build round `number` at `difficulty` from the given RNG.
    pub fn build<R: Rng + ?Sized>(
        &self,
        number: u32,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Round, EngineError> {
        self.build_from(number, rng, |rng| generate_with(difficulty, rng))
    }

    /// Build a round from an arbitrary candidate source.
    pub fn build_from<R, F>(
        &self,
        number: u32,
        rng: &mut R,
        mut next: F,
    ) -> Result<Round, EngineError>
    where
        R: Rng + ?Sized,
        F: FnMut(&mut R) -> Candidate,
    {
        let mut accepted: Vec<(Fraction, Candidate)> = Vec::with_capacity(ROUND_SIZE);
        let mut attempts = 0usize;

        while accepted.len() < ROUND_SIZE {
            if attempts >= self.max_attempts {
                tracing::warn!(
                    attempts,
                    accepted = accepted.len(),
                    "round generation exhausted its retry cap"
                );
                return Err(EngineError::GenerationExhausted { attempts });
            }
            attempts += 1;

            let candidate = next(rng);
            let Some(exact) = candidate.exact.filter(|_| candidate.is_usable()) else {
                tracing::debug!(text = %candidate.display_text, "rejected non-finite candidate");
                continue;
            };
            let collides = accepted.iter().any(|(value, other)| {
                *value == exact
                    || other.value == candidate.value
                    || other.display_text == candidate.display_text
            });
            if collides {
                tracing::debug!(text = %candidate.display_text, "rejected colliding candidate");
                continue;
            }
            accepted.push((exact, candidate));
        }

        let mut expressions: Vec<Expression> = accepted
            .into_iter()
            .enumerate()
            .map(|(generated, (_, candidate))| Expression {
                id: mint_id(rng),
                display_text: candidate.display_text,
                value: candidate.value,
                generated,
            })
            .collect();
        expressions.shuffle(rng);

        let expressions: [Expression; ROUND_SIZE] = expressions
            .try_into()
            .map_err(|_| EngineError::GenerationExhausted { attempts })?;

        tracing::debug!(number, attempts, "built round");
        Ok(Round {
            id: mint_uuid(rng),
            number,
            expressions,
        })
    }
}

/// Build a round with default settings and the thread-local RNG.
pub fn build_round(number: u32, difficulty: Difficulty) -> Result<Round, EngineError> {
    RoundBuilder::default().build_thread(number, difficulty)
}

fn mint_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

fn mint_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    mint_uuid(rng).simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Category, Formula, Op, Operand};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn product(a: i64, b: i64) -> Candidate {
        Candidate::from_formula(
            Category::SingleDigitProduct,
            Formula::new(Operand::Int(a)).then(Op::Mul, Operand::Int(b)),
        )
    }

    fn quotient(a: i64, b: i64) -> Candidate {
        Candidate::from_formula(
            Category::ExactQuotient,
            Formula::new(Operand::Int(a)).then(Op::Div, Operand::Int(b)),
        )
    }

    #[test]
    fn built_rounds_are_pairwise_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        let builder = RoundBuilder::default();
        for difficulty in Difficulty::ALL {
            for number in 1..=2_000 {
                let round = builder.build(number, difficulty, &mut rng).unwrap();
                let [a, b, c] = &round.expressions;
                assert!(a.value != b.value && a.value != c.value && b.value != c.value);
                assert!(
                    a.display_text != b.display_text
                        && a.display_text != c.display_text
                        && b.display_text != c.display_text
                );
                let ids: HashSet<&str> = round.ids().collect();
                assert_eq!(ids.len(), ROUND_SIZE);
                assert_eq!(round.number, number);
            }
        }
    }

    #[test]
    fn rejects_equal_values_with_different_text() {
        // 2×6, 12÷1 and 3×4 all equal 12; only the first survives
        let mut queue = vec![product(2, 6), quotient(12, 1), product(3, 4), product(2, 2), product(2, 3)]
            .into_iter();
        let mut rng = StdRng::seed_from_u64(1);
        let round = RoundBuilder::default()
            .build_from(1, &mut rng, |_| queue.next().unwrap())
            .unwrap();
        let mut texts: Vec<&str> = round.expressions.iter().map(|e| e.display_text.as_str()).collect();
        texts.sort();
        assert_eq!(texts, vec!["2×2", "2×3", "2×6"]);
    }

    #[test]
    fn rejects_duplicate_text() {
        let mut queue = vec![product(2, 6), product(2, 6), product(3, 3), product(2, 6), product(5, 5)]
            .into_iter();
        let mut rng = StdRng::seed_from_u64(2);
        let round = RoundBuilder::default()
            .build_from(1, &mut rng, |_| queue.next().unwrap())
            .unwrap();
        let mut values: Vec<f64> = round.expressions.iter().map(|e| e.value).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![9.0, 12.0, 25.0]);
    }

    #[test]
    fn rejects_non_finite_candidates() {
        let mut queue = vec![quotient(3, 0), product(2, 2), quotient(1, 0), product(2, 3), product(2, 4)]
            .into_iter();
        let mut rng = StdRng::seed_from_u64(3);
        let round = RoundBuilder::default()
            .build_from(1, &mut rng, |_| queue.next().unwrap())
            .unwrap();
        assert!(round.expressions.iter().all(|e| e.value.is_finite()));
    }

    #[test]
    fn retry_cap_fails_loudly() {
        let mut rng = StdRng::seed_from_u64(4);
        let err = RoundBuilder::default()
            .with_max_attempts(50)
            .build_from(1, &mut rng, |_| product(3, 3))
            .unwrap_err();
        assert_eq!(err, EngineError::GenerationExhausted { attempts: 50 });
    }

    #[test]
    fn same_seed_same_round() {
        let builder = RoundBuilder::default();
        let a = builder
            .build(1, Difficulty::Hard, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = builder
            .build(1, Difficulty::Hard, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn presentation_order_is_shuffled() {
        // Over many rounds every one of the 6 orderings should show up.
        let mut rng = StdRng::seed_from_u64(10);
        let builder = RoundBuilder::default();
        let mut seen = HashSet::new();
        for number in 1..=600 {
            let round = builder.build(number, Difficulty::Medium, &mut rng).unwrap();
            let mut order = [0usize, 1, 2];
            order.sort_by(|&i, &j| {
                round.expressions[i]
                    .value
                    .total_cmp(&round.expressions[j].value)
            });
            seen.insert(order);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn records_draw_order() {
        let mut queue = vec![product(2, 4), product(2, 2), product(2, 3)].into_iter();
        let mut rng = StdRng::seed_from_u64(5);
        let round = RoundBuilder::default()
            .build_from(1, &mut rng, |_| queue.next().unwrap())
            .unwrap();
        let mut by_draw: Vec<(usize, f64)> =
            round.expressions.iter().map(|e| (e.generated, e.value)).collect();
        by_draw.sort_by_key(|&(generated, _)| generated);
        assert_eq!(by_draw, vec![(0, 8.0), (1, 4.0), (2, 6.0)]);
    }

    #[test]
    fn lookup_by_id() {
        let round = build_round(1, Difficulty::Medium).unwrap();
        let id = round.expressions[1].id.clone();
        assert!(round.contains(&id));
        assert_eq!(round.expression(&id), Some(&round.expressions[1]));
        assert!(!round.contains("missing"));
    }
}
