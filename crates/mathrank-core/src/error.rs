//! Engine error types.
//!
//! None of these are gameplay outcomes. A wrong ranking is a normal
//! [`RoundResult`](crate::evaluate::RoundResult); these variants signal that
//! the caller drove the session out of order or that generation gave up.

use thiserror::Error;
use uuid::Uuid;

use crate::session::GameMode;

/// Errors raised by session transitions and round building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A round-level transition was requested while no game is running.
    #[error("no game in progress")]
    NotPlaying,

    /// The active round already has a result.
    #[error("round {round} has already been submitted")]
    AlreadySubmitted { round: u32 },

    /// `advance` was called before the active round was submitted.
    #[error("round {round} has not been submitted yet")]
    NotSubmitted { round: u32 },

    /// A submit referenced a round that is no longer active.
    #[error("round {submitted} is not the active round ({active})")]
    StaleRound { submitted: Uuid, active: Uuid },

    /// The submitted selection cannot belong to the active round.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The mode does not permit regenerating the active round.
    #[error("shuffle is not available in {0} mode")]
    ShuffleNotAllowed(GameMode),

    /// The builder hit its retry cap before collecting three distinct expressions.
    #[error("could not build a round of distinct expressions after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

impl EngineError {
    /// Returns `true` for errors caused by driving the session out of order,
    /// as opposed to the engine itself failing.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, EngineError::GenerationExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_round() {
        let err = EngineError::AlreadySubmitted { round: 4 };
        assert_eq!(err.to_string(), "round 4 has already been submitted");
        assert!(err.is_contract_violation());
    }

    #[test]
    fn exhaustion_is_not_a_contract_violation() {
        let err = EngineError::GenerationExhausted { attempts: 10 };
        assert!(!err.is_contract_violation());
        assert!(err.to_string().contains("10 attempts"));
    }
}
