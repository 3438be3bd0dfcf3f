//! Session state machine.
//!
//! A [`Session`] is a plain value. Every transition borrows the current
//! state and returns the next one, so the owning layer holds the only
//! mutable reference and a failed transition leaves the old state intact.
//!
//! ```text
//! NotStarted --start--> Playing(Active) --submit--> Playing(Submitted)
//!                            ^   |                       |
//!                            |   +--shuffle--+           |
//!                            +---------------+--advance--+--(last round)--> Finished
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::evaluate::{evaluate, pass_threshold, passed, RoundResult};
use crate::expression::Difficulty;
use crate::round::{Round, RoundBuilder, ROUND_SIZE};

/// Game mode; fixes the number of rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// The fixed-length 30-round test.
    #[serde(rename = "main")]
    Main,
    /// 15-round practice.
    #[serde(rename = "practice-15", alias = "practice-short")]
    PracticeShort,
    /// 20-round practice.
    #[serde(rename = "practice-20", alias = "practice-long")]
    PracticeLong,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Main, GameMode::PracticeShort, GameMode::PracticeLong];

    pub fn total_rounds(self) -> u32 {
        match self {
            GameMode::Main => 30,
            GameMode::PracticeShort => 15,
            GameMode::PracticeLong => 20,
        }
    }

    /// Regenerating the active round is a practice-only aid.
    pub fn allows_shuffle(self) -> bool {
        !matches!(self, GameMode::Main)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Main => write!(f, "main"),
            GameMode::PracticeShort => write!(f, "practice-15"),
            GameMode::PracticeLong => write!(f, "practice-20"),
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" | "main-30" => Ok(GameMode::Main),
            "practice-15" | "practice-short" | "short" => Ok(GameMode::PracticeShort),
            "practice-20" | "practice-long" | "long" => Ok(GameMode::PracticeLong),
            other => Err(format!("unknown game mode: {other}")),
        }
    }
}

/// Where the active round is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Active,
    Submitted,
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Playing(RoundPhase),
    Finished,
}

/// Final (or running) pass/fail tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub score: u32,
    pub total_rounds: u32,
    pub threshold: Option<u32>,
    pub passed: bool,
}

/// One play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub phase: Phase,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// 1-based; 0 before the game starts.
    pub current_round: u32,
    pub total_rounds: u32,
    pub score: u32,
    pub history: Vec<RoundResult>,
    pub active_round: Option<Round>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GameMode::Main, Difficulty::Medium)
    }
}

impl Session {
    /// A session that has not started, remembering the menu selection.
    pub fn new(mode: GameMode, difficulty: Difficulty) -> Self {
        Self {
            phase: Phase::NotStarted,
            mode,
            difficulty,
            current_round: 0,
            total_rounds: mode.total_rounds(),
            score: 0,
            history: Vec::new(),
            active_round: None,
        }
    }

    /// Begin a fresh game: round 1, score 0, empty history.
    pub fn start<R: Rng + ?Sized>(
        mode: GameMode,
        difficulty: Difficulty,
        builder: &RoundBuilder,
        rng: &mut R,
    ) -> Result<Session, EngineError> {
        let round = builder.build(1, difficulty, rng)?;
        tracing::info!(%mode, %difficulty, rounds = mode.total_rounds(), "game started");
        Ok(Session {
            phase: Phase::Playing(RoundPhase::Active),
            current_round: 1,
            active_round: Some(round),
            ..Session::new(mode, difficulty)
        })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, Phase::Playing(_))
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Evaluate the player's selection for the round identified by `round_id`.
    ///
    /// Does not advance; call [`Session::advance`] afterwards.
    pub fn submit(&self, round_id: Uuid, user_sequence: &[String]) -> Result<Session, EngineError> {
        let round = self.active_for(RoundPhase::Active)?;
        if round.id != round_id {
            return Err(EngineError::StaleRound {
                submitted: round_id,
                active: round.id,
            });
        }
        validate_selection(round, user_sequence)?;

        let result = evaluate(round, user_sequence);
        tracing::debug!(
            round = self.current_round,
            correct = result.is_correct,
            picks = user_sequence.len(),
            "round submitted"
        );

        let mut next = self.clone();
        if result.is_correct {
            next.score += 1;
        }
        next.history.push(result);
        next.phase = Phase::Playing(RoundPhase::Submitted);
        Ok(next)
    }

    /// Move past a submitted round: finish after the last one, otherwise
    /// build the next round.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        builder: &RoundBuilder,
        rng: &mut R,
    ) -> Result<Session, EngineError> {
        self.active_for(RoundPhase::Submitted)?;

        let mut next = self.clone();
        if self.current_round >= self.total_rounds {
            next.phase = Phase::Finished;
            next.active_round = None;
            tracing::info!(score = self.score, total = self.total_rounds, "game finished");
            return Ok(next);
        }

        let number = self.current_round + 1;
        next.active_round = Some(builder.build(number, self.difficulty, rng)?);
        next.current_round = number;
        next.phase = Phase::Playing(RoundPhase::Active);
        Ok(next)
    }

    /// Replace the active round with a fresh one, keeping round number and score.
    pub fn shuffle<R: Rng + ?Sized>(
        &self,
        builder: &RoundBuilder,
        rng: &mut R,
    ) -> Result<Session, EngineError> {
        self.active_for(RoundPhase::Active)?;
        if !self.mode.allows_shuffle() {
            return Err(EngineError::ShuffleNotAllowed(self.mode));
        }

        let mut next = self.clone();
        next.active_round = Some(builder.build(self.current_round, self.difficulty, rng)?);
        tracing::debug!(round = self.current_round, "round shuffled");
        Ok(next)
    }

    /// Back to the menu. Mode and difficulty are kept as the last selection.
    pub fn reset(&self) -> Session {
        tracing::info!("game reset");
        Session::new(self.mode, self.difficulty)
    }

    /// Score against the mode's pass threshold.
    pub fn outcome(&self) -> Outcome {
        Outcome {
            score: self.score,
            total_rounds: self.total_rounds,
            threshold: pass_threshold(self.total_rounds),
            passed: passed(self.total_rounds, self.score),
        }
    }

    fn active_for(&self, expected: RoundPhase) -> Result<&Round, EngineError> {
        let Phase::Playing(phase) = self.phase else {
            return Err(EngineError::NotPlaying);
        };
        match (phase, expected) {
            (RoundPhase::Submitted, RoundPhase::Active) => Err(EngineError::AlreadySubmitted {
                round: self.current_round,
            }),
            (RoundPhase::Active, RoundPhase::Submitted) => Err(EngineError::NotSubmitted {
                round: self.current_round,
            }),
            _ => self.active_round.as_ref().ok_or(EngineError::NotPlaying),
        }
    }
}

fn validate_selection(round: &Round, user_sequence: &[String]) -> Result<(), EngineError> {
    if user_sequence.len() > ROUND_SIZE {
        return Err(EngineError::InvalidSelection(format!(
            "{} picks for a round of {ROUND_SIZE}",
            user_sequence.len()
        )));
    }
    for (i, id) in user_sequence.iter().enumerate() {
        if !round.contains(id) {
            return Err(EngineError::InvalidSelection(format!("unknown id '{id}'")));
        }
        if user_sequence[..i].contains(id) {
            return Err(EngineError::InvalidSelection(format!("id '{id}' picked twice")));
        }
    }
    Ok(())
}
