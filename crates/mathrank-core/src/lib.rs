//! mathrank-core: expression generation, round building, and scoring.
//!
//! This crate holds the game engine: it synthesizes arithmetic expressions
//! with exactly computed values, assembles rounds of three, evaluates the
//! player's ranking, and threads all session state through explicit values.

pub mod config;
pub mod countdown;
pub mod error;
pub mod evaluate;
pub mod expression;
pub mod fraction;
pub mod report;
pub mod round;
pub mod session;
pub mod statistics;
