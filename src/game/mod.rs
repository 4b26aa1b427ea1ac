//! Game Logic Module
//!
//! The room state machine and its content types. Synchronous and
//! IO-free; every timer and network concern lives in `network/`.
//!
//! ## Module Structure
//!
//! - `question`: immutable quiz content, client-safe projection
//! - `state`: phases, players, answers, scoring, leaderboards

pub mod question;
pub mod state;

// Re-export key types
pub use question::{Difficulty, PublicQuestion, Question};
pub use state::{
    Advance, AnswerOutcome, GameState, Phase, Player, PlayerAnswer, PlayerId, QuestionResults,
    QuestionStart,
};
