//! Question Records
//!
//! Immutable quiz content. Loaded once at room creation and never
//! mutated afterwards. The correct answer index is server-side only
//! while a question is active; clients receive [`PublicQuestion`].

use serde::{Deserialize, Serialize};

/// Question difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Warm-up questions.
    Easy,
    /// Standard questions.
    Medium,
    /// High-value questions.
    Hard,
}

/// A single quiz question.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable content identifier.
    pub id: String,
    /// Prompt text shown to players.
    pub question: String,
    /// Answer options, addressed by index.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_answer: u32,
    /// Category label.
    pub category: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Points awarded for a correct answer.
    pub points: u32,
}

impl Question {
    /// Client-facing projection with the correct answer stripped.
    pub fn public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            points: self.points,
        }
    }

    /// Whether `option` is the correct answer index.
    #[inline]
    pub fn is_correct(&self, option: u32) -> bool {
        option == self.correct_answer
    }
}

/// Question as broadcast while it is active. No `correctAnswer` field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    /// Stable content identifier.
    pub id: String,
    /// Prompt text shown to players.
    pub question: String,
    /// Answer options, addressed by index.
    pub options: Vec<String>,
    /// Category label.
    pub category: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Points awarded for a correct answer.
    pub points: u32,
}
