//! Quiz Content Provider
//!
//! Loads the ordered question sequence from a JSON document of the
//! shape `{"questions": [...]}`. Any load or validation failure is
//! recovered by substituting a fixed fallback set, so starting a game
//! is always possible and content faults never reach clients.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::game::question::{Difficulty, Question};

/// Content loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Could not read the question file.
    #[error("failed to read question file: {0}")]
    Io(#[from] std::io::Error),

    /// File contents were not a valid question document.
    #[error("failed to parse question file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document parsed but held no questions.
    #[error("question file contains no questions")]
    Empty,

    /// A question fails basic consistency checks.
    #[error("invalid question {id}: {reason}")]
    Invalid {
        /// Offending question id.
        id: String,
        /// What was wrong with it.
        reason: String,
    },
}

#[derive(Deserialize)]
struct QuestionDocument {
    questions: Vec<Question>,
}

/// Parse and validate a question document.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, ContentError> {
    let doc: QuestionDocument = serde_json::from_str(json)?;
    if doc.questions.is_empty() {
        return Err(ContentError::Empty);
    }
    for q in &doc.questions {
        if q.options.is_empty() {
            return Err(ContentError::Invalid {
                id: q.id.clone(),
                reason: "no answer options".to_string(),
            });
        }
        if (q.correct_answer as usize) >= q.options.len() {
            return Err(ContentError::Invalid {
                id: q.id.clone(),
                reason: "correct answer index out of range".to_string(),
            });
        }
        if q.points == 0 {
            return Err(ContentError::Invalid {
                id: q.id.clone(),
                reason: "zero point value".to_string(),
            });
        }
    }
    Ok(doc.questions)
}

/// Load questions from a JSON file on disk.
pub fn load_question_file(path: &Path) -> Result<Vec<Question>, ContentError> {
    let json = fs::read_to_string(path)?;
    parse_questions(&json)
}

/// Fixed, non-empty fallback used when no file is configured or the
/// configured file cannot be loaded.
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question {
            id: "fallback-001".to_string(),
            question: "Which protocol does this server speak to clients?".to_string(),
            options: vec![
                "SMTP".to_string(),
                "WebSocket".to_string(),
                "FTP".to_string(),
                "IRC".to_string(),
            ],
            correct_answer: 1,
            category: "Basics".to_string(),
            difficulty: Difficulty::Easy,
            points: 5,
        },
        Question {
            id: "fallback-002".to_string(),
            question: "How many milliseconds are in a quarter of a minute?".to_string(),
            options: vec![
                "1500".to_string(),
                "25000".to_string(),
                "15000".to_string(),
                "150000".to_string(),
            ],
            correct_answer: 2,
            category: "Basics".to_string(),
            difficulty: Difficulty::Medium,
            points: 10,
        },
    ]
}

/// Load the configured question file, falling back to the built-in
/// set on any failure. Failures are logged, never surfaced to clients.
pub fn load_or_fallback(path: Option<&Path>) -> Vec<Question> {
    match path {
        Some(path) => match load_question_file(path) {
            Ok(questions) => {
                info!("Loaded {} questions from {}", questions.len(), path.display());
                questions
            }
            Err(e) => {
                warn!("Question load failed ({e}), using fallback set");
                fallback_questions()
            }
        },
        None => {
            info!("No question file configured, using fallback set");
            fallback_questions()
        }
    }
}
