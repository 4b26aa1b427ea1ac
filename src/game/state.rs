//! Room State Machine
//!
//! All game logic for a single trivia room: phases, players, answer
//! collection, scoring, and leaderboards. This module is synchronous
//! and IO-free; timers and message delivery live in `network/`.
//!
//! Uses BTreeMap keyed by player id, with display ordering derived
//! from a monotonic join sequence so iteration matches join order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::question::{PublicQuestion, Question};

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier. The transport connection identity is
/// reused as the player id, so a connection maps to at most one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a UUID string.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Coarse stage of a game run.
///
/// ```text
/// lobby --start--> question <--loop-- results --> finished
///   ^                                               |
///   +------------------ host reset -----------------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for players before the game starts.
    Lobby,
    /// A question is active and accepting answers.
    Question,
    /// Answers revealed, scores applied, waiting to advance.
    Results,
    /// All questions played; rankings are frozen until reset.
    Finished,
}

// =============================================================================
// PLAYER
// =============================================================================

/// State of a single joined player.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Unique player id (connection identity).
    pub id: PlayerId,
    /// Display name, trimmed at join.
    pub name: String,
    /// Cumulative score. Only ever increases within a game run.
    pub score: u32,
    /// Option index selected for the current question, cleared each question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_answer: Option<u32>,
    /// Join timestamp (unix epoch milliseconds).
    pub joined_at: i64,
    /// Holds the host capability (may reset the room).
    pub is_host: bool,
    /// Monotonic join counter; drives display order and tie-breaks.
    #[serde(skip)]
    pub join_seq: u64,
}

/// One recorded (player, answer) pair, revealed at question end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswer {
    /// Player who answered.
    pub player_id: PlayerId,
    /// Option index they selected.
    pub answer: u32,
}

// =============================================================================
// TRANSITION OUTCOMES
// =============================================================================

/// Data produced when a question begins: what to broadcast.
#[derive(Clone, Debug)]
pub struct QuestionStart {
    /// The question with the correct answer stripped.
    pub question: PublicQuestion,
    /// Milliseconds until the question times out.
    pub time_remaining: u64,
}

/// Data produced when a question ends: what to reveal.
#[derive(Clone, Debug)]
pub struct QuestionResults {
    /// The correct option index, now safe to reveal.
    pub correct_answer: u32,
    /// Every recorded answer, in player join order.
    pub player_answers: Vec<PlayerAnswer>,
}

/// Result of recording an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Dropped: wrong phase, no active question, or unknown player.
    Ignored,
    /// Recorded (overwriting any earlier answer from the same player).
    Recorded {
        /// True when every connected player has now answered.
        all_answered: bool,
    },
}

/// Result of advancing past the results phase.
#[derive(Clone, Debug)]
pub enum Advance {
    /// The next question began.
    Question(QuestionStart),
    /// No questions remain; rankings are now frozen.
    Finished(Vec<Player>),
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one trivia room. Exclusively owned by the room
/// session; handlers mutate it with exclusive access end-to-end.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Current phase.
    pub phase: Phase,
    /// Joined players by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Ordered question sequence, loaded once at room creation.
    pub questions: Vec<Question>,
    /// Zero-based cursor into `questions`.
    pub question_index: usize,
    /// Active question. Defined iff phase is `Question` or `Results`.
    pub current_question: Option<Question>,
    /// When the current question began (unix epoch milliseconds).
    pub question_started_at: Option<i64>,
    /// Fixed time allotted per question (milliseconds).
    pub question_duration_ms: u64,
    /// Recorded answers for the current question.
    pub answers: BTreeMap<PlayerId, u32>,
    /// Leaderboard snapshot frozen at game end. Defined iff finished.
    pub final_rankings: Option<Vec<Player>>,
    next_join_seq: u64,
}

impl GameState {
    /// Create a fresh lobby with the given question sequence.
    pub fn new(questions: Vec<Question>, question_duration_ms: u64) -> Self {
        Self {
            phase: Phase::Lobby,
            players: BTreeMap::new(),
            questions,
            question_index: 0,
            current_question: None,
            question_started_at: None,
            question_duration_ms,
            answers: BTreeMap::new(),
            final_rankings: None,
            next_join_seq: 0,
        }
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Add a player. The first player in an empty room receives the
    /// host capability. Returns a clone for broadcasting.
    pub fn add_player(&mut self, id: PlayerId, name: &str, now_ms: i64) -> Player {
        let is_host = !self.players.values().any(|p| p.is_host);
        let player = Player {
            id,
            name: name.trim().to_string(),
            score: 0,
            current_answer: None,
            joined_at: now_ms,
            is_host,
            join_seq: self.next_join_seq,
        };
        self.next_join_seq += 1;
        self.players.insert(id, player.clone());
        player
    }

    /// Remove a player and any answer they recorded.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        self.answers.remove(id);
        self.players.remove(id)
    }

    /// Pass the host capability to the earliest-joined player if the
    /// current host is gone. Returns the promoted player's id.
    pub fn ensure_host(&mut self) -> Option<PlayerId> {
        if self.players.is_empty() || self.players.values().any(|p| p.is_host) {
            return None;
        }
        let successor = self
            .players
            .values()
            .min_by_key(|p| p.join_seq)
            .map(|p| p.id)?;
        if let Some(player) = self.players.get_mut(&successor) {
            player.is_host = true;
        }
        Some(successor)
    }

    /// Whether this player holds the host capability.
    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.players.get(id).map(|p| p.is_host).unwrap_or(false)
    }

    /// Players in join order (for snapshots and answer reveals).
    pub fn players_by_join(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_by_key(|p| p.join_seq);
        players
    }

    /// Whether every connected player has answered the current question.
    pub fn all_answered(&self) -> bool {
        !self.players.is_empty() && self.answers.len() >= self.players.len()
    }

    // =========================================================================
    // Leaderboard
    // =========================================================================

    /// Current standings: the frozen snapshot once finished, otherwise
    /// a live sort by descending score. Ties break by join order
    /// (stable sort over the join-ordered list).
    pub fn leaderboard(&self) -> Vec<Player> {
        if let Some(rankings) = &self.final_rankings {
            return rankings.clone();
        }
        let mut players = self.players_by_join();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        players
    }

    // =========================================================================
    // Phase transitions
    // =========================================================================

    /// `lobby -> question`. No-op unless in lobby with questions loaded.
    pub fn start_game(&mut self, now_ms: i64) -> Option<QuestionStart> {
        if self.phase != Phase::Lobby || self.questions.is_empty() {
            return None;
        }
        self.question_index = 0;
        Some(self.begin_question(now_ms))
    }

    /// Begin the question at the current cursor. Callers must ensure
    /// the cursor is in bounds.
    fn begin_question(&mut self, now_ms: i64) -> QuestionStart {
        let question = self.questions[self.question_index].clone();
        self.phase = Phase::Question;
        self.question_started_at = Some(now_ms);
        self.answers.clear();
        for player in self.players.values_mut() {
            player.current_answer = None;
        }
        let public = question.public();
        self.current_question = Some(question);
        QuestionStart {
            question: public,
            time_remaining: self.question_duration_ms,
        }
    }

    /// Record an answer for the current question. Last write wins.
    pub fn record_answer(&mut self, id: &PlayerId, option: u32) -> AnswerOutcome {
        if self.phase != Phase::Question || self.current_question.is_none() {
            return AnswerOutcome::Ignored;
        }
        let Some(player) = self.players.get_mut(id) else {
            return AnswerOutcome::Ignored;
        };
        player.current_answer = Some(option);
        self.answers.insert(*id, option);
        AnswerOutcome::Recorded {
            all_answered: self.all_answered(),
        }
    }

    /// `question -> results`. Applies scoring and reveals answers.
    ///
    /// Idempotent: returns `None` if no question is active, so a timer
    /// firing after an early end (or the reverse) has no effect.
    pub fn end_question(&mut self) -> Option<QuestionResults> {
        if self.phase != Phase::Question {
            return None;
        }
        let question = self.current_question.as_ref()?.clone();
        self.phase = Phase::Results;

        let mut player_answers = Vec::with_capacity(self.answers.len());
        for entry in self.players_by_join() {
            let Some(&answer) = self.answers.get(&entry.id) else {
                continue;
            };
            player_answers.push(PlayerAnswer {
                player_id: entry.id,
                answer,
            });
            if question.is_correct(answer) {
                if let Some(player) = self.players.get_mut(&entry.id) {
                    player.score += question.points;
                }
            }
        }

        Some(QuestionResults {
            correct_answer: question.correct_answer,
            player_answers,
        })
    }

    /// `results -> question` or `results -> finished`. No-op outside results.
    pub fn advance(&mut self, now_ms: i64) -> Option<Advance> {
        if self.phase != Phase::Results {
            return None;
        }
        self.question_index += 1;
        if self.question_index < self.questions.len() {
            Some(Advance::Question(self.begin_question(now_ms)))
        } else {
            Some(Advance::Finished(self.end_game()))
        }
    }

    /// `* -> finished`. Freezes the leaderboard exactly once.
    fn end_game(&mut self) -> Vec<Player> {
        self.phase = Phase::Finished;
        self.current_question = None;
        self.question_started_at = None;
        let rankings = {
            let mut players = self.players_by_join();
            players.sort_by(|a, b| b.score.cmp(&a.score));
            players
        };
        self.final_rankings = Some(rankings.clone());
        rankings
    }

    /// Full reset back to the initial lobby. The loaded question
    /// sequence is retained; everything else is cleared.
    pub fn reset_to_lobby(&mut self) {
        self.phase = Phase::Lobby;
        self.players.clear();
        self.answers.clear();
        self.question_index = 0;
        self.current_question = None;
        self.question_started_at = None;
        self.final_rankings = None;
        self.next_join_seq = 0;
    }
}
