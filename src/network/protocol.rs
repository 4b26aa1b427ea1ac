//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are JSON text frames: tagged unions with a snake_case
//! `type` discriminator and camelCase field names.

use serde::{Deserialize, Serialize};

use crate::game::question::PublicQuestion;
use crate::game::state::{Phase, Player, PlayerAnswer, PlayerId};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create a player record for this connection.
    Join {
        /// Requested display name.
        name: String,
    },

    /// Select an answer option for the active question.
    Answer {
        /// Option index.
        option: u32,
    },

    /// Fire-and-forget emoji reaction, relayed to everyone.
    Emoji {
        /// The emoji itself.
        emoji: String,
    },

    /// Cursor position update, relayed to everyone but the sender.
    Cursor {
        /// Horizontal position (client coordinate space).
        x: f32,
        /// Vertical position (client coordinate space).
        y: f32,
    },

    /// Start the game from the lobby.
    StartGame,

    /// Host-only: skip the results delay and advance immediately.
    NextQuestion,

    /// Host-only: reset a finished game back to the lobby.
    ResetGame,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Partial room snapshot (sent on connect and on reset).
    GameState {
        /// The snapshot fields.
        state: GameStateSnapshot,
    },

    /// A player joined the room.
    PlayerJoined {
        /// The new player record.
        player: Player,
    },

    /// A player left the room.
    PlayerLeft {
        /// Departed player's id.
        player_id: PlayerId,
    },

    /// A question began. The correct answer is not included.
    QuestionStart {
        /// Client-safe question.
        question: PublicQuestion,
        /// Milliseconds until timeout.
        time_remaining: u64,
    },

    /// A question ended; answers are revealed.
    QuestionEnd {
        /// The correct option index.
        correct_answer: u32,
        /// Every recorded answer, in join order.
        player_answers: Vec<PlayerAnswer>,
    },

    /// Full standings, frozen once the game is finished.
    Leaderboard {
        /// Players sorted by descending score.
        players: Vec<Player>,
    },

    /// Relayed emoji reaction (includes the sender).
    Emoji {
        /// Reacting player.
        player_id: PlayerId,
        /// The emoji itself.
        emoji: String,
    },

    /// Relayed cursor position (excludes the sender).
    Cursor {
        /// Moving player.
        player_id: PlayerId,
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },

    /// Error reply, unicast to the offending sender only.
    Error {
        /// Human-readable description.
        message: String,
    },
}

/// Partial room snapshot carried by [`ServerMessage::GameState`].
/// Absent fields are omitted from the wire entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    /// Current phase.
    pub phase: Phase,
    /// Player list in join order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Player>>,
    /// Question cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    /// Per-question time limit (milliseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_duration: Option<u64>,
}

impl GameStateSnapshot {
    /// Snapshot with every field populated.
    pub fn full(
        phase: Phase,
        players: Vec<Player>,
        question_index: usize,
        question_duration: u64,
    ) -> Self {
        Self {
            phase,
            players: Some(players),
            question_index: Some(question_index),
            question_duration: Some(question_duration),
        }
    }

    /// Phase-only update (used when the game finishes).
    pub fn phase_only(phase: Phase) -> Self {
        Self {
            phase,
            players: None,
            question_index: None,
            question_duration: None,
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
