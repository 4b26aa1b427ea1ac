//! # Quiz Room Server
//!
//! Authoritative room server for real-time multiplayer trivia over WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     QUIZ ROOM SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  content.rs      - Question loading with fixed fallback      │
//! │                                                              │
//! │  game/           - Room state machine (synchronous, no IO)   │
//! │  ├── question.rs - Question records and client projection    │
//! │  └── state.rs    - Phases, players, answers, leaderboards    │
//! │                                                              │
//! │  network/        - Networking (async, non-deterministic)     │
//! │  ├── protocol.rs - Client/server message types               │
//! │  ├── room.rs     - Room session: registry, timers, broadcast │
//! │  └── server.rs   - WebSocket accept loop                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Guarantee
//!
//! The room is a single logical actor. All state mutations run under an
//! exclusive write guard held for the full handler, so inbound messages
//! and timer callbacks never interleave. Phase transitions are guarded
//! and generation-stamped, so a question ends exactly once no matter
//! whether the timer or the last answer gets there first.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod content;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::question::{Difficulty, PublicQuestion, Question};
pub use game::state::{GameState, Phase, Player, PlayerId};
pub use network::protocol::{ClientMessage, ServerMessage};
pub use network::room::RoomSession;
pub use network::server::{GameServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time allotted to answer each question (milliseconds).
pub const QUESTION_DURATION_MS: u64 = 15_000;

/// How long results stay on screen before the next question (milliseconds).
pub const RESULTS_DELAY_MS: u64 = 2_000;
