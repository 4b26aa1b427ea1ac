//! Network Module
//!
//! WebSocket transport for trivia rooms: the listener, per-connection
//! IO tasks, the shared room session, and the wire protocol.
//!
//! ## Module Structure
//!
//! - `protocol`: client/server message types and JSON codec
//! - `room`: room session, broadcasts, question/results timers
//! - `server`: TCP listener, WebSocket upgrade, connection lifecycle

pub mod protocol;
pub mod room;
pub mod server;

// Re-export key types
pub use protocol::{ClientMessage, GameStateSnapshot, ServerMessage};
pub use room::{RoomSession, SharedRoom};
pub use server::{GameServer, GameServerError, ServerConfig};
