//! WebSocket Server
//!
//! Accepts TCP connections, upgrades them to WebSocket, and runs one
//! read loop per connection. Outbound traffic goes through a per-
//! connection mpsc channel drained by a dedicated sender task, so no
//! socket write ever happens while the room lock is held.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::game::question::Question;
use crate::game::state::PlayerId;
use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::network::room::{RoomSession, SharedRoom};

/// Outbound channel depth per connection. A client that cannot drain
/// this many messages starts losing broadcasts rather than stalling
/// the room.
const OUTBOUND_CHANNEL_SIZE: usize = 64;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to.
    pub bind_addr: SocketAddr,
    /// Maximum simultaneous connections.
    pub max_connections: usize,
    /// Time allotted per question (milliseconds).
    pub question_duration_ms: u64,
    /// How long results stay visible before advancing (milliseconds).
    pub results_delay_ms: u64,
    /// Optional question file; the built-in set is used without one.
    pub questions_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 100,
            question_duration_ms: crate::QUESTION_DURATION_MS,
            results_delay_ms: crate::RESULTS_DELAY_MS,
            questions_file: None,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from environment variables, falling back
    /// to defaults for anything unset or unparseable.
    ///
    /// - `QUIZ_BIND_ADDR`: listener address
    /// - `QUIZ_QUESTIONS_FILE`: path to a question JSON document
    /// - `QUIZ_QUESTION_DURATION_MS`: per-question time limit
    /// - `QUIZ_RESULTS_DELAY_MS`: results display time
    /// - `QUIZ_MAX_CONNECTIONS`: connection cap
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("QUIZ_BIND_ADDR") {
            match addr.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => warn!("Ignoring unparseable QUIZ_BIND_ADDR: {addr}"),
            }
        }
        if let Ok(path) = std::env::var("QUIZ_QUESTIONS_FILE") {
            config.questions_file = Some(PathBuf::from(path));
        }
        if let Ok(ms) = std::env::var("QUIZ_QUESTION_DURATION_MS") {
            match ms.parse() {
                Ok(ms) => config.question_duration_ms = ms,
                Err(_) => warn!("Ignoring unparseable QUIZ_QUESTION_DURATION_MS: {ms}"),
            }
        }
        if let Ok(ms) = std::env::var("QUIZ_RESULTS_DELAY_MS") {
            match ms.parse() {
                Ok(ms) => config.results_delay_ms = ms,
                Err(_) => warn!("Ignoring unparseable QUIZ_RESULTS_DELAY_MS: {ms}"),
            }
        }
        if let Ok(max) = std::env::var("QUIZ_MAX_CONNECTIONS") {
            match max.parse() {
                Ok(max) => config.max_connections = max,
                Err(_) => warn!("Ignoring unparseable QUIZ_MAX_CONNECTIONS: {max}"),
            }
        }
        config
    }
}

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Could not bind the listener.
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        /// The address that failed to bind.
        addr: SocketAddr,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// WebSocket handshake or transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// The trivia room server: one listener, one shared room.
pub struct GameServer {
    config: ServerConfig,
    room: SharedRoom,
    connection_count: Arc<AtomicUsize>,
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a server around a loaded question sequence.
    pub fn new(config: ServerConfig, questions: Vec<Question>) -> Self {
        let room = RoomSession::new(
            questions,
            config.question_duration_ms,
            config.results_delay_ms,
        )
        .into_shared();
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            room,
            connection_count: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        }
    }

    /// Handle for observing or driving the room directly (tests).
    pub fn room(&self) -> SharedRoom {
        Arc::clone(&self.room)
    }

    /// Signal the accept loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Bind and run the accept loop until shutdown.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await.map_err(|source| {
            GameServerError::BindFailed {
                addr: self.config.bind_addr,
                source,
            }
        })?;
        info!("Listening on {}", self.config.bind_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.spawn_connection(stream, peer),
                        Err(e) => warn!("Accept failed: {e}"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, stopping accept loop");
                    return Ok(());
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let count = self.connection_count.load(Ordering::Relaxed);
        if count >= self.config.max_connections {
            warn!("Rejecting {peer}: connection limit ({}) reached", self.config.max_connections);
            return;
        }
        self.connection_count.fetch_add(1, Ordering::Relaxed);

        let room = Arc::clone(&self.room);
        let connection_count = Arc::clone(&self.connection_count);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(room, stream, peer).await {
                debug!("Connection {peer} ended with error: {e}");
            }
            connection_count.fetch_sub(1, Ordering::Relaxed);
        });
    }
}

/// Run one connection end to end: handshake, register, read loop,
/// deregister.
async fn handle_connection(
    room: SharedRoom,
    stream: TcpStream,
    peer: SocketAddr,
) -> Result<(), GameServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    let conn_id = PlayerId::random();
    debug!("Connection {conn_id} established from {peer}");

    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CHANNEL_SIZE);
    let sender_task = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize server message: {e}");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    room.write().await.on_connect(conn_id, out_tx.clone());

    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientMessage::from_json(&text) {
                Ok(message) => {
                    RoomSession::handle_message(&room, conn_id, message).await;
                }
                Err(e) => {
                    debug!("Malformed message from {conn_id}: {e}");
                    let _ = out_tx
                        .send(ServerMessage::Error {
                            message: "Invalid message format".to_string(),
                        })
                        .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_)) => {}
            Err(e) => {
                debug!("Read error on {conn_id}: {e}");
                break;
            }
        }
    }

    sender_task.abort();
    let mut session = room.write().await;
    session.on_disconnect(&room, conn_id);
    debug!("Connection {conn_id} closed ({} remaining)", session.connection_count());

    Ok(())
}
