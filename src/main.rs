//! Trivia room server binary.
//!
//! Reads configuration from the environment, loads the question set
//! (or falls back to the built-in one), and serves a single shared
//! room over WebSocket until killed.

use tracing::info;
use tracing_subscriber::EnvFilter;

use quiz_room::content;
use quiz_room::network::server::{GameServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let questions = content::load_or_fallback(config.questions_file.as_deref());

    info!(
        "Starting quiz-room-server v{} on {} ({} questions, {}ms per question)",
        quiz_room::VERSION,
        config.bind_addr,
        questions.len(),
        config.question_duration_ms
    );

    let server = GameServer::new(config, questions);
    server.run().await?;
    Ok(())
}
