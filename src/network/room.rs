//! Room Session
//!
//! Glues the synchronous state machine in `game/` to the transport:
//! tracks live connections, broadcasts server messages, and drives the
//! question/results timers.
//!
//! The session lives behind `Arc<RwLock<..>>`; every handler holds the
//! write guard for its whole mutation, so inbound messages and timer
//! callbacks are serialized. Sends are non-blocking `try_send`s into
//! per-connection channels, so a slow client drops messages instead of
//! holding up the room. Timers are spawned sleep tasks stamped
//! with a generation counter: any transition that supersedes a pending
//! timer bumps the counter, and a stale timer firing is a no-op. The
//! question timer handle is additionally aborted when a question ends
//! early.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::game::question::Question;
use crate::game::state::{Advance, AnswerOutcome, GameState, Phase, PlayerId, QuestionStart};
use crate::network::protocol::{ClientMessage, GameStateSnapshot, ServerMessage};

/// Shared handle to a room session.
pub type SharedRoom = Arc<RwLock<RoomSession>>;

/// One trivia room: game state plus its connection registry and timers.
pub struct RoomSession {
    /// The room's game state.
    pub state: GameState,
    /// Live connections by id. A connection without a joined player
    /// receives broadcasts but has no player record.
    connections: BTreeMap<PlayerId, mpsc::Sender<ServerMessage>>,
    /// Pending question timeout, aborted on early end.
    question_timer: Option<JoinHandle<()>>,
    /// Bumped on every superseding transition; stale timers no-op.
    timer_generation: u64,
    /// How long results stay visible before advancing.
    results_delay: Duration,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl RoomSession {
    /// Create a room around a loaded question sequence.
    pub fn new(questions: Vec<Question>, question_duration_ms: u64, results_delay_ms: u64) -> Self {
        Self {
            state: GameState::new(questions, question_duration_ms),
            connections: BTreeMap::new(),
            question_timer: None,
            timer_generation: 0,
            results_delay: Duration::from_millis(results_delay_ms),
        }
    }

    /// Wrap into the shared handle the server and timers use.
    pub fn into_shared(self) -> SharedRoom {
        Arc::new(RwLock::new(self))
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // =========================================================================
    // Messaging
    // =========================================================================

    // All sends are fire-and-forget: a connection whose outbound
    // channel is full loses the message instead of stalling the room.
    // Handlers run under the write guard, so nothing here may block.

    fn send_to(&self, id: &PlayerId, message: ServerMessage) {
        if let Some(sender) = self.connections.get(id) {
            if sender.try_send(message).is_err() {
                debug!("Dropping message to {id}: outbound channel full or closed");
            }
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for (id, sender) in &self.connections {
            if sender.try_send(message.clone()).is_err() {
                debug!("Dropping broadcast to {id}: outbound channel full or closed");
            }
        }
    }

    fn broadcast_except(&self, except: &PlayerId, message: ServerMessage) {
        for (id, sender) in &self.connections {
            if id == except {
                continue;
            }
            if sender.try_send(message.clone()).is_err() {
                debug!("Dropping broadcast to {id}: outbound channel full or closed");
            }
        }
    }

    fn snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot::full(
            self.state.phase,
            self.state.players_by_join(),
            self.state.question_index,
            self.state.question_duration_ms,
        )
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Register a new connection and send it the current snapshot and
    /// leaderboard (frozen if the game is finished).
    pub fn on_connect(&mut self, id: PlayerId, sender: mpsc::Sender<ServerMessage>) {
        self.connections.insert(id, sender);
        self.send_to(&id, ServerMessage::GameState { state: self.snapshot() });
        self.send_to(
            &id,
            ServerMessage::Leaderboard { players: self.state.leaderboard() },
        );
    }

    /// Drop a connection. If it had a joined player, prune the player,
    /// then either reset the room (last player out) or rebroadcast the
    /// leaderboard and end the question early if everyone left has
    /// answered.
    pub fn on_disconnect(&mut self, room: &SharedRoom, id: PlayerId) {
        self.connections.remove(&id);
        let Some(player) = self.state.remove_player(&id) else {
            return;
        };
        debug!("Player {} ({}) left", player.name, id);
        self.broadcast(ServerMessage::PlayerLeft { player_id: id });

        if self.state.players.is_empty() {
            info!("All players left, resetting room to lobby");
            self.reset_room();
            return;
        }

        if player.is_host {
            if let Some(successor) = self.state.ensure_host() {
                info!("Host left, capability passed to {}", successor);
            }
        }

        self.broadcast(ServerMessage::Leaderboard { players: self.state.leaderboard() });

        if self.state.phase == Phase::Question && self.state.all_answered() {
            self.end_question(room);
        }
    }

    // =========================================================================
    // Message dispatch
    // =========================================================================

    /// Process one inbound client message under the room's write guard.
    pub async fn handle_message(room: &SharedRoom, sender: PlayerId, message: ClientMessage) {
        let mut session = room.write().await;
        match message {
            ClientMessage::Join { name } => session.on_join(sender, &name),
            ClientMessage::Answer { option } => session.on_answer(room, sender, option),
            ClientMessage::Emoji { emoji } => session.on_emoji(sender, emoji),
            ClientMessage::Cursor { x, y } => session.on_cursor(sender, x, y),
            ClientMessage::StartGame => session.on_start_game(room),
            ClientMessage::NextQuestion => session.on_next_question(room, sender),
            ClientMessage::ResetGame => session.on_reset_game(sender),
        }
    }

    fn on_join(&mut self, id: PlayerId, name: &str) {
        // A re-join replaces the old record; host status is re-derived
        // so the capability cannot be lost to a stale entry.
        self.state.remove_player(&id);
        let player = self.state.add_player(id, name, now_ms());
        info!("Player {} joined as {}{}", id, player.name, if player.is_host { " (host)" } else { "" });

        self.broadcast(ServerMessage::PlayerJoined { player });
        self.broadcast(ServerMessage::Leaderboard { players: self.state.leaderboard() });
    }

    fn on_answer(&mut self, room: &SharedRoom, id: PlayerId, option: u32) {
        match self.state.record_answer(&id, option) {
            AnswerOutcome::Ignored => {}
            AnswerOutcome::Recorded { all_answered } => {
                if all_answered {
                    // Everyone is in; no need to wait out the clock.
                    self.end_question(room);
                }
            }
        }
    }

    fn on_emoji(&self, id: PlayerId, emoji: String) {
        self.broadcast(ServerMessage::Emoji { player_id: id, emoji });
    }

    fn on_cursor(&self, id: PlayerId, x: f32, y: f32) {
        self.broadcast_except(&id, ServerMessage::Cursor { player_id: id, x, y });
    }

    fn on_start_game(&mut self, room: &SharedRoom) {
        if let Some(start) = self.state.start_game(now_ms()) {
            info!("Game started with {} players", self.state.players.len());
            self.announce_question(room, start);
        }
    }

    fn on_next_question(&mut self, room: &SharedRoom, sender: PlayerId) {
        if !self.state.is_host(&sender) {
            debug!("Non-host {} attempted to advance", sender);
            return;
        }
        // Advancing is only meaningful during results; the guarded
        // transition ignores anything else.
        self.advance(room);
    }

    fn on_reset_game(&mut self, sender: PlayerId) {
        if !self.state.is_host(&sender) {
            debug!("Non-host {} attempted to reset", sender);
            return;
        }
        if self.state.phase != Phase::Finished {
            return;
        }
        info!("Host {} reset the room", sender);
        self.reset_room();
        self.broadcast(ServerMessage::GameState { state: self.snapshot() });
    }

    // =========================================================================
    // Phase transitions and timers
    // =========================================================================

    /// Broadcast a question start and arm its timeout.
    fn announce_question(&mut self, room: &SharedRoom, start: QuestionStart) {
        self.timer_generation += 1;
        self.broadcast(ServerMessage::QuestionStart {
            question: start.question,
            time_remaining: start.time_remaining,
        });
        self.arm_question_timer(room);
    }

    /// End the current question: score, reveal, schedule the advance.
    /// Safe to race; the state guard makes late triggers no-ops.
    fn end_question(&mut self, room: &SharedRoom) {
        let Some(results) = self.state.end_question() else {
            return;
        };
        self.timer_generation += 1;
        if let Some(timer) = self.question_timer.take() {
            timer.abort();
        }

        self.broadcast(ServerMessage::QuestionEnd {
            correct_answer: results.correct_answer,
            player_answers: results.player_answers,
        });
        self.broadcast(ServerMessage::Leaderboard { players: self.state.leaderboard() });

        self.arm_advance_timer(room);
    }

    /// Move past the results phase: next question or game over.
    fn advance(&mut self, room: &SharedRoom) {
        match self.state.advance(now_ms()) {
            Some(Advance::Question(start)) => {
                self.announce_question(room, start);
            }
            Some(Advance::Finished(rankings)) => {
                self.timer_generation += 1;
                info!("Game finished, rankings frozen");
                self.broadcast(ServerMessage::GameState {
                    state: GameStateSnapshot::phase_only(Phase::Finished),
                });
                self.broadcast(ServerMessage::Leaderboard { players: rankings });
            }
            None => {}
        }
    }

    fn arm_question_timer(&mut self, room: &SharedRoom) {
        let generation = self.timer_generation;
        let delay = Duration::from_millis(self.state.question_duration_ms);
        let room = Arc::clone(room);
        self.question_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = room.write().await;
            session.question_timeout(&room, generation);
        }));
    }

    fn question_timeout(&mut self, room: &SharedRoom, generation: u64) {
        if generation != self.timer_generation {
            return;
        }
        // This task is the pending timer; clear it so end_question
        // does not abort the currently running task.
        self.question_timer = None;
        self.end_question(room);
    }

    fn arm_advance_timer(&mut self, room: &SharedRoom) {
        let generation = self.timer_generation;
        let delay = self.results_delay;
        let room = Arc::clone(room);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = room.write().await;
            session.advance_timeout(&room, generation);
        });
    }

    fn advance_timeout(&mut self, room: &SharedRoom, generation: u64) {
        if generation != self.timer_generation {
            return;
        }
        self.advance(room);
    }

    /// Reset to the lobby, invalidating every pending timer.
    fn reset_room(&mut self) {
        self.timer_generation += 1;
        if let Some(timer) = self.question_timer.take() {
            timer.abort();
        }
        self.state.reset_to_lobby();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::question::Difficulty;

    fn question(id: &str, correct: u32, points: u32) -> Question {
        Question {
            id: id.to_string(),
            question: format!("prompt {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: correct,
            category: "Test".to_string(),
            difficulty: Difficulty::Easy,
            points,
        }
    }

    fn test_room(questions: Vec<Question>) -> SharedRoom {
        RoomSession::new(questions, 15_000, 2_000).into_shared()
    }

    async fn connect(room: &SharedRoom) -> (PlayerId, mpsc::Receiver<ServerMessage>) {
        let id = PlayerId::random();
        let (tx, rx) = mpsc::channel(64);
        room.write().await.on_connect(id, tx);
        (id, rx)
    }

    async fn join(room: &SharedRoom, id: PlayerId, name: &str) {
        RoomSession::handle_message(room, id, ClientMessage::Join { name: name.to_string() })
            .await;
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn count_question_ends(messages: &[ServerMessage]) -> usize {
        messages
            .iter()
            .filter(|m| matches!(m, ServerMessage::QuestionEnd { .. }))
            .count()
    }

    #[tokio::test]
    async fn connect_receives_snapshot_then_leaderboard() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (_, mut rx) = connect(&room).await;

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], ServerMessage::GameState { state }
            if state.phase == Phase::Lobby
                && state.players.as_ref().is_some_and(|p| p.is_empty())));
        assert!(matches!(&messages[1], ServerMessage::Leaderboard { players } if players.is_empty()));
    }

    #[tokio::test]
    async fn join_is_broadcast_with_leaderboard() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, mut rx_a) = connect(&room).await;
        let (_b, mut rx_b) = connect(&room).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        join(&room, a, "alice").await;

        for rx in [&mut rx_a, &mut rx_b] {
            let messages = drain(rx);
            assert!(matches!(&messages[0], ServerMessage::PlayerJoined { player }
                if player.name == "alice" && player.is_host));
            assert!(matches!(&messages[1], ServerMessage::Leaderboard { players }
                if players.len() == 1));
        }
    }

    #[tokio::test]
    async fn connection_without_join_is_not_a_player() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (spectator, mut rx) = connect(&room).await;
        drain(&mut rx);

        RoomSession::handle_message(&room, spectator, ClientMessage::Answer { option: 0 }).await;
        assert!(room.read().await.state.players.is_empty());
        assert!(room.read().await.state.answers.is_empty());
    }

    #[tokio::test]
    async fn all_answered_ends_question_exactly_once() {
        let room = test_room(vec![question("q1", 0, 10), question("q2", 1, 5)]);
        let (a, mut rx_a) = connect(&room).await;
        let (b, mut rx_b) = connect(&room).await;
        join(&room, a, "alice").await;
        join(&room, b, "bob").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        let armed_generation = room.read().await.timer_generation;

        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        RoomSession::handle_message(&room, b, ClientMessage::Answer { option: 2 }).await;

        let messages = drain(&mut rx_a);
        assert_eq!(count_question_ends(&messages), 1);
        assert!(messages.iter().any(|m| matches!(m, ServerMessage::Leaderboard { .. })));

        // The superseded question timer fires late: must be a no-op.
        {
            let mut session = room.write().await;
            session.question_timeout(&room, armed_generation);
        }
        assert_eq!(count_question_ends(&drain(&mut rx_a)), 0);
        assert_eq!(room.read().await.state.phase, Phase::Results);
    }

    #[tokio::test]
    async fn question_end_reveals_correct_answer_and_scores() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, mut rx_a) = connect(&room).await;
        let (b, _rx_b) = connect(&room).await;
        join(&room, a, "alice").await;
        join(&room, b, "bob").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;
        drain(&mut rx_a);

        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        RoomSession::handle_message(&room, b, ClientMessage::Answer { option: 3 }).await;

        let messages = drain(&mut rx_a);
        let end = messages
            .iter()
            .find_map(|m| match m {
                ServerMessage::QuestionEnd { correct_answer, player_answers } => {
                    Some((*correct_answer, player_answers.clone()))
                }
                _ => None,
            })
            .expect("question_end broadcast");
        assert_eq!(end.0, 0);
        assert_eq!(end.1.len(), 2);

        let session = room.read().await;
        assert_eq!(session.state.players[&a].score, 10);
        assert_eq!(session.state.players[&b].score, 0);
    }

    #[tokio::test]
    async fn disconnect_of_unanswered_player_ends_question_early() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, mut rx_a) = connect(&room).await;
        let (b, _rx_b) = connect(&room).await;
        let (c, _rx_c) = connect(&room).await;
        join(&room, a, "alice").await;
        join(&room, b, "bob").await;
        join(&room, c, "carol").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;
        drain(&mut rx_a);

        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        RoomSession::handle_message(&room, b, ClientMessage::Answer { option: 1 }).await;
        assert_eq!(room.read().await.state.phase, Phase::Question);

        {
            let mut session = room.write().await;
            session.on_disconnect(&room, c);
        }

        let messages = drain(&mut rx_a);
        assert!(messages.iter().any(|m| matches!(m, ServerMessage::PlayerLeft { player_id } if *player_id == c)));
        assert_eq!(count_question_ends(&messages), 1);
        assert_eq!(room.read().await.state.phase, Phase::Results);
    }

    #[tokio::test]
    async fn last_player_leaving_resets_room_to_lobby() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, _rx_a) = connect(&room).await;
        join(&room, a, "alice").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;
        assert_eq!(room.read().await.state.phase, Phase::Question);

        {
            let mut session = room.write().await;
            session.on_disconnect(&room, a);
        }

        let session = room.read().await;
        assert_eq!(session.state.phase, Phase::Lobby);
        assert_eq!(session.state.question_index, 0);
        assert!(session.state.players.is_empty());
        // Question set is retained for the next group.
        assert_eq!(session.state.questions.len(), 1);
    }

    #[tokio::test]
    async fn host_capability_passes_on_host_departure() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, _rx_a) = connect(&room).await;
        let (b, _rx_b) = connect(&room).await;
        join(&room, a, "alice").await;
        join(&room, b, "bob").await;
        assert!(room.read().await.state.is_host(&a));

        {
            let mut session = room.write().await;
            session.on_disconnect(&room, a);
        }
        assert!(room.read().await.state.is_host(&b));
    }

    #[tokio::test]
    async fn reset_is_host_gated_and_finished_only() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, mut rx_a) = connect(&room).await;
        let (b, _rx_b) = connect(&room).await;
        join(&room, a, "alice").await; // host
        join(&room, b, "bob").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;

        // Mid-game reset requests are ignored, host or not.
        RoomSession::handle_message(&room, a, ClientMessage::ResetGame).await;
        assert_eq!(room.read().await.state.phase, Phase::Question);

        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        RoomSession::handle_message(&room, b, ClientMessage::Answer { option: 1 }).await;
        {
            let mut session = room.write().await;
            session.advance(&room);
        }
        assert_eq!(room.read().await.state.phase, Phase::Finished);

        RoomSession::handle_message(&room, b, ClientMessage::ResetGame).await;
        assert_eq!(room.read().await.state.phase, Phase::Finished);

        drain(&mut rx_a);
        RoomSession::handle_message(&room, a, ClientMessage::ResetGame).await;
        let session = room.read().await;
        assert_eq!(session.state.phase, Phase::Lobby);
        assert!(session.state.players.is_empty());
        drop(session);

        let messages = drain(&mut rx_a);
        assert!(messages.iter().any(|m| matches!(m, ServerMessage::GameState { state }
            if state.phase == Phase::Lobby
                && state.players.as_ref().is_some_and(|p| p.is_empty()))));
    }

    #[tokio::test]
    async fn frozen_leaderboard_sent_to_late_connections() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, _rx_a) = connect(&room).await;
        join(&room, a, "alice").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;
        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        {
            let mut session = room.write().await;
            session.advance(&room);
        }
        assert_eq!(room.read().await.state.phase, Phase::Finished);

        let (_late, mut rx_late) = connect(&room).await;
        let messages = drain(&mut rx_late);
        assert!(matches!(&messages[1], ServerMessage::Leaderboard { players }
            if players.len() == 1 && players[0].score == 10));
    }

    #[tokio::test]
    async fn next_question_is_host_gated_and_results_only() {
        let room = test_room(vec![question("q1", 0, 10), question("q2", 1, 5)]);
        let (a, mut rx_a) = connect(&room).await;
        let (b, _rx_b) = connect(&room).await;
        join(&room, a, "alice").await; // host
        join(&room, b, "bob").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;

        // During a question, even the host cannot skip ahead.
        RoomSession::handle_message(&room, a, ClientMessage::NextQuestion).await;
        assert_eq!(room.read().await.state.question_index, 0);

        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        RoomSession::handle_message(&room, b, ClientMessage::Answer { option: 0 }).await;
        assert_eq!(room.read().await.state.phase, Phase::Results);
        drain(&mut rx_a);

        RoomSession::handle_message(&room, b, ClientMessage::NextQuestion).await;
        assert_eq!(room.read().await.state.phase, Phase::Results);

        RoomSession::handle_message(&room, a, ClientMessage::NextQuestion).await;
        assert_eq!(room.read().await.state.phase, Phase::Question);
        assert_eq!(room.read().await.state.question_index, 1);

        let messages = drain(&mut rx_a);
        assert!(messages.iter().any(|m| matches!(m, ServerMessage::QuestionStart { question, .. }
            if question.id == "q2")));
    }

    #[tokio::test]
    async fn stale_advance_timer_does_not_double_advance() {
        let room = test_room(vec![question("q1", 0, 10), question("q2", 1, 5)]);
        let (a, _rx_a) = connect(&room).await;
        join(&room, a, "alice").await;
        RoomSession::handle_message(&room, a, ClientMessage::StartGame).await;
        RoomSession::handle_message(&room, a, ClientMessage::Answer { option: 0 }).await;
        assert_eq!(room.read().await.state.phase, Phase::Results);

        let armed_generation = room.read().await.timer_generation;

        // Host advances manually before the results delay elapses.
        RoomSession::handle_message(&room, a, ClientMessage::NextQuestion).await;
        assert_eq!(room.read().await.state.question_index, 1);

        // The superseded advance timer fires late: must be a no-op.
        {
            let mut session = room.write().await;
            session.advance_timeout(&room, armed_generation);
        }
        assert_eq!(room.read().await.state.question_index, 1);
        assert_eq!(room.read().await.state.phase, Phase::Question);
    }

    #[tokio::test]
    async fn full_outbound_channel_does_not_stall_the_room() {
        let room = test_room(vec![question("q1", 0, 10)]);

        // A connection that never drains its channel. Capacity 1: the
        // connect snapshot fills it and everything after is dropped.
        let stalled = PlayerId::random();
        let (stalled_tx, mut stalled_rx) = mpsc::channel(1);
        let registered = tokio::time::timeout(Duration::from_millis(500), async {
            room.write().await.on_connect(stalled, stalled_tx);
        })
        .await;
        assert!(registered.is_ok(), "connect must not block on a full channel");

        // Healthy traffic keeps flowing past the stalled connection.
        let (a, mut rx_a) = connect(&room).await;
        drain(&mut rx_a);
        let joined = tokio::time::timeout(Duration::from_millis(500), join(&room, a, "alice")).await;
        assert!(joined.is_ok(), "broadcast must not block on a full channel");

        let messages = drain(&mut rx_a);
        assert!(matches!(&messages[0], ServerMessage::PlayerJoined { player }
            if player.name == "alice"));

        // The stalled connection got the first message and lost the rest.
        let backlog = drain(&mut stalled_rx);
        assert_eq!(backlog.len(), 1);
        assert!(matches!(&backlog[0], ServerMessage::GameState { .. }));
    }

    #[tokio::test]
    async fn emoji_relays_to_everyone_including_sender() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, mut rx_a) = connect(&room).await;
        let (_b, mut rx_b) = connect(&room).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        RoomSession::handle_message(&room, a, ClientMessage::Emoji { emoji: "🎉".to_string() })
            .await;

        for rx in [&mut rx_a, &mut rx_b] {
            let messages = drain(rx);
            assert!(matches!(&messages[0], ServerMessage::Emoji { player_id, emoji }
                if *player_id == a && emoji == "🎉"));
        }
    }

    #[tokio::test]
    async fn cursor_relays_to_everyone_except_sender() {
        let room = test_room(vec![question("q1", 0, 10)]);
        let (a, mut rx_a) = connect(&room).await;
        let (_b, mut rx_b) = connect(&room).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        RoomSession::handle_message(&room, a, ClientMessage::Cursor { x: 0.5, y: 0.5 }).await;

        assert!(drain(&mut rx_a).is_empty());
        let messages = drain(&mut rx_b);
        assert!(matches!(&messages[0], ServerMessage::Cursor { player_id, .. } if *player_id == a));
    }
}
