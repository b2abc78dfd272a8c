//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{PlayerSession, SessionError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use mapquiz_core::{Atlas, Sampler};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// Regions loaded at startup, read-only
    pub atlas: Arc<Atlas>,
    /// Sampler handed to every new session
    pub sampler: Sampler,
    /// One session per connection
    pub sessions: DashMap<Uuid, PlayerSession>,
    /// Mapping from session ID to its message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(atlas: Arc<Atlas>, sampler: Sampler) -> Self {
        Self {
            atlas,
            sampler,
            sessions: DashMap::new(),
            senders: DashMap::new(),
        }
    }

    /// Create and register a session, returning its welcome and first round
    pub fn open_session(&self, session_id: Uuid) -> Vec<ServerMessage> {
        let mut session = PlayerSession::new(session_id, Arc::clone(&self.atlas), self.sampler);
        let mut replies = vec![session.welcome()];
        replies.extend(session.handle(ClientMessage::NewRound));
        self.sessions.insert(session_id, session);
        replies
    }

    pub fn close_session(&self, session_id: Uuid) {
        if let Some((_, session)) = self.sessions.remove(&session_id) {
            let score = session.session().score();
            info!(
                "Session {} closed with {}/{} correct",
                session_id, score.correct, score.answered
            );
        }
        self.senders.remove(&session_id);
    }

    /// Route a client message to its session
    pub fn dispatch(
        &self,
        session_id: Uuid,
        msg: ClientMessage,
    ) -> Result<Vec<ServerMessage>, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound)?;
        Ok(session.handle(msg))
    }

    /// Send a message to a specific session.
    pub fn send_to(&self, session_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&session_id) {
            let _ = sender.send(msg);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("mapquiz server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let session_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.senders.insert(session_id, tx);

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    for msg in state.open_session(session_id) {
        state.send_to(session_id, msg);
    }
    info!(
        "Session {} opened ({} active)",
        session_id,
        state.session_count()
    );

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(session_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {} ({})", session_id, text, e);
                    state.send_to(
                        session_id,
                        ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", session_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", session_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    state.close_session(session_id);
    send_task.abort();

    info!("Connection closed for {}", session_id);
    Ok(())
}

/// Handle a client message.
///
/// Starting a round samples synchronously while the session's map shard is
/// locked, for at most the sampler's trial cap. Must run on the multi-thread
/// runtime.
fn handle_message(session_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match tokio::task::block_in_place(|| state.dispatch(session_id, msg)) {
        Ok(replies) => {
            for reply in replies {
                state.send_to(session_id, reply);
            }
        }
        Err(e) => {
            warn!("Dropping message for {}: {}", session_id, e);
            state.send_to(
                session_id,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapquiz_core::{Polygon, Region};

    fn state() -> ServerState {
        let square = |x: f64| -> Polygon<f64> {
            Polygon::new(
                vec![(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0), (x, 0.0)].into(),
                vec![],
            )
        };
        let atlas = Atlas::new(vec![
            Region::new("Rondônia", "RO", square(0.0)),
            Region::new("Roraima", "RR", square(1.0)),
        ])
        .unwrap();
        ServerState::new(Arc::new(atlas), Sampler::with_trial_cap(10_000))
    }

    #[test]
    fn test_open_session_starts_a_round() {
        let state = state();
        let id = Uuid::new_v4();

        let replies = state.open_session(id);
        assert!(matches!(
            replies.as_slice(),
            [ServerMessage::Welcome { .. }, ServerMessage::RoundStarted { .. }]
        ));
        assert_eq!(state.session_count(), 1);
        assert!(state
            .sessions
            .get(&id)
            .unwrap()
            .session()
            .current_point()
            .is_some());
    }

    #[test]
    fn test_sessions_do_not_share_points() {
        let state = state();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        state.open_session(a);
        state.open_session(b);

        // Answering in one session leaves the other untouched
        state
            .dispatch(
                a,
                ClientMessage::Guess {
                    region: "Roraima".to_string(),
                },
            )
            .unwrap();

        let a_answered = state.sessions.get(&a).unwrap().session().outcome().is_some();
        let b_answered = state.sessions.get(&b).unwrap().session().outcome().is_some();
        assert!(a_answered);
        assert!(!b_answered);
    }

    #[test]
    fn test_dispatch_unknown_session() {
        let state = state();

        assert!(matches!(
            state.dispatch(Uuid::new_v4(), ClientMessage::Ping),
            Err(SessionError::SessionNotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_handle_message_replies_through_sender() {
        let state = Arc::new(state());
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        state.senders.insert(id, tx);
        state.open_session(id);

        handle_message(
            id,
            ClientMessage::Guess {
                region: "Rondônia".to_string(),
            },
            &state,
        );
        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::GuessResult { .. })
        ));

        handle_message(id, ClientMessage::PlayAgain, &state);
        assert!(matches!(rx.recv().await, Some(ServerMessage::RoundCleared)));
        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::RoundStarted { .. })
        ));
    }

    #[test]
    fn test_close_session() {
        let state = state();
        let id = Uuid::new_v4();
        state.open_session(id);

        state.close_session(id);
        assert_eq!(state.session_count(), 0);
    }
}
