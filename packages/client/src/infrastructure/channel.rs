//! WebSocket implementation of the live channel.
//!
//! Owns the duplex connection for the active room: performs the handshake,
//! registers the topic subscription, then splits into a writer task (fed by
//! an unbounded command channel) and a reader task (parsing inbound frames
//! into domain messages). Connection state is published through a
//! `tokio::sync::watch` channel so the UI can render a live indicator.
//!
//! The local participant's own sends are not fed back into the timeline
//! here; the server echo arriving over the subscription is the only
//! confirmed copy.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::domain::{ChannelError, ChatMessage, ConnectionState, Identity, RoomId, can_send};

use super::dto::{
    message::MessageBody,
    wire::{ClientFrame, SEND_DESTINATION, ServerFrame, topic_destination},
};

/// Transport configuration for the live channel
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Socket endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub socket_url: String,
    /// Optional auth token forwarded as a query parameter
    pub token: Option<String>,
}

/// Commands consumed by the writer task
enum Outbound {
    Frame(String),
    Close,
}

/// A live, subscribed duplex connection to the chat server.
pub struct LiveChannel {
    room_id: RoomId,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
    read_task: tokio::task::JoinHandle<()>,
    write_task: tokio::task::JoinHandle<()>,
}

impl LiveChannel {
    /// Establish the connection and register the room subscription.
    ///
    /// Publishes `Connecting` on entry and `Connected` once the server
    /// acknowledges the subscription. On error the caller owns the state
    /// transition to `Errored` (there is no channel to carry it).
    ///
    /// Returns the channel handle plus the receiver of inbound messages.
    /// Frames fanned out before the ack are buffered and delivered first.
    pub async fn connect(
        config: &ChannelConfig,
        room_id: RoomId,
        user: &Identity,
        state_tx: Arc<watch::Sender<ConnectionState>>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChatMessage>), ChannelError> {
        state_tx.send_replace(ConnectionState::Connecting);

        let url = socket_url_with_query(&config.socket_url, user, config.token.as_deref());
        let (ws_stream, _response) = connect_async(&url)
            .await
            .map_err(|e| ChannelError::Handshake(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        // Register the topic subscription for this room
        let subscribe = ClientFrame::Subscribe {
            destination: topic_destination(&room_id),
        };
        let json =
            serde_json::to_string(&subscribe).map_err(|e| ChannelError::Protocol(e.to_string()))?;
        write
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        // Await the subscription ack; fan-out may already be racing it
        let mut early_messages = Vec::new();
        loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(ServerFrame::Subscribed { destination }) => {
                            tracing::debug!("Subscription registered for {}", destination);
                            break;
                        }
                        Ok(ServerFrame::Message { message, .. }) => early_messages.push(message),
                        Ok(ServerFrame::Error { reason }) => {
                            return Err(ChannelError::Protocol(reason));
                        }
                        Err(e) => {
                            tracing::warn!("Dropping unparsable frame during subscribe: {}", e);
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ChannelError::Transport(
                        "connection closed before subscription ack".to_string(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ChannelError::Transport(e.to_string())),
            }
        }

        state_tx.send_replace(ConnectionState::Connected);
        tracing::info!("Live channel connected to room '{}'", room_id);

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        for body in early_messages {
            forward_inbound(&inbound_tx, body);
        }

        // Reader task: parse frames, forward messages, flag failures
        let read_state = state_tx.clone();
        let read_task = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(ServerFrame::Message { message, .. }) => {
                            if !forward_inbound(&inbound_tx, message) {
                                break;
                            }
                        }
                        Ok(ServerFrame::Subscribed { destination }) => {
                            tracing::debug!("Ignoring repeated ack for {}", destination);
                        }
                        Ok(ServerFrame::Error { reason }) => {
                            tracing::warn!("Server reported channel error: {}", reason);
                            mark_errored(&read_state);
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Dropping unparsable inbound frame: {}", e);
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the live channel");
                        mark_errored(&read_state);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Live channel read error: {}", e);
                        mark_errored(&read_state);
                        break;
                    }
                }
            }
        });

        // Writer task: drain outbound commands into the sink
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let write_state = state_tx.clone();
        let write_task = tokio::spawn(async move {
            while let Some(command) = outbound_rx.recv().await {
                match command {
                    Outbound::Frame(json) => {
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            tracing::warn!("Failed to send frame: {}", e);
                            mark_errored(&write_state);
                            break;
                        }
                    }
                    Outbound::Close => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                room_id,
                state_tx,
                outbound_tx,
                read_task,
                write_task,
            },
            inbound_rx,
        ))
    }

    /// The room this channel is subscribed to.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Publish a message to the send destination.
    ///
    /// Valid only while `Connected`; otherwise reports `NotConnected`
    /// without touching the transport.
    pub fn send(&self, message: ChatMessage) -> Result<(), ChannelError> {
        if !can_send(&self.state_tx.borrow()) {
            return Err(ChannelError::NotConnected);
        }

        let frame = ClientFrame::Send {
            destination: SEND_DESTINATION.to_string(),
            message: MessageBody::from(message),
        };
        let json =
            serde_json::to_string(&frame).map_err(|e| ChannelError::Protocol(e.to_string()))?;

        self.outbound_tx
            .send(Outbound::Frame(json))
            .map_err(|_| ChannelError::NotConnected)
    }

    /// Tear the channel down, actively closing the transport.
    ///
    /// Publishes `Disconnected` before the tasks wind down so the reader
    /// never reports the closing socket as an error.
    pub async fn close(self) {
        self.state_tx.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                false
            } else {
                *state = ConnectionState::Disconnected;
                true
            }
        });

        let _ = self.outbound_tx.send(Outbound::Close);
        self.read_task.abort();
        let _ = self.write_task.await;
        tracing::info!("Live channel for room '{}' closed", self.room_id);
    }
}

/// Transition to `Errored` unless the channel was already torn down.
fn mark_errored(state_tx: &watch::Sender<ConnectionState>) {
    state_tx.send_if_modified(|state| {
        if state.is_terminal() {
            false
        } else {
            *state = ConnectionState::Errored;
            true
        }
    });
}

/// Convert and forward one inbound body; malformed payloads are dropped.
/// Returns `false` when the receiving side is gone.
fn forward_inbound(inbound_tx: &mpsc::UnboundedSender<ChatMessage>, body: MessageBody) -> bool {
    match ChatMessage::try_from(body) {
        Ok(message) => inbound_tx.send(message).is_ok(),
        Err(e) => {
            tracing::warn!("Dropping malformed inbound message: {}", e);
            true
        }
    }
}

fn socket_url_with_query(base: &str, user: &Identity, token: Option<&str>) -> String {
    match token {
        Some(token) => format!("{}?user={}&token={}", base, user.as_str(), token),
        None => format!("{}?user={}", base, user.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_url_without_token() {
        // テスト項目: トークンなしの場合、user のみがクエリに付く
        // given (前提条件):
        let user = Identity::new("alice@example.com").unwrap();

        // when (操作):
        let url = socket_url_with_query("ws://127.0.0.1:8080/ws", &user, None);

        // then (期待する結果):
        assert_eq!(url, "ws://127.0.0.1:8080/ws?user=alice@example.com");
    }

    #[test]
    fn test_socket_url_with_token() {
        // テスト項目: トークンありの場合、token がクエリに付加される
        // given (前提条件):
        let user = Identity::new("alice@example.com").unwrap();

        // when (操作):
        let url = socket_url_with_query("ws://127.0.0.1:8080/ws", &user, Some("t-123"));

        // then (期待する結果):
        assert_eq!(
            url,
            "ws://127.0.0.1:8080/ws?user=alice@example.com&token=t-123"
        );
    }

    #[test]
    fn test_mark_errored_does_not_overwrite_teardown() {
        // テスト項目: 明示的な切断後にエラー遷移が上書きしない
        // given (前提条件):
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        // when (操作):
        mark_errored(&state_tx);

        // then (期待する結果):
        assert_eq!(*state_rx.borrow(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_mark_errored_from_connected() {
        // テスト項目: 接続中の障害は Errored に遷移する
        // given (前提条件):
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);

        // when (操作):
        mark_errored(&state_tx);

        // then (期待する結果):
        assert_eq!(*state_rx.borrow(), ConnectionState::Errored);
    }
}
