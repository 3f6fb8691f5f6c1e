//! Live channel connection lifecycle.
//!
//! This module contains the connection state machine and the pure guard
//! functions around it, kept free of transport concerns so they are easy to
//! test.

/// Lifecycle state of the live channel for the active room.
///
/// At most one non-terminal connection may exist per active room at any
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No room id yet, or prerequisites missing.
    Idle,
    /// Transport handshake and subscription registration in flight.
    Connecting,
    /// Subscription active; send and inbound delivery both enabled.
    Connected,
    /// Graceful teardown, or not yet attempted.
    Disconnected,
    /// Transport or protocol failure; terminal for this attempt.
    Errored,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Terminal states require a fresh activation to leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Errored)
    }
}

/// Whether a new connection attempt may start.
///
/// A new attempt is suppressed while a connection for the same room is
/// already in flight or established, so that rapid re-activation never
/// registers a duplicate subscription.
pub fn should_open_channel(state: &ConnectionState) -> bool {
    !matches!(
        state,
        ConnectionState::Connecting | ConnectionState::Connected
    )
}

/// Whether outbound sends are currently valid.
pub fn can_send(state: &ConnectionState) -> bool {
    state.is_connected()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_open_channel_from_idle() {
        // テスト項目: Idle 状態からは接続を開始できる
        // given (前提条件):
        let state = ConnectionState::Idle;

        // when (操作):
        let result = should_open_channel(&state);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_open_channel_suppressed_while_connecting() {
        // テスト項目: Connecting 中の再接続要求は抑止される
        // given (前提条件):
        let state = ConnectionState::Connecting;

        // when (操作):
        let result = should_open_channel(&state);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_open_channel_suppressed_while_connected() {
        // テスト項目: Connected 中の再接続要求は抑止される（購読の重複防止）
        // given (前提条件):
        let state = ConnectionState::Connected;

        // when (操作):
        let result = should_open_channel(&state);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_open_channel_after_error() {
        // テスト項目: Errored は試行ごとの終端であり、新しい接続は許可される
        // given (前提条件):
        let state = ConnectionState::Errored;

        // when (操作):
        let result = should_open_channel(&state);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_can_send_only_when_connected() {
        // テスト項目: 送信は Connected のときのみ許可される
        // given (前提条件):
        let states = [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Disconnected,
            ConnectionState::Errored,
        ];

        // when (操作):

        // then (期待する結果):
        assert!(can_send(&ConnectionState::Connected));
        for state in states {
            assert!(!can_send(&state), "send should be rejected in {state:?}");
        }
    }

    #[test]
    fn test_terminal_states() {
        // テスト項目: Disconnected と Errored のみが終端状態である
        // given (前提条件):

        // when (操作):

        // then (期待する結果):
        assert!(ConnectionState::Disconnected.is_terminal());
        assert!(ConnectionState::Errored.is_terminal());
        assert!(!ConnectionState::Idle.is_terminal());
        assert!(!ConnectionState::Connecting.is_terminal());
        assert!(!ConnectionState::Connected.is_terminal());
    }
}
