//! Conversation lifecycle orchestration.
//!
//! One `Conversation` instance per (self, partner) pair. Activation resolves
//! the room (fatal on failure), then hydrates history and establishes the
//! live channel concurrently; hydration is applied strictly before any live
//! frame. Every async result application is gated on the activation
//! generation observed when the request started, so a late response from a
//! previous partner can never clobber the current timeline.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::domain::{
    ChannelError, ChatMessage, ConnectionState, ConversationError, FileEntry, HistoryArchive,
    Identity, Room, RoomDirectory, Timeline, can_send, should_open_channel,
};
use crate::infrastructure::channel::{ChannelConfig, LiveChannel};

use super::composer::MessageComposer;

/// Generation-gated state of one conversation activation.
///
/// All mutation goes through `apply_*` methods that take the activation
/// generation observed at request time; a mismatch means the result is
/// stale and is discarded.
pub struct ChatSession {
    generation: u64,
    partner: Option<Identity>,
    room: Option<Room>,
    timeline: Timeline,
    hydrated: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            generation: 0,
            partner: None,
            room: None,
            timeline: Timeline::new(),
            hydrated: false,
        }
    }

    /// Start a new activation for a partner, superseding any previous one.
    pub fn activate(&mut self, partner: Identity) -> u64 {
        self.generation += 1;
        self.partner = Some(partner);
        self.room = None;
        self.timeline = Timeline::new();
        self.hydrated = false;
        self.generation
    }

    /// Close the current activation (view teardown, logout).
    pub fn deactivate(&mut self) -> u64 {
        self.generation += 1;
        self.partner = None;
        self.room = None;
        self.timeline = Timeline::new();
        self.hydrated = false;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn partner(&self) -> Option<&Identity> {
        self.partner.as_ref()
    }

    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Record the resolved room for this activation.
    pub fn apply_room(&mut self, generation: u64, room: Room) -> bool {
        if !self.is_current(generation) {
            tracing::debug!("Discarding stale room resolution for '{}'", room.id);
            return false;
        }
        self.room = Some(room);
        true
    }

    /// Replace the timeline with the hydrated history batch.
    ///
    /// Applied at most once per activation; a second call (or a stale one)
    /// is discarded.
    pub fn apply_hydration(&mut self, generation: u64, batch: Vec<ChatMessage>) -> bool {
        if !self.is_current(generation) {
            tracing::debug!("Discarding stale history batch ({} rows)", batch.len());
            return false;
        }
        if self.hydrated {
            tracing::debug!("Ignoring repeated hydration for this activation");
            return false;
        }
        self.timeline.replace_all(batch);
        self.hydrated = true;
        true
    }

    /// Append one live message. Returns `false` for stale or duplicate
    /// deliveries.
    pub fn apply_live(&mut self, generation: u64, message: ChatMessage) -> bool {
        if !self.is_current(generation) {
            tracing::debug!("Discarding stale live message from '{}'", message.sender);
            return false;
        }
        self.timeline.append(message)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// An open two-party conversation: cached room, timeline and live channel.
pub struct Conversation {
    self_id: Identity,
    directory: Arc<dyn RoomDirectory>,
    archive: Arc<dyn HistoryArchive>,
    channel_config: ChannelConfig,
    composer: MessageComposer,
    session: ChatSession,
    channel: Option<LiveChannel>,
    inbound_rx: Option<mpsc::UnboundedReceiver<ChatMessage>>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl Conversation {
    pub fn new(
        self_id: Identity,
        directory: Arc<dyn RoomDirectory>,
        archive: Arc<dyn HistoryArchive>,
        channel_config: ChannelConfig,
        composer: MessageComposer,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        Self {
            self_id,
            directory,
            archive,
            channel_config,
            composer,
            session: ChatSession::new(),
            channel: None,
            inbound_rx: None,
            state_tx: Arc::new(state_tx),
            state_rx,
        }
    }

    pub fn self_id(&self) -> &Identity {
        &self.self_id
    }

    pub fn partner(&self) -> Option<&Identity> {
        self.session.partner()
    }

    pub fn room(&self) -> Option<&Room> {
        self.session.room()
    }

    pub fn timeline(&self) -> &Timeline {
        self.session.timeline()
    }

    pub fn generation(&self) -> u64 {
        self.session.generation()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Watch handle for rendering the connection indicator.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Receiver of live inbound messages for the current activation.
    pub fn take_inbound(&mut self) -> Option<mpsc::UnboundedReceiver<ChatMessage>> {
        self.inbound_rx.take()
    }

    /// Open (activate) the conversation with a partner.
    ///
    /// Repeated activation for the same partner while the channel is
    /// already connecting or connected is suppressed and returns the
    /// current generation, so no duplicate subscription can be registered.
    ///
    /// Room resolution failure is fatal; history and channel failures
    /// degrade the conversation (empty timeline, `Errored` indicator)
    /// without aborting it.
    pub async fn open(&mut self, partner: Identity) -> Result<u64, ConversationError> {
        Identity::validate_pair(&self.self_id, &partner)?;

        if self.session.partner() == Some(&partner)
            && !should_open_channel(&self.state_rx.borrow())
        {
            tracing::debug!(
                "Activation for '{}' suppressed; channel already {:?}",
                partner,
                self.connection_state()
            );
            return Ok(self.session.generation());
        }

        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
        self.inbound_rx = None;
        let generation = self.session.activate(partner.clone());
        self.state_tx.send_replace(ConnectionState::Idle);

        let room = self
            .directory
            .resolve(&self.self_id, &partner)
            .await
            .map_err(ConversationError::RoomUnavailable)?;
        let room_id = room.id.clone();
        if !self.session.apply_room(generation, room) {
            return Ok(generation);
        }

        // Hydrate and connect concurrently; inbound frames buffer in the
        // channel until the history batch has been applied.
        let hydrate = self.archive.load(&self.self_id, &partner);
        let connect = LiveChannel::connect(
            &self.channel_config,
            room_id,
            &self.self_id,
            self.state_tx.clone(),
        );
        let (history, connected) = tokio::join!(hydrate, connect);

        match history {
            Ok(batch) => {
                self.session.apply_hydration(generation, batch);
            }
            Err(e) => {
                tracing::warn!("History unavailable, starting empty: {}", e);
                self.session.apply_hydration(generation, Vec::new());
            }
        }

        match connected {
            Ok((channel, inbound_rx)) => {
                self.channel = Some(channel);
                self.inbound_rx = Some(inbound_rx);
            }
            Err(e) => {
                tracing::warn!("Live channel unavailable: {}", e);
                self.state_tx.send_replace(ConnectionState::Errored);
            }
        }

        Ok(generation)
    }

    /// Apply one live inbound message to the timeline.
    pub fn apply_live(&mut self, generation: u64, message: ChatMessage) -> bool {
        self.session.apply_live(generation, message)
    }

    /// The user-triggered send action.
    ///
    /// Returns `Ok(true)` when a message was handed to the channel,
    /// `Ok(false)` when nothing was composed (empty input), and
    /// `Err(NotConnected)` while the channel is not ready. The sent message
    /// is not inserted locally; it joins the timeline when the server echo
    /// arrives over the subscription.
    pub fn send_action(
        &self,
        typed_text: &str,
        selected_file: Option<&str>,
        catalog: &[FileEntry],
    ) -> Result<bool, ChannelError> {
        let state = self.connection_state();
        if !can_send(&state) {
            return Err(ChannelError::NotConnected);
        }

        let Some(message) = self.composer.compose_outgoing(
            &self.self_id,
            self.session.partner(),
            &state,
            typed_text,
            selected_file,
            catalog,
        ) else {
            return Ok(false);
        };

        let Some(channel) = &self.channel else {
            return Err(ChannelError::NotConnected);
        };
        channel.send(message)?;
        Ok(true)
    }

    /// Tear the conversation down, actively closing the live channel.
    pub async fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
        self.inbound_rx = None;
        self.session.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ArchiveError, DirectoryError, MockHistoryArchive, MockRoomDirectory, RoomId,
    };
    use kaiwa_shared::time::FixedClock;

    fn alice() -> Identity {
        Identity::new("alice@example.com").unwrap()
    }

    fn bob() -> Identity {
        Identity::new("bob@example.com").unwrap()
    }

    fn room() -> Room {
        Room {
            id: RoomId::new("room-1").unwrap(),
            participant_a: alice(),
            participant_b: bob(),
        }
    }

    fn msg(content: &str, ts: &str) -> ChatMessage {
        ChatMessage::text(bob(), alice(), content, Some(ts.to_string()))
    }

    /// Channel config pointing at a port nothing listens on, so connect
    /// attempts fail fast.
    fn unreachable_channel() -> ChannelConfig {
        ChannelConfig {
            socket_url: "ws://127.0.0.1:1/ws".to_string(),
            token: None,
        }
    }

    fn composer() -> MessageComposer {
        MessageComposer::new(Arc::new(FixedClock::new("2023-01-01T00:00:00.000Z")))
    }

    fn conversation(
        directory: MockRoomDirectory,
        archive: MockHistoryArchive,
    ) -> Conversation {
        Conversation::new(
            alice(),
            Arc::new(directory),
            Arc::new(archive),
            unreachable_channel(),
            composer(),
        )
    }

    // ========================================
    // ChatSession（世代ゲートの純粋ロジック）
    // ========================================

    #[test]
    fn test_stale_hydration_is_discarded() {
        // テスト項目: 前のアクティベーションの履歴応答は適用されない
        // given (前提条件):
        let mut session = ChatSession::new();
        let old_generation = session.activate(bob());
        let _new_generation = session.activate(Identity::new("carol@example.com").unwrap());

        // when (操作): 古い世代の履歴が遅れて届く
        let applied = session.apply_hydration(old_generation, vec![msg("old", "t1")]);

        // then (期待する結果):
        assert!(!applied);
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn test_hydration_applies_at_most_once() {
        // テスト項目: 同一アクティベーションへの二度目のハイドレーションは無視される
        // given (前提条件):
        let mut session = ChatSession::new();
        let generation = session.activate(bob());
        session.apply_hydration(generation, vec![msg("first", "t1")]);

        // when (操作):
        let applied = session.apply_hydration(generation, vec![msg("second", "t2")]);

        // then (期待する結果):
        assert!(!applied);
        assert_eq!(session.timeline().len(), 1);
        assert_eq!(session.timeline().messages()[0].content, "first");
    }

    #[test]
    fn test_stale_live_message_is_discarded() {
        // テスト項目: 前のアクティベーション宛のライブメッセージは破棄される
        // given (前提条件):
        let mut session = ChatSession::new();
        let old_generation = session.activate(bob());
        session.activate(Identity::new("carol@example.com").unwrap());

        // when (操作):
        let applied = session.apply_live(old_generation, msg("late", "t1"));

        // then (期待する結果):
        assert!(!applied);
        assert!(session.timeline().is_empty());
    }

    #[test]
    fn test_live_append_after_hydration_keeps_order() {
        // テスト項目: ハイドレーション後のライブ追加は履歴の直後に並ぶ
        // given (前提条件):
        let mut session = ChatSession::new();
        let generation = session.activate(bob());
        session.apply_hydration(generation, vec![msg("h1", "t1"), msg("h2", "t2")]);

        // when (操作):
        session.apply_live(generation, msg("m1", "t3"));
        session.apply_live(generation, msg("m2", "t4"));

        // then (期待する結果):
        let contents: Vec<&str> = session
            .timeline()
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["h1", "h2", "m1", "m2"]);
    }

    #[test]
    fn test_echo_duplicate_is_not_rendered_twice() {
        // テスト項目: サーバーの再配信（同一トリプル）は二度描画されない
        // given (前提条件):
        let mut session = ChatSession::new();
        let generation = session.activate(bob());
        session.apply_live(generation, msg("hi", "t1"));

        // when (操作):
        let applied = session.apply_live(generation, msg("hi", "t1"));

        // then (期待する結果):
        assert!(!applied);
        assert_eq!(session.timeline().len(), 1);
    }

    // ========================================
    // Conversation（オーケストレーション）
    // ========================================

    #[tokio::test]
    async fn test_open_rejects_identical_pair() {
        // テスト項目: 自分自身との会話は開始できない
        // given (前提条件):
        let directory = MockRoomDirectory::new();
        let archive = MockHistoryArchive::new();
        let mut conversation = conversation(directory, archive);

        // when (操作):
        let result = conversation.open(alice()).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ConversationError::InvalidIdentity(_))
        ));
    }

    #[tokio::test]
    async fn test_open_fails_when_room_unavailable() {
        // テスト項目: ルーム解決の失敗は会話の開始を中断する
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_resolve()
            .returning(|_, _| Err(DirectoryError::Status(500)));
        // 履歴は呼ばれないはず
        let mut archive = MockHistoryArchive::new();
        archive.expect_load().never();
        let mut conversation = conversation(directory, archive);

        // when (操作):
        let result = conversation.open(bob()).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ConversationError::RoomUnavailable(_))
        ));
        assert!(conversation.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_open_with_history_but_unreachable_channel() {
        // テスト項目: チャネル接続失敗でも会話は開き、Errored と送信拒否になる
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_resolve().returning(|_, _| Ok(room()));
        let mut archive = MockHistoryArchive::new();
        archive
            .expect_load()
            .returning(|_, _| Ok(vec![msg("hello", "t1")]));
        let mut conversation = conversation(directory, archive);

        // when (操作):
        let generation = conversation.open(bob()).await.unwrap();

        // then (期待する結果): 履歴は適用され、チャネルは Errored
        assert_eq!(conversation.timeline().len(), 1);
        assert_eq!(conversation.connection_state(), ConnectionState::Errored);
        assert_eq!(conversation.generation(), generation);
        assert_eq!(
            conversation.room().map(|r| r.id.as_str()),
            Some("room-1")
        );

        // 送信は NotConnected として拒否される
        let send_result = conversation.send_action("hi", None, &[]);
        assert!(matches!(send_result, Err(ChannelError::NotConnected)));
    }

    #[tokio::test]
    async fn test_open_degrades_to_empty_timeline_without_history() {
        // テスト項目: 履歴サービスの障害は致命的でなく、空のタイムラインで開く
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_resolve().returning(|_, _| Ok(room()));
        let mut archive = MockHistoryArchive::new();
        archive
            .expect_load()
            .returning(|_, _| Err(ArchiveError::Status(503)));
        let mut conversation = conversation(directory, archive);

        // when (操作):
        let result = conversation.open(bob()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(conversation.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_switching_partner_resets_timeline() {
        // テスト項目: 相手の切り替えで前の会話のタイムラインが残らない
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_resolve().returning(|_, _| Ok(room()));
        let mut archive = MockHistoryArchive::new();
        archive
            .expect_load()
            .returning(|_, _| Ok(vec![msg("with bob", "t1")]));
        let mut conversation = conversation(directory, archive);
        let first_generation = conversation.open(bob()).await.unwrap();
        assert_eq!(conversation.timeline().len(), 1);

        // when (操作): carol に切り替え（履歴 1 件は新しい相手のもの）
        let second_generation = conversation
            .open(Identity::new("carol@example.com").unwrap())
            .await
            .unwrap();

        // then (期待する結果): 世代が進み、古い世代の適用は拒否される
        assert!(second_generation > first_generation);
        let stale_applied = conversation.apply_live(first_generation, msg("late", "t9"));
        assert!(!stale_applied);
    }

    #[tokio::test]
    async fn test_send_action_without_activation() {
        // テスト項目: アクティベーション前の送信は NotConnected になる
        // given (前提条件):
        let directory = MockRoomDirectory::new();
        let archive = MockHistoryArchive::new();
        let conversation = conversation(directory, archive);

        // when (操作):
        let result = conversation.send_action("hi", None, &[]);

        // then (期待する結果):
        assert!(matches!(result, Err(ChannelError::NotConnected)));
    }
}
