//! Message formatting utilities for client display.

use kaiwa_shared::time::to_clock_time;

use crate::domain::{ChatMessage, ConnectionState, FileEntry, Identity, MessageKind};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the hydrated timeline shown when a conversation opens.
    ///
    /// An empty timeline renders the "no messages yet" hint instead of a
    /// bare separator.
    pub fn format_timeline(messages: &[ChatMessage], current_user: &Identity) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");

        if messages.is_empty() {
            output.push_str("No messages yet. Say hello!\n");
        } else {
            for message in messages {
                output.push_str(&Self::format_message(message, current_user));
                output.push('\n');
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a single chat message line.
    ///
    /// The sender is shown as `you` for the current user; file-share
    /// messages carry a `[file ...]` marker with the storage path when one
    /// is known.
    pub fn format_message(message: &ChatMessage, current_user: &Identity) -> String {
        let who = if &message.sender == current_user {
            "you".to_string()
        } else {
            format!("@{}", message.sender)
        };

        let when = message
            .timestamp
            .as_deref()
            .map(to_clock_time)
            .unwrap_or_else(|| "--:--:--".to_string());

        match message.kind {
            MessageKind::Text => format!("[{}] {}: {}", when, who, message.content),
            MessageKind::File => {
                let marker = match message.file.as_ref() {
                    Some(file) if !file.storage_path.is_empty() => {
                        format!("[file {} @ {}]", file.file_name, file.storage_path)
                    }
                    Some(file) => format!("[file {}]", file.file_name),
                    None => format!("[file {}]", message.content),
                };
                format!("[{}] {}: {}", when, who, marker)
            }
        }
    }

    /// Format the persistent connection-state indicator.
    pub fn format_connection_state(state: &ConnectionState) -> String {
        let label = match state {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting...",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Errored => "disconnected (error)",
        };
        format!("\n*** {} ***\n", label)
    }

    /// Format the rejection notice for a send attempted while offline.
    pub fn format_send_rejected() -> String {
        "\n*** not connected: message not sent ***\n".to_string()
    }

    /// Format the `/files` listing from the file catalog.
    pub fn format_file_list(entries: &[FileEntry]) -> String {
        let mut output = String::new();
        output.push_str("\nYour files:\n");

        if entries.is_empty() {
            output.push_str("(no files uploaded yet)\n");
        } else {
            for entry in entries {
                output.push_str(&format!("  {} - {}", entry.id, entry.filename));
                if let Some(size) = entry.size {
                    output.push_str(&format!(" ({} bytes)", size));
                }
                output.push('\n');
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FileShare;

    fn alice() -> Identity {
        Identity::new("alice@example.com").unwrap()
    }

    fn bob() -> Identity {
        Identity::new("bob@example.com").unwrap()
    }

    #[test]
    fn test_format_timeline_with_no_messages() {
        // テスト項目: 空のタイムラインで「No messages yet」が表示される
        // given (前提条件):
        let messages = vec![];

        // when (操作):
        let result = MessageFormatter::format_timeline(&messages, &alice());

        // then (期待する結果):
        assert!(result.contains("No messages yet. Say hello!"));
    }

    #[test]
    fn test_format_message_marks_current_user_as_you() {
        // テスト項目: 自分が送ったメッセージは "you" と表示される
        // given (前提条件):
        let message =
            ChatMessage::text(alice(), bob(), "hi", Some("2023-01-01T09:30:15Z".into()));

        // when (操作):
        let result = MessageFormatter::format_message(&message, &alice());

        // then (期待する結果):
        assert!(result.contains("you: hi"));
        assert!(result.contains("09:30:15"));
    }

    #[test]
    fn test_format_message_shows_sender_for_partner() {
        // テスト項目: 相手のメッセージは @sender と表示される
        // given (前提条件):
        let message =
            ChatMessage::text(bob(), alice(), "yo", Some("2023-01-01T09:30:15Z".into()));

        // when (操作):
        let result = MessageFormatter::format_message(&message, &alice());

        // then (期待する結果):
        assert!(result.contains("@bob@example.com: yo"));
    }

    #[test]
    fn test_format_message_without_timestamp() {
        // テスト項目: timestamp が無いメッセージはプレースホルダー時刻で表示される
        // given (前提条件):
        let message = ChatMessage::text(bob(), alice(), "old", None);

        // when (操作):
        let result = MessageFormatter::format_message(&message, &alice());

        // then (期待する結果):
        assert!(result.contains("--:--:--"));
    }

    #[test]
    fn test_format_file_message_shows_marker() {
        // テスト項目: ファイル共有メッセージに [file ...] マーカーが付く
        // given (前提条件):
        let message = ChatMessage::file_share(
            alice(),
            bob(),
            FileShare {
                file_id: "f-1".into(),
                file_name: "report.pdf".into(),
                file_owner_id: "alice@example.com".into(),
                storage_path: "/files/f-1".into(),
            },
            Some("2023-01-01T09:30:15Z".into()),
        );

        // when (操作):
        let result = MessageFormatter::format_message(&message, &alice());

        // then (期待する結果):
        assert!(result.contains("[file report.pdf @ /files/f-1]"));
    }

    #[test]
    fn test_format_connection_state_indicator() {
        // テスト項目: 各接続状態に対応するインジケーターが表示される
        // given (前提条件):

        // when (操作):
        let connected = MessageFormatter::format_connection_state(&ConnectionState::Connected);
        let errored = MessageFormatter::format_connection_state(&ConnectionState::Errored);

        // then (期待する結果):
        assert!(connected.contains("connected"));
        assert!(errored.contains("disconnected (error)"));
    }

    #[test]
    fn test_format_file_list_with_entries() {
        // テスト項目: ファイル一覧に id とファイル名が表示される
        // given (前提条件):
        let entries = vec![FileEntry {
            id: "f-1".into(),
            filename: "report.pdf".into(),
            owner_id: "alice@example.com".into(),
            storage_path: None,
            size: Some(2048),
            content_type: None,
        }];

        // when (操作):
        let result = MessageFormatter::format_file_list(&entries);

        // then (期待する結果):
        assert!(result.contains("f-1 - report.pdf"));
        assert!(result.contains("2048 bytes"));
    }

    #[test]
    fn test_format_file_list_empty() {
        // テスト項目: ファイルが無い場合の案内が表示される
        // given (前提条件):
        let entries = vec![];

        // when (操作):
        let result = MessageFormatter::format_file_list(&entries);

        // then (期待する結果):
        assert!(result.contains("no files uploaded yet"));
    }
}
