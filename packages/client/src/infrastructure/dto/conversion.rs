//! Conversion logic between DTOs and domain entities.
//!
//! Inbound conversions are fallible: a frame from the network must never
//! crash the session, so malformed payloads surface as [`InvalidPayload`]
//! and are dropped by the caller.

use thiserror::Error;

use crate::domain::{ChatMessage, FileEntry, FileShare, Identity, MessageKind, Room, RoomId};

use super::{
    http::{FileEntryDto, RoomDto},
    message::{MessageBody, WireMessageType},
};

/// A DTO that did not satisfy the domain invariants
#[derive(Debug, Error)]
#[error("invalid payload: {0}")]
pub struct InvalidPayload(pub String);

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<MessageBody> for ChatMessage {
    type Error = InvalidPayload;

    fn try_from(dto: MessageBody) -> Result<Self, Self::Error> {
        let sender =
            Identity::new(dto.sender).map_err(|e| InvalidPayload(format!("sender: {e}")))?;
        let receiver =
            Identity::new(dto.receiver).map_err(|e| InvalidPayload(format!("receiver: {e}")))?;

        match dto.message_type {
            WireMessageType::Text => Ok(ChatMessage::text(
                sender,
                receiver,
                dto.content,
                dto.timestamp,
            )),
            WireMessageType::File => {
                let file_id = dto
                    .file_id
                    .ok_or_else(|| InvalidPayload("file message without fileId".to_string()))?;
                let file = FileShare {
                    file_id,
                    file_name: dto.file_name.unwrap_or_else(|| dto.content.clone()),
                    file_owner_id: dto.file_owner_id.unwrap_or_default(),
                    storage_path: dto.storage_path.unwrap_or_default(),
                };
                Ok(ChatMessage::file_share(sender, receiver, file, dto.timestamp))
            }
        }
    }
}

impl TryFrom<RoomDto> for Room {
    type Error = InvalidPayload;

    fn try_from(dto: RoomDto) -> Result<Self, Self::Error> {
        Ok(Room {
            id: RoomId::new(dto.id).map_err(|e| InvalidPayload(e.to_string()))?,
            participant_a: Identity::new(dto.participant_a)
                .map_err(|e| InvalidPayload(format!("participantA: {e}")))?,
            participant_b: Identity::new(dto.participant_b)
                .map_err(|e| InvalidPayload(format!("participantB: {e}")))?,
        })
    }
}

impl From<FileEntryDto> for FileEntry {
    fn from(dto: FileEntryDto) -> Self {
        Self {
            id: dto.id,
            filename: dto.filename,
            owner_id: dto.owner_id,
            storage_path: dto.storage_path,
            size: dto.size,
            content_type: dto.content_type,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for MessageBody {
    fn from(model: ChatMessage) -> Self {
        let (message_type, file_id, file_name, file_owner_id, storage_path) = match model.kind {
            MessageKind::Text => (WireMessageType::Text, None, None, None, None),
            MessageKind::File => {
                let file = model.file.unwrap_or(FileShare {
                    file_id: String::new(),
                    file_name: model.content.clone(),
                    file_owner_id: String::new(),
                    storage_path: String::new(),
                });
                (
                    WireMessageType::File,
                    Some(file.file_id),
                    Some(file.file_name),
                    Some(file.file_owner_id),
                    Some(file.storage_path),
                )
            }
        };

        Self {
            sender: model.sender.into_string(),
            receiver: model.receiver.into_string(),
            content: model.content,
            timestamp: model.timestamp,
            message_type,
            file_id,
            file_name,
            file_owner_id,
            storage_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_body() -> MessageBody {
        MessageBody {
            sender: "alice@example.com".into(),
            receiver: "bob@example.com".into(),
            content: "hi".into(),
            timestamp: Some("2023-01-01T00:00:00Z".into()),
            message_type: WireMessageType::Text,
            file_id: None,
            file_name: None,
            file_owner_id: None,
            storage_path: None,
        }
    }

    #[test]
    fn test_text_body_to_domain() {
        // テスト項目: テキストの MessageBody がドメインエンティティに変換される
        // given (前提条件):
        let dto = text_body();

        // when (操作):
        let msg = ChatMessage::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(msg.sender.as_str(), "alice@example.com");
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.file.is_none());
    }

    #[test]
    fn test_body_with_invalid_sender_is_rejected() {
        // テスト項目: 不正な送信者を持つ MessageBody は変換エラーになる
        // given (前提条件):
        let mut dto = text_body();
        dto.sender = "".into();

        // when (操作):
        let result = ChatMessage::try_from(dto);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_file_body_without_file_id_is_rejected() {
        // テスト項目: fileId を欠く FILE メッセージは変換エラーになる
        // given (前提条件):
        let mut dto = text_body();
        dto.message_type = WireMessageType::File;

        // when (操作):
        let result = ChatMessage::try_from(dto);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_file_body_to_domain_with_fallback_name() {
        // テスト項目: fileName を欠く FILE メッセージは content をファイル名として使う
        // given (前提条件):
        let mut dto = text_body();
        dto.message_type = WireMessageType::File;
        dto.file_id = Some("f-1".into());
        dto.content = "report.pdf".into();

        // when (操作):
        let msg = ChatMessage::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(msg.file.as_ref().unwrap().file_name, "report.pdf");
    }

    #[test]
    fn test_domain_file_message_to_body() {
        // テスト項目: ドメインのファイル共有メッセージが DTO に変換される
        // given (前提条件):
        let msg = ChatMessage::file_share(
            Identity::new("alice@example.com").unwrap(),
            Identity::new("bob@example.com").unwrap(),
            FileShare {
                file_id: "f-1".into(),
                file_name: "report.pdf".into(),
                file_owner_id: "alice@example.com".into(),
                storage_path: "/files/f-1".into(),
            },
            Some("2023-01-01T00:00:00Z".into()),
        );

        // when (操作):
        let dto: MessageBody = msg.into();

        // then (期待する結果):
        assert_eq!(dto.message_type, WireMessageType::File);
        assert_eq!(dto.file_id.as_deref(), Some("f-1"));
        assert_eq!(dto.content, "report.pdf");
    }

    #[test]
    fn test_room_dto_to_domain() {
        // テスト項目: RoomDto がドメインの Room に変換される
        // given (前提条件):
        let dto = RoomDto {
            id: "room-1".into(),
            participant_a: "alice@example.com".into(),
            participant_b: "bob@example.com".into(),
        };

        // when (操作):
        let room = Room::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(room.id.as_str(), "room-1");
        assert_eq!(room.participant_a.as_str(), "alice@example.com");
    }

    #[test]
    fn test_domain_roundtrip_preserves_text_message() {
        // テスト項目: ドメイン → DTO → ドメインの往復で内容が保たれる
        // given (前提条件):
        let original = ChatMessage::text(
            Identity::new("alice@example.com").unwrap(),
            Identity::new("bob@example.com").unwrap(),
            "hi",
            Some("2023-01-01T00:00:00Z".into()),
        );

        // when (操作):
        let dto: MessageBody = original.clone().into();
        let roundtripped = ChatMessage::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(original, roundtripped);
    }
}
