//! ドメイン層
//!
//! 会話のライフサイクルを構成するエンティティ・値オブジェクト・純粋ロジックと、
//! 外部コラボレーター（ルームサービス・履歴サービス・ファイル一覧）への
//! インターフェースを定義します。具体的な実装は Infrastructure 層が提供します。

mod connection;
mod error;
mod gateway;
mod identity;
mod message;
mod room;
mod timeline;

pub use connection::{ConnectionState, can_send, should_open_channel};
pub use error::{
    ArchiveError, CatalogError, ChannelError, ConversationError, DirectoryError, IdentityError,
};
pub use gateway::{FileCatalog, HistoryArchive, RoomDirectory};
pub use identity::Identity;
pub use message::{ChatMessage, DedupKey, FileEntry, FileShare, MessageKind};
pub use room::{Room, RoomId};
pub use timeline::Timeline;

#[cfg(test)]
pub use gateway::{MockFileCatalog, MockHistoryArchive, MockRoomDirectory};
