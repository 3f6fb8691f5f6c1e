//! 外部コラボレーターへの Gateway trait 定義
//!
//! ドメイン層が必要とする外部サービスアクセスのインターフェースを定義します。
//! 具体的な実装（HTTP 版）は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    error::{ArchiveError, CatalogError, DirectoryError},
    identity::Identity,
    message::{ChatMessage, FileEntry},
    room::Room,
};

/// ルームサービスへのインターフェース
///
/// 順序なしペア (a, b) に対して安定したルーム識別子を取得します。
/// 初回呼び出し時にはサービス側でルームが作成されることがあります。
/// 同じペアへの繰り返し呼び出しが同じルーム識別子を返すことはサービス側の
/// 契約であり、クライアントは消費するだけで強制しません。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// ペアに対応するルームを取得（存在しなければ作成）
    async fn resolve(&self, a: &Identity, b: &Identity) -> Result<Room, DirectoryError>;
}

/// 履歴サービスへのインターフェース
///
/// ルーム識別子ではなく Identity ペアをキーとして、整列済みのメッセージ
/// バックログを取得します。失敗は会話の開始を中断しません（履歴なしで
/// 開始する）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryArchive: Send + Sync {
    /// ペアの会話履歴を取得（空の場合あり）
    async fn load(&self, a: &Identity, b: &Identity) -> Result<Vec<ChatMessage>, ArchiveError>;
}

/// ファイル一覧サービスへのインターフェース（読み取り専用）
///
/// Composer がファイル共有メッセージの表示メタデータを解決するために
/// 使用します。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileCatalog: Send + Sync {
    /// 指定ユーザーがアップロードしたファイルの一覧を取得
    async fn my_files(&self, owner: &Identity) -> Result<Vec<FileEntry>, CatalogError>;
}
