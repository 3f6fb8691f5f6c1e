//! HTTP 実装の Gateway 群
//!
//! ドメイン層が定義する `RoomDirectory` / `HistoryArchive` / `FileCatalog`
//! trait の具体的な実装。単一の `reqwest::Client` を共有し、各サービスの
//! ネットワーク障害・非 2xx 応答を境界でレイヤー固有のエラーに変換します。

use async_trait::async_trait;

use crate::domain::{
    ArchiveError, CatalogError, ChatMessage, DirectoryError, FileCatalog, FileEntry,
    HistoryArchive, Identity, Room, RoomDirectory,
};

use super::dto::{
    http::{FileEntryDto, RoomDto},
    message::MessageBody,
};

/// ルームサービスの HTTP 実装（`GET {base}/room/{a}/{b}`）
pub struct HttpRoomDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoomDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RoomDirectory for HttpRoomDirectory {
    async fn resolve(&self, a: &Identity, b: &Identity) -> Result<Room, DirectoryError> {
        let url = format!("{}/room/{}/{}", self.base_url, a.as_str(), b.as_str());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status(status.as_u16()));
        }

        let dto: RoomDto = response
            .json()
            .await
            .map_err(|e| DirectoryError::Malformed(e.to_string()))?;

        let room = Room::try_from(dto).map_err(|e| DirectoryError::Malformed(e.to_string()))?;
        tracing::debug!("Resolved room '{}' for {} <-> {}", room.id, a, b);
        Ok(room)
    }
}

/// 履歴サービスの HTTP 実装（`GET {base}/history/{a}/{b}`）
pub struct HttpHistoryArchive {
    client: reqwest::Client,
    base_url: String,
}

impl HttpHistoryArchive {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl HistoryArchive for HttpHistoryArchive {
    async fn load(&self, a: &Identity, b: &Identity) -> Result<Vec<ChatMessage>, ArchiveError> {
        let url = format!("{}/history/{}/{}", self.base_url, a.as_str(), b.as_str());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArchiveError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status(status.as_u16()));
        }

        let rows: Vec<MessageBody> = response
            .json()
            .await
            .map_err(|e| ArchiveError::Malformed(e.to_string()))?;

        // 壊れた行は警告して読み飛ばす（履歴全体を失うよりはよい）
        let messages = rows
            .into_iter()
            .filter_map(|row| match ChatMessage::try_from(row) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    tracing::warn!("Skipping malformed history row: {}", e);
                    None
                }
            })
            .collect();

        Ok(messages)
    }
}

/// ファイル一覧サービスの HTTP 実装（`GET {base}/api/files/my-files/{ownerId}`）
pub struct HttpFileCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFileCatalog {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FileCatalog for HttpFileCatalog {
    async fn my_files(&self, owner: &Identity) -> Result<Vec<FileEntry>, CatalogError> {
        let url = format!("{}/api/files/my-files/{}", self.base_url, owner.as_str());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let rows: Vec<FileEntryDto> = response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;

        Ok(rows.into_iter().map(FileEntry::from).collect())
    }
}
