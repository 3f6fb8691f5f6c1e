//! Room エンティティ
//!
//! 二者間の会話に対してサーバーが払い出す永続的な識別子。
//! Room の作成・重複排除はルームサービス側の責務であり、クライアントは
//! 返された識別子をアクティブな会話のためにキャッシュするだけです。

use super::{error::DirectoryError, identity::Identity};

/// ルームサービスが払い出す不透明なトークン
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// 新しい RoomId を作成（空のトークンは拒否）
    pub fn new(raw: impl Into<String>) -> Result<Self, DirectoryError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(DirectoryError::Malformed("empty room id".to_string()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解決済みのルーム（識別子と参加者ペア）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub participant_a: Identity,
    pub participant_b: Identity,
}

impl Room {
    /// 指定した Identity がこのルームの参加者かどうか
    pub fn has_participant(&self, identity: &Identity) -> bool {
        &self.participant_a == identity || &self.participant_b == identity
    }
}
