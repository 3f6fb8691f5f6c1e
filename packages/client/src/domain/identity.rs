//! Identity 値オブジェクト
//!
//! ユーザーを一意に識別する不透明な文字列（メールアドレス）。
//! 外部の認証コラボレーターから供給され、セッションの間は不変です。

use super::error::IdentityError;

/// ユーザーの識別子（メールアドレス）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// 新しい Identity を作成
    ///
    /// 前後の空白を除去した上で、空文字列と `@` を含まない値を拒否します。
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let value = raw.into().trim().to_string();
        if value.is_empty() {
            return Err(IdentityError::Empty);
        }
        if !value.contains('@') {
            return Err(IdentityError::NotAnEmail(value));
        }
        Ok(Self(value))
    }

    /// 会話の相手ペアを検証（両方が非空かつ相異なること）
    pub fn validate_pair(a: &Identity, b: &Identity) -> Result<(), IdentityError> {
        if a == b {
            return Err(IdentityError::SamePair);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
