//! UseCase 層
//!
//! 会話のライフサイクル（ルーム解決 → 履歴ハイドレーション → ライブ購読）の
//! オーケストレーションと、送信メッセージの組み立てを提供します。

mod composer;
mod conversation;

pub use composer::MessageComposer;
pub use conversation::{ChatSession, Conversation};
