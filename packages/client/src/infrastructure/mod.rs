//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェースの具体的な実装を提供します：
//! REST ゲートウェイ（reqwest）、ライブチャネル（WebSocket）、
//! ワイヤ DTO、セッション永続化。

pub mod channel;
pub mod dto;
pub mod rest;
pub mod session_store;
