//! Infrastructure layer
//!
//! ドメイン層のポートを外部サービス（FCM, Firestore）に接続する実装と、
//! ワイヤフォーマットの DTO を提供します。

pub mod auth;
pub mod dto;
pub mod push;
pub mod store;
