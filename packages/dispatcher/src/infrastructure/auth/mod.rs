//! OAuth2 access tokens for Google APIs.
//!
//! ## 実装
//!
//! - `static_token`: 設定で与えられた固定トークン
//! - `metadata_server`: GCE / Cloud Run のメタデータサーバーから取得しキャッシュ

pub mod metadata_server;
pub mod static_token;

use async_trait::async_trait;
use thiserror::Error;

pub use metadata_server::MetadataServerAccessToken;
pub use static_token::StaticAccessToken;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Request(String),

    #[error("token endpoint returned HTTP {0}")]
    Status(u16),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// Source of bearer tokens shared by the FCM and Firestore clients.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, TokenError>;
}
