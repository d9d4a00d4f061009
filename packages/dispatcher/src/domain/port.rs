//! Port trait 定義
//!
//! ドメイン層が必要とする外部サービスへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{DocumentPath, PushError, PushMessage, RecordUpdate, StoreError};

/// Push-messaging provider (FCM など)
///
/// UseCase 層はこの trait に依存し、HTTP クライアントの具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// メッセージを送信し、プロバイダが採番したメッセージ ID を返す
    async fn send(&self, message: &PushMessage) -> Result<String, PushError>;
}

/// Notification document store
///
/// 通知レコードの部分更新のみを扱う。作成・削除は外部の責務。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// `path` のドキュメントに部分更新を適用する（全体の上書きではない）
    async fn update(&self, path: &DocumentPath, update: &RecordUpdate) -> Result<(), StoreError>;
}
