//! UseCase: 通知配信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DispatchNotificationUseCase::execute() メソッド
//! - 送信済みチェック → メッセージ構築 → 送信 → `sent` フラグ更新
//!
//! ### なぜこのテストが必要か
//! - 送信済みレコードに対して副作用が発生しないことを保証
//! - 送信失敗時に `sent` が更新されないことを保証
//! - どの失敗も呼び出し元にエラーとして伝播しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信と `sent` 更新
//! - 異常系：トークンなし、プロバイダ拒否、ストア更新失敗
//! - エッジケース：同一レコードへの重複トリガー（競合は許容される）

use std::sync::Arc;

use crate::domain::{
    DeliveryState, DocumentPath, NotificationRecord, NotificationStore, PushError, PushProvider,
    RecordUpdate, StoreError,
};

/// Result of one dispatch.
///
/// Failures are reported here instead of as `Err`: the trigger contract is
/// fire-and-forget, so nothing escapes to the invoking host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// `sent` was already truthy; nothing was done
    AlreadySent,
    /// Message delivered and record flagged as sent
    Delivered { message_id: String },
    /// Message was not delivered; record untouched
    SendFailed(PushError),
    /// Message delivered but the `sent` flag could not be written
    UpdateFailed {
        message_id: String,
        error: StoreError,
    },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// 通知配信のユースケース
pub struct DispatchNotificationUseCase {
    /// PushProvider（プッシュ通知送信の抽象化）
    push_provider: Arc<dyn PushProvider>,
    /// NotificationStore（通知レコード更新の抽象化）
    store: Arc<dyn NotificationStore>,
}

impl DispatchNotificationUseCase {
    /// 新しい DispatchNotificationUseCase を作成
    pub fn new(push_provider: Arc<dyn PushProvider>, store: Arc<dyn NotificationStore>) -> Self {
        Self {
            push_provider,
            store,
        }
    }

    /// 通知配信を実行
    ///
    /// # Arguments
    ///
    /// * `record` - トリガー時点の通知レコード
    /// * `path` - 更新に使うレコードの格納場所
    ///
    /// # Returns
    ///
    /// 実行結果。失敗もここで表現され、ログ出力済み。
    ///
    /// The `sent` check is read-then-act: two concurrent invocations for the
    /// same record can both pass it and both send.
    pub async fn execute(
        &self,
        record: &NotificationRecord,
        path: &DocumentPath,
    ) -> DispatchOutcome {
        // 1. 送信済みなら何もしない
        if record.delivery_state() == DeliveryState::Delivered {
            tracing::debug!("Notification '{}' already sent, skipping", path);
            return DispatchOutcome::AlreadySent;
        }

        // 2. メッセージ構築 → 送信
        let message_id = match self.send(record).await {
            Ok(message_id) => message_id,
            Err(e) => {
                tracing::error!("Error sending notification '{}': {}", path, e);
                return DispatchOutcome::SendFailed(e);
            }
        };

        // 3. sent フラグを部分更新
        if let Err(e) = self.store.update(path, &RecordUpdate::mark_sent()).await {
            tracing::error!(
                "Notification '{}' sent as '{}' but marking it as sent failed: {}",
                path,
                message_id,
                e
            );
            return DispatchOutcome::UpdateFailed {
                message_id,
                error: e,
            };
        }

        tracing::info!("Notification '{}' sent successfully ({})", path, message_id);
        tracing::debug!(
            "Notification '{}': {:?} -> {:?}",
            path,
            DeliveryState::Pending,
            DeliveryState::Delivered
        );
        DispatchOutcome::Delivered { message_id }
    }

    async fn send(&self, record: &NotificationRecord) -> Result<String, PushError> {
        let message = record.to_push_message()?;
        self.push_provider.send(&message).await
    }
}
