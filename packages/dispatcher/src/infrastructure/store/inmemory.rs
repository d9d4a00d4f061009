//! InMemory NotificationStore 実装
//!
//! ドメイン層が定義する NotificationStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DocumentPath, NotificationRecord, NotificationStore, RecordUpdate, StoreError};

/// インメモリ NotificationStore 実装
#[derive(Default)]
pub struct InMemoryNotificationStore {
    records: Mutex<HashMap<DocumentPath, NotificationRecord>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを作成（外部の書き込み元の代わり）
    pub async fn insert(&self, path: DocumentPath, record: NotificationRecord) {
        self.records.lock().await.insert(path, record);
    }

    pub async fn get(&self, path: &DocumentPath) -> Option<NotificationRecord> {
        self.records.lock().await.get(path).cloned()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn update(&self, path: &DocumentPath, update: &RecordUpdate) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        record.apply(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FcmToken;

    fn create_test_path(id: &str) -> DocumentPath {
        DocumentPath::new(format!(
            "projects/demo/databases/(default)/documents/notifications/{}",
            id
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_existing_record() {
        // テスト項目: 既存レコードの sent だけが更新される
        // given (前提条件):
        let store = InMemoryNotificationStore::new();
        let path = create_test_path("n1");
        let record = NotificationRecord {
            title: Some("Hi".to_string()),
            fcm_token: Some(FcmToken::new("abc").unwrap()),
            ..Default::default()
        };
        store.insert(path.clone(), record.clone()).await;

        // when (操作):
        let result = store.update(&path, &RecordUpdate::mark_sent()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        let stored = store.get(&path).await.unwrap();
        assert!(stored.sent);
        assert_eq!(stored.title, record.title);
        assert_eq!(stored.fcm_token, record.fcm_token);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        // テスト項目: 存在しないレコードの更新は NotFound
        // given (前提条件):
        let store = InMemoryNotificationStore::new();
        let path = create_test_path("missing");

        // when (操作):
        let result = store.update(&path, &RecordUpdate::mark_sent()).await;

        // then (期待する結果):
        assert_eq!(result, Err(StoreError::NotFound(path.to_string())));
        assert!(store.get(&path).await.is_none());
    }
}
