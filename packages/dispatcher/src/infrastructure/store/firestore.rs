//! Firestore REST を使った NotificationStore 実装
//!
//! `PATCH {base}/v1/{document}?updateMask.fieldPaths=...&currentDocument.exists=true`
//!
//! The update mask limits the write to the given fields and the precondition
//! makes the call fail instead of creating a missing document.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::domain::{DocumentPath, NotificationStore, RecordUpdate, StoreError};
use crate::infrastructure::{
    auth::AccessTokenProvider,
    dto::{api_error::error_message, firestore::DocumentPatch},
};

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

pub struct FirestoreNotificationStore {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl FirestoreNotificationStore {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// `{base}/v1/{document}` with every path segment percent-encoded, so an
    /// ID containing `?`, `#` or `%` stays part of the path.
    fn document_url(&self, path: &DocumentPath) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| StoreError::Transport(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v1"].into_iter().chain(path.as_str().split('/')));
        Ok(url)
    }
}

/// Query parameters for a masked update of an existing document.
fn update_query(update: &RecordUpdate) -> Vec<(&'static str, &'static str)> {
    let mut query: Vec<_> = update
        .field_paths()
        .into_iter()
        .map(|field| ("updateMask.fieldPaths", field))
        .collect();
    query.push(("currentDocument.exists", "true"));
    query
}

#[async_trait]
impl NotificationStore for FirestoreNotificationStore {
    async fn update(&self, path: &DocumentPath, update: &RecordUpdate) -> Result<(), StoreError> {
        if update.field_paths().is_empty() {
            return Ok(());
        }

        let url = self.document_url(path)?;
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let response = self
            .client
            .patch(url)
            .bearer_auth(token)
            .query(&update_query(update))
            .json(&DocumentPatch::from(update))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!("Updated document '{}' ({:?})", path, update.field_paths());
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Rejected {
                    status: status.as_u16(),
                    message: error_message(&body),
                })
            }
        }
    }
}
