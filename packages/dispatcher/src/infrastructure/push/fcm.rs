//! FCM HTTP v1 を使った PushProvider 実装
//!
//! `POST {base}/v1/projects/{project_id}/messages:send`

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{PushError, PushMessage, PushProvider};
use crate::infrastructure::{
    auth::AccessTokenProvider,
    dto::{api_error::error_message, fcm},
};

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";

/// FCM HTTP v1 client
///
/// The `reqwest::Client` and token provider are created once at startup and
/// shared with the document store.
pub struct FcmPushProvider {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl FcmPushProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        project_id: &str,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/v1/projects/{}/messages:send",
                base_url.trim_end_matches('/'),
                project_id
            ),
            tokens,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| PushError::Auth(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&fcm::SendRequest::from(message))
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let sent = response
            .json::<fcm::SendResponse>()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;
        tracing::debug!("FCM accepted message '{}'", sent.name);

        Ok(sent.name)
    }
}
