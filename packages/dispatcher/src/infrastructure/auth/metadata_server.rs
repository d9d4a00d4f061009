//! Access tokens from the instance metadata server.
//!
//! `GET {base}/computeMetadata/v1/instance/service-accounts/default/token`
//! with `Metadata-Flavor: Google`. Tokens are cached until shortly before
//! they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{AccessTokenProvider, TokenError};

pub const DEFAULT_METADATA_BASE_URL: &str = "http://metadata.google.internal";

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

pub struct MetadataServerAccessToken {
    client: reqwest::Client,
    token_url: String,
    // held across the fetch so concurrent callers wait for one refresh
    cache: Mutex<Option<CachedToken>>,
}

impl MetadataServerAccessToken {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            cache: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<TokenResponse, TokenError> {
        let response = self
            .client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| TokenError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TokenError::Status(response.status().as_u16()));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataServerAccessToken {
    async fn access_token(&self) -> Result<String, TokenError> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref()
            && Instant::now() < cached.refresh_at
        {
            return Ok(cached.token.clone());
        }

        let response = self.fetch().await?;
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        tracing::debug!(
            "Fetched access token from metadata server (expires in {}s)",
            response.expires_in
        );

        *cache = Some(CachedToken {
            token: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }
}
