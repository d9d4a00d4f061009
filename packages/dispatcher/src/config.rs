//! Command line / environment configuration.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::infrastructure::{
    auth::metadata_server::DEFAULT_METADATA_BASE_URL, push::fcm::DEFAULT_FCM_BASE_URL,
    store::firestore::DEFAULT_FIRESTORE_BASE_URL,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("project id must not be empty")]
    EmptyProjectId,

    #[error("collection id must not be empty or contain '/': '{0}'")]
    InvalidCollection(String),

    #[error("{name} must be an http(s) URL: '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    #[error("HTTP timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tsuchi-dispatcher")]
#[command(about = "Delivers newly created notification documents via FCM", long_about = None)]
pub struct Args {
    /// Host address to bind the trigger endpoint to
    #[arg(short = 'H', long, env = "TSUCHI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the trigger endpoint to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Google Cloud project that owns FCM and Firestore
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: String,

    /// Collection whose document creations are dispatched
    #[arg(long, env = "TSUCHI_COLLECTION", default_value = "notifications")]
    pub collection: String,

    /// Fixed OAuth2 access token; the metadata server is used when omitted
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "TSUCHI_FCM_BASE_URL", default_value = DEFAULT_FCM_BASE_URL)]
    pub fcm_base_url: String,

    #[arg(long, env = "TSUCHI_FIRESTORE_BASE_URL", default_value = DEFAULT_FIRESTORE_BASE_URL)]
    pub firestore_base_url: String,

    #[arg(long, env = "TSUCHI_METADATA_BASE_URL", default_value = DEFAULT_METADATA_BASE_URL)]
    pub metadata_base_url: String,

    /// Timeout for each outbound HTTP request, in seconds
    #[arg(long, env = "TSUCHI_HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "TSUCHI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub project_id: String,
    pub collection: String,
    pub access_token: Option<String>,
    pub fcm_base_url: String,
    pub firestore_base_url: String,
    pub metadata_base_url: String,
    pub http_timeout: Duration,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.project_id.trim().is_empty() {
            return Err(ConfigError::EmptyProjectId);
        }
        if args.collection.is_empty() || args.collection.contains('/') {
            return Err(ConfigError::InvalidCollection(args.collection));
        }
        if args.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            project_id: args.project_id.trim().to_string(),
            collection: args.collection,
            access_token: args.access_token.filter(|token| !token.is_empty()),
            fcm_base_url: validate_url("fcm base url", args.fcm_base_url)?,
            firestore_base_url: validate_url("firestore base url", args.firestore_base_url)?,
            metadata_base_url: validate_url("metadata base url", args.metadata_base_url)?,
            http_timeout: Duration::from_secs(args.http_timeout_secs),
        })
    }
}

fn validate_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    match reqwest::Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(ConfigError::InvalidUrl { name, value }),
    }
}
