//! Notification dispatcher service.
//!
//! Receives document-created events for the notifications collection,
//! delivers each notification via FCM and marks the document as sent.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsuchi-dispatcher -- --project-id my-project
//! cargo run --bin tsuchi-dispatcher -- --project-id my-project --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use tsuchi_dispatcher::{
    config::{Args, Config},
    infrastructure::{
        auth::{AccessTokenProvider, MetadataServerAccessToken, StaticAccessToken},
        push::FcmPushProvider,
        store::FirestoreNotificationStore,
    },
    ui::Server,
    usecase::DispatchNotificationUseCase,
};
use tsuchi_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], &args.log_level);

    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. HTTP client and access tokens
    // 2. PushProvider / NotificationStore
    // 3. UseCase
    // 4. Server

    // 1. One HTTP client and token source shared by every adapter
    let http_client = match reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let tokens: Arc<dyn AccessTokenProvider> = match &config.access_token {
        Some(token) => {
            tracing::info!("Using access token from configuration");
            Arc::new(StaticAccessToken::new(token.clone()))
        }
        None => {
            tracing::info!(
                "Using access tokens from metadata server at {}",
                config.metadata_base_url
            );
            Arc::new(MetadataServerAccessToken::new(
                http_client.clone(),
                &config.metadata_base_url,
            ))
        }
    };

    // 2. Create adapters
    let push_provider = Arc::new(FcmPushProvider::new(
        http_client.clone(),
        &config.fcm_base_url,
        &config.project_id,
        tokens.clone(),
    ));
    let store = Arc::new(FirestoreNotificationStore::new(
        http_client,
        &config.firestore_base_url,
        tokens,
    ));

    // 3. Create UseCase
    let dispatch_notification_usecase =
        Arc::new(DispatchNotificationUseCase::new(push_provider, store));

    // 4. Create and run the server
    let server = Server::new(dispatch_notification_usecase, config.collection);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
