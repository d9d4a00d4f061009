//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::DispatchNotificationUseCase;

use super::{
    handler::{health_check, notification_created},
    signal::shutdown_signal,
    state::AppState,
};

/// Trigger endpoint path for document-created events
pub const TRIGGER_PATH: &str = "/triggers/notifications";

/// Notification trigger server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(dispatch_notification_usecase, "notifications".to_string());
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// DispatchNotificationUseCase（通知配信のユースケース）
    dispatch_notification_usecase: Arc<DispatchNotificationUseCase>,
    /// Collection whose creations are dispatched
    collection: String,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `dispatch_notification_usecase` - UseCase for notification dispatch
    /// * `collection` - Collection ID whose document creations are dispatched
    pub fn new(
        dispatch_notification_usecase: Arc<DispatchNotificationUseCase>,
        collection: String,
    ) -> Self {
        Self {
            dispatch_notification_usecase,
            collection,
        }
    }

    /// Build the router without binding a listener.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            dispatch_notification_usecase: self.dispatch_notification_usecase.clone(),
            collection: self.collection.clone(),
        });

        Router::new()
            .route(TRIGGER_PATH, post(notification_created))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the trigger server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Notification trigger server listening on {}",
            listener.local_addr()?
        );
        tracing::info!(
            "Dispatching creations in '{}' posted to http://{}{}",
            self.collection,
            bind_addr,
            TRIGGER_PATH
        );

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
