//! HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    domain::{DocumentPath, NotificationRecord},
    infrastructure::dto::firestore::DocumentEvent,
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Document-created trigger.
///
/// Answers 204 for every well-formed event, whatever happened during
/// dispatch: failures are logged and never reported back to the platform.
/// Only an unreadable body gets 400.
pub async fn notification_created(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DocumentEvent>, JsonRejection>,
) -> StatusCode {
    let Json(event) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected trigger payload: {}", rejection.body_text());
            return StatusCode::BAD_REQUEST;
        }
    };

    let span = tracing::info_span!(
        "trigger",
        invocation_id = %Uuid::new_v4(),
        document = %event.value.name
    );
    handle_event(&state, event).instrument(span).await;

    StatusCode::NO_CONTENT
}

async fn handle_event(state: &AppState, event: DocumentEvent) {
    if !event.is_create() {
        tracing::debug!("Ignoring non-create event");
        return;
    }

    let path = match DocumentPath::new(event.value.name.clone()) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Error reading notification: {}", e);
            return;
        }
    };

    // top-level documents only: `{collection}/{id}`, never a sub-collection
    if path.parent_collection_path() != state.collection {
        tracing::warn!(
            "Ignoring document outside '{}' collection: '{}'",
            state.collection,
            path
        );
        return;
    }

    let record = match NotificationRecord::try_from(&event.value) {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Error reading notification '{}': {}", path, e);
            return;
        }
    };

    // outcome is already logged by the usecase
    state
        .dispatch_notification_usecase
        .execute(&record, &path)
        .await;
}
