//! Google API error envelope: `{"error": {"code", "message", "status"}}`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Best-effort human readable message from an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(response) if !response.error.message.is_empty() => {
            if response.error.status.is_empty() {
                response.error.message
            } else {
                format!("{}: {}", response.error.status, response.error.message)
            }
        }
        _ => body.trim().to_string(),
    }
}
