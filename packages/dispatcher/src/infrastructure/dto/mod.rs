//! Data Transfer Objects (DTOs) for the external APIs.
//!
//! DTOs are organized by protocol:
//! - `firestore`: Firestore documents, typed values and trigger events
//! - `fcm`: FCM HTTP v1 send request/response
//! - `api_error`: Google API error envelope shared by both

pub mod api_error;
pub mod conversion;
pub mod fcm;
pub mod firestore;
