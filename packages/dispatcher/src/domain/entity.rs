//! Notification record entity.

use std::collections::BTreeMap;

use super::{FcmToken, Notification, PushError, PushMessage};

/// Delivery state derived from the `sent` flag.
///
/// `Pending → Delivered` is the only transition; failures are not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Pending,
    Delivered,
}

/// Notification document as stored in the `notifications` collection.
///
/// The record is owned by the document store; the dispatcher reads it once
/// and flips `sent` once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRecord {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Payload data; `None` when the field is absent
    pub data: Option<BTreeMap<String, String>>,
    /// `None` when the field is absent or empty
    pub fcm_token: Option<FcmToken>,
    /// Truthiness of the stored `sent` value
    pub sent: bool,
}

impl NotificationRecord {
    pub fn delivery_state(&self) -> DeliveryState {
        if self.sent {
            DeliveryState::Delivered
        } else {
            DeliveryState::Pending
        }
    }

    /// Build the outbound push message for this record.
    ///
    /// Fails with `PushError::MissingToken` when the record has no destination.
    pub fn to_push_message(&self) -> Result<PushMessage, PushError> {
        let token = self.fcm_token.clone().ok_or(PushError::MissingToken)?;

        Ok(PushMessage {
            notification: Notification {
                title: self.title.clone(),
                body: self.body.clone(),
            },
            data: self.data.clone().unwrap_or_default(),
            token,
        })
    }

    /// Apply a partial-field update in place.
    pub fn apply(&mut self, update: &RecordUpdate) {
        if let Some(sent) = update.sent {
            self.sent = sent;
        }
    }
}

/// Partial-field update of a notification record.
///
/// Only fields that are `Some` are written; everything else is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub sent: Option<bool>,
}

impl RecordUpdate {
    /// `{ sent: true }`
    pub fn mark_sent() -> Self {
        Self { sent: Some(true) }
    }

    /// Names of the fields this update touches, in stored-field naming.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.sent.is_some() {
            paths.push("sent");
        }
        paths
    }
}
