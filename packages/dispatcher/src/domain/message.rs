//! Outbound push message.

use std::collections::BTreeMap;

use super::FcmToken;

/// Visible part of a push notification.
///
/// Title and body are copied verbatim from the record, including absence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Message handed to the push provider: `{ notification, data, token }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub notification: Notification,
    pub data: BTreeMap<String, String>,
    pub token: FcmToken,
}
