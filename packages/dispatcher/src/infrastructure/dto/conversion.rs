//! Conversion logic between DTOs and domain entities.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{
    FcmToken, NotificationRecord, PushMessage, RecordError, RecordUpdate,
};
use crate::infrastructure::dto::{fcm, firestore as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<&dto::FirestoreDocument> for NotificationRecord {
    type Error = RecordError;

    fn try_from(document: &dto::FirestoreDocument) -> Result<Self, Self::Error> {
        let fields = &document.fields;

        let fcm_token = match optional_string(fields, "fcmToken")? {
            Some(token) if !token.is_empty() => Some(FcmToken::new(token)?),
            _ => None,
        };

        Ok(Self {
            title: optional_string(fields, "title")?,
            body: optional_string(fields, "body")?,
            data: data_map(fields)?,
            fcm_token,
            sent: fields.get("sent").is_some_and(dto::FirestoreValue::is_truthy),
        })
    }
}

/// Absent and `nullValue` fields read as `None`.
fn optional_string(
    fields: &HashMap<String, dto::FirestoreValue>,
    field: &'static str,
) -> Result<Option<String>, RecordError> {
    match fields.get(field) {
        None | Some(dto::FirestoreValue::NullValue(())) => Ok(None),
        Some(dto::FirestoreValue::StringValue(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordError::NonStringField { field }),
    }
}

/// Falsy or absent `data` reads as `None`; otherwise it must be a map of strings.
fn data_map(
    fields: &HashMap<String, dto::FirestoreValue>,
) -> Result<Option<BTreeMap<String, String>>, RecordError> {
    let value = match fields.get("data") {
        Some(value) if value.is_truthy() => value,
        _ => return Ok(None),
    };

    let dto::FirestoreValue::MapValue(map) = value else {
        return Err(RecordError::DataNotMap);
    };

    map.fields
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(s) => Ok((key.clone(), s.to_string())),
            None => Err(RecordError::NonStringData { key: key.clone() }),
        })
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Some)
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&PushMessage> for fcm::SendRequest {
    fn from(message: &PushMessage) -> Self {
        Self {
            message: fcm::FcmMessage {
                token: message.token.as_str().to_string(),
                notification: fcm::FcmNotification {
                    title: message.notification.title.clone(),
                    body: message.notification.body.clone(),
                },
                data: message.data.clone(),
            },
        }
    }
}

impl From<&RecordUpdate> for dto::DocumentPatch {
    fn from(update: &RecordUpdate) -> Self {
        let mut fields = HashMap::new();
        if let Some(sent) = update.sent {
            fields.insert("sent".to_string(), dto::FirestoreValue::BooleanValue(sent));
        }
        Self { fields }
    }
}
