//! Value objects.

use std::fmt;

use super::RecordError;

/// Full resource name of a stored document, used as the handle for updates.
///
/// Format: `projects/{project}/databases/{database}/documents/{collection}/{id}[/{collection}/{id}...]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Parse and validate a document resource name.
    pub fn new(name: impl Into<String>) -> Result<Self, RecordError> {
        let name = name.into();
        let segments: Vec<&str> = name.split('/').collect();

        // projects/{p}/databases/{d}/documents + at least one {collection}/{id} pair
        let valid = segments.len() >= 7
            && segments[0] == "projects"
            && segments[2] == "databases"
            && segments[4] == "documents"
            && (segments.len() - 5) % 2 == 0
            && segments.iter().all(|s| !s.is_empty());

        if valid {
            Ok(Self(name))
        } else {
            Err(RecordError::InvalidDocumentPath(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the collection directly containing the document, relative to
    /// the database root: `notifications` for a top-level document,
    /// `users/u1/notifications` for one in a sub-collection.
    pub fn parent_collection_path(&self) -> &str {
        let relative = self.0.splitn(6, '/').nth(5).unwrap_or_default();
        relative
            .rsplit_once('/')
            .map_or(relative, |(parent, _)| parent)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// FCM registration token of the destination device.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FcmToken(String);

impl FcmToken {
    pub fn new(token: impl Into<String>) -> Result<Self, RecordError> {
        let token = token.into();
        if token.is_empty() {
            return Err(RecordError::EmptyToken);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

// Registration tokens are credentials for a device, keep them out of logs.
impl fmt::Debug for FcmToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "FcmToken({}...)", prefix)
    }
}
