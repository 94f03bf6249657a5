use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ForumError;

pub type CollectionName = String;

/// Primary key of forum documents: a hyphenated v4 UUID stored as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validates an identifier coming from outside (path segment, request body).
    ///
    /// # Errors
    /// Returns `ForumError::InvalidDocumentId` if `raw` is not a UUID.
    pub fn parse(raw: &str) -> Result<Self, ForumError> {
        Uuid::parse_str(raw)
            .map(|u| Self(u.hyphenated().to_string()))
            .map_err(|_| ForumError::InvalidDocumentId(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DocumentId> for bson::Bson {
    fn from(id: DocumentId) -> Self {
        Self::String(id.0)
    }
}
