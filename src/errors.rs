use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BSON: {0}")]
    Bson(#[from] bson::error::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid document ID: {0}")]
    InvalidDocumentId(String),

    #[error("Document not found: {0}")]
    NoSuchDocument(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid value for query key '{key}': '{value}' ({reason})")]
    InvalidQueryValue { key: String, value: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("store pool closed")]
    PoolClosed,
}

impl ForumError {
    pub(crate) fn invalid_value(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQueryValue { key: key.to_string(), value: value.to_string(), reason: reason.into() }
    }

    /// Status code used when the error crosses the request boundary.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::InvalidDocumentId(_) | Self::InvalidQueryValue { .. } | Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NoSuchDocument(_) => 404,
            _ => 500,
        }
    }

    /// Uniform `{ "error": ... }` body. Server-side failures do not leak details.
    #[must_use]
    pub fn to_response_body(&self) -> serde_json::Value {
        let msg = if self.status() == 500 {
            "Something went wrong on the server.".to_string()
        } else {
            self.to_string()
        };
        serde_json::json!({ "error": msg })
    }
}
