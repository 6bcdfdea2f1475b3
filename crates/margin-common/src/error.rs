//! Error types for margin - shared across the store, renderer, and editor.

use miette::Diagnostic;

use crate::store::RecordKind;

/// Main error type for margin operations.
///
/// Highlight-domain conditions that resolve to a silent skip (stale span
/// bounds, a preview match miss) are deliberately *not* represented here;
/// they are normal control flow, not failures.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MarginError {
    /// A record was requested that the store does not hold.
    #[error("record not found: {kind}/{id}")]
    #[diagnostic(code(margin::store::not_found))]
    NotFound { kind: RecordKind, id: String },

    /// A persisted record failed structural validation on load.
    #[error("invalid {kind} record: {reason}")]
    #[diagnostic(code(margin::store::invalid_record))]
    InvalidRecord { kind: RecordKind, reason: String },

    /// IO error from the backing store.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),
}

/// Serialization/deserialization errors.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(margin::serde::json))]
    Json(#[from] serde_json::Error),
}

impl From<serde_json::Error> for MarginError {
    fn from(err: serde_json::Error) -> Self {
        MarginError::Serde(SerDeError::Json(err))
    }
}

pub type Result<T, E = MarginError> = std::result::Result<T, E>;
