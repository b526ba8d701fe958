//! Unified error types for the Matchday engine.
//!
//! Per-event errors (missing field, invalid value, referential violation,
//! duplicate, decode) are recoverable: the pipeline records them in the batch
//! report and keeps going. Store errors are fatal to the enclosing batch.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the Matchday engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A required envelope or event_data field is absent.
    #[error("missing field: {0}")]
    MissingField(String),

    /// A field is present but outside its value domain.
    #[error("invalid value: {0}")]
    InvalidDomainValue(String),

    /// The event references a country or user the store does not know.
    #[error("referential violation: {0}")]
    ReferentialViolation(String),

    /// An event with this id has already been persisted.
    #[error("duplicate event_id {0}")]
    DuplicateEvent(i64),

    /// A line of input could not be decoded as an event.
    #[error("decode error: {0}")]
    Decode(String),

    /// The store failed at the statement or transaction level.
    #[error("store error: {0}")]
    Store(String),

    /// A lookup target (user, reference row) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn missing_field(msg: impl Into<String>) -> Self {
        Self::MissingField(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidDomainValue(msg.into())
    }

    pub fn referential(msg: impl Into<String>) -> Self {
        Self::ReferentialViolation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True if this error aborts the whole batch instead of one event.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Io(_) | Self::Internal(_))
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingField(_) => 400,
            Self::InvalidDomainValue(_) => 400,
            Self::Decode(_) => 400,
            Self::ReferentialViolation(_) => 422,
            Self::DuplicateEvent(_) => 409,
            Self::NotFound(_) => 404,
            Self::Store(_) => 500,
            Self::Io(_) => 500,
            Self::Internal(_) => 500,
        }
    }
}
