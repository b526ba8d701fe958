//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success response for operations that return no report.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub timestamp: i64,
}

impl StatusResponse {
    pub fn ok(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Success response for a reference-data reload.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReferenceResponse {
    pub countries: usize,
    pub timestamp: i64,
}

impl ReferenceResponse {
    pub fn loaded(countries: usize) -> Self {
        Self {
            countries,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error carrying an HTTP status and a structured body.
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "bad_request", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "not_found", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
    }

    pub fn validation(details: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new("Validation failed", "validation_failed")
                .with_details(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<matchday_core::Error> for ApiError {
    fn from(err: matchday_core::Error) -> Self {
        use matchday_core::Error;

        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match &err {
            Error::MissingField(_) => "missing_field",
            Error::InvalidDomainValue(_) => "invalid_value",
            Error::ReferentialViolation(_) => "referential_violation",
            Error::DuplicateEvent(_) => "duplicate_event",
            Error::Decode(_) => "decode_error",
            Error::NotFound(_) => "not_found",
            Error::Store(_) => "store_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal",
        };
        ApiError::with_code(status, code, err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        ApiError::validation(details)
    }
}
