use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rsvpd_core::CoreError;
use serde::Serialize;
use thiserror::Error;

/// JSON problem body returned for every API error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Problem {
    pub error: ProblemDetail,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProblemDetail {
    /// Machine-readable code: invalid | not-found | conflict | capacity |
    /// unauthorized | internal
    pub code: &'static str,
    /// Human-readable description
    pub message: String,
}

impl Problem {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: ProblemDetail {
                code,
                message: message.into(),
            },
        }
    }
}

/// High-level API errors mapped to HTTP responses with a problem body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn capacity_exceeded(msg: impl Into<String>) -> Self {
        Self::CapacityExceeded(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::CapacityExceeded(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_problem(&self) -> Problem {
        match self {
            ApiError::BadRequest(msg) => Problem::new("invalid", msg),
            ApiError::Unauthorized(msg) => Problem::new("unauthorized", msg),
            ApiError::NotFound(msg) => Problem::new("not-found", msg),
            ApiError::Conflict(msg) => Problem::new("conflict", msg),
            ApiError::CapacityExceeded(msg) => Problem::new("capacity", msg),
            ApiError::Internal(msg) => Problem::new("internal", msg),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::Validation { .. }
            | CoreError::UnknownOccurrence(_)
            | CoreError::InvalidTimestamp(_) => Self::BadRequest(err.to_string()),
            CoreError::CapacityExceeded { .. } => Self::CapacityExceeded(err.to_string()),
            CoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            CoreError::DuplicateEmail { .. } => Self::Conflict(err.to_string()),
            CoreError::Configuration(_)
            | CoreError::Persistence(_)
            | CoreError::JsonError(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let problem = self.to_problem();
        let body = serde_json::to_vec(&problem).unwrap_or_else(|_| {
            // Fallback minimal body if serialization fails
            br#"{"error":{"code":"internal","message":"serialization failure"}}"#.to_vec()
        });

        axum::http::Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(axum::body::Body::from(body))
            .unwrap_or_else(|_| {
                axum::http::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::from("{}"))
                    .expect("build fallback response")
            })
    }
}

/// Convenience result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
