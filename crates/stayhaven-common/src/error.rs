use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::images::ImageProblem;

#[derive(Debug, Error)]
pub enum StayhavenError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StayhavenError>;

/// Error returned by HTTP handlers.
///
/// Renders as `{"error": <code>}` plus an optional `message` or `details`
/// field, with the status code matching the variant.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with a bare error code such as `MissingFields`.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 400 with a code and a human readable message.
    #[error("bad request: {code}: {message}")]
    Invalid { code: String, message: String },

    /// 400 listing every image that failed server-side validation.
    #[error("{} image(s) failed validation", .0.len())]
    ImageValidation(Vec<ImageProblem>),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>) -> Self {
        Self::BadRequest(code.into())
    }

    pub fn invalid(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid { code: code.into(), message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid { .. } | ApiError::ImageValidation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body sent to the client.
    pub fn body(&self) -> Value {
        match self {
            ApiError::BadRequest(code)
            | ApiError::Unauthenticated(code)
            | ApiError::Forbidden(code)
            | ApiError::NotFound(code)
            | ApiError::Conflict(code) => json!({ "error": code }),
            ApiError::Invalid { code, message } => json!({ "error": code, "message": message }),
            ApiError::ImageValidation(details) => json!({ "error": "ImageValidation", "details": details }),
            // Internal detail stays in the log.
            ApiError::Internal(_) => json!({ "error": "ServerError" }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<StayhavenError> for ApiError {
    fn from(err: StayhavenError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
