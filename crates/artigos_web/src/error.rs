use artigos_core::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;

/// Error returned by a handler, rendered as `{"message": ..., "error": ...}`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>, error: impl Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }

    /// Map a storage error, using `context` as the message for anything that
    /// is not the client's fault.
    pub fn from_core(err: Error, context: &str) -> Self {
        match err {
            Error::Validation(message) => Self::bad_request(message),
            Error::NotFound(message) => Self::not_found(message),
            Error::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            other => Self::internal(context, other),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::from_core(err, "An error occurred")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = self.error.as_deref().unwrap_or_default(),
                "{}",
                self.message
            );
        }
        let body = ErrorBody {
            message: &self.message,
            error: self.error.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
