use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use braingym_core::Error;
use serde_json::json;

/// Error body returned by every endpoint: `{"error": "..."}`.
///
/// Clients only ever see 400 for failures on known routes; the error kind is
/// kept for logging.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Not found.".to_string(),
        }
    }

    /// Map a core error. Messages written for users pass through; anything
    /// from the storage layer is replaced by `fallback`.
    pub fn from_core(error: Error, fallback: &str) -> Self {
        let kind = error.kind();
        match error {
            Error::Validation(message) | Error::NotFound(message) | Error::Conflict(message) => {
                tracing::debug!(?kind, error = %message, "Request rejected");
                Self::bad_request(message)
            }
            other => {
                tracing::error!(?kind, error = %other, "Request failed");
                Self::bad_request(fallback)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Malformed JSON body");
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "Malformed query string");
        Self::bad_request(rejection.body_text())
    }
}
