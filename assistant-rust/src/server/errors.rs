use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to HTTP callers as `{ "error": "..." }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field was missing or empty, or the `type` is unknown.
    #[error("{0}")]
    BadRequest(String),
    /// The request body was not valid JSON for the endpoint.
    #[error("{0}")]
    InvalidBody(#[from] JsonRejection),
    /// The model call failed. The message is what callers see; the cause is
    /// logged.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: assistant_sdk::LanguageModelError,
    },
    #[error("Gemini model not initialized on server.")]
    ModelUnavailable,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
