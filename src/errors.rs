//! Typed error hierarchy for the contact gateway.
//!
//! `ApiError` covers everything the HTTP surface can report; each variant
//! carries enough detail to produce the client-facing JSON body, and the
//! `IntoResponse` impl owns the error-to-status mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced while handling a contact submission.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Spam detected")]
    SpamDetected,

    #[error("Message is required")]
    MessageRequired,

    #[error("Message is too long (max {max} characters)")]
    MessageTooLong { max: usize },

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Server not configured. Ask the site owner to set GITHUB_TOKEN.")]
    NotConfigured,

    #[error("Failed to create issue: {0}")]
    Upstream(String),

    #[error("Throttle lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SpamDetected
            | ApiError::MessageRequired
            | ApiError::MessageTooLong { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotConfigured
            | ApiError::Upstream(_)
            | ApiError::LockPoisoned
            | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}
