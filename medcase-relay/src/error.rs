//! Relay errors and their JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Body of every failed `/ai/compare` call.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Disease is required")]
    MissingDisease,
    #[error("Case store unreachable at {0}")]
    StoreConnection(String),
    #[error("Case store error: {0}")]
    Store(String),
    #[error("Text generation failed: {0}")]
    Generation(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingDisease => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "comparison request failed");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_disease_is_a_client_error() {
        assert_eq!(RelayError::MissingDisease.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::MissingDisease.to_string(), "Disease is required");
    }

    #[test]
    fn collaborator_failures_are_server_errors() {
        for err in [
            RelayError::Store("boom".into()),
            RelayError::Generation("quota".into()),
            RelayError::StoreConnection("https://x.supabase.co".into()),
        ] {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
