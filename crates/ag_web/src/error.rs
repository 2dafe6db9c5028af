use ag_core::{Error, FailureKind};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error body is always `{"detail": "..."}`. Input problems are 400, the
/// rest 500.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// `action` completes "Error {action}: ..." in the message.
    pub fn from_error(action: &str, err: Error) -> Self {
        let status = match err.kind() {
            FailureKind::Input => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, format!("Error {}: {}", action, err))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "Request failed");
        } else {
            tracing::warn!(status = %self.status, detail = %self.detail, "Request rejected");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_failure_kind() {
        let err = ApiError::from_error("generating article", Error::InvalidUrl("x".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "Error generating article: Invalid URL: x");

        let err = ApiError::from_error("generating article", Error::Scoring("timeout".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
