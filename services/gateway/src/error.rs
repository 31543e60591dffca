use crate::service::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Invalid request parameters";
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// One offending query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            received: None,
        }
    }

    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InternalError,
}

/// Central error type for the gateway
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request parameters")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("An unexpected error occurred")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        // Not-found must keep its own status; only the rest collapses to 500.
        match err {
            err @ ServiceError::NotFound { .. } => AppError::NotFound(err.to_string()),
            ServiceError::Internal(cause) => AppError::Internal(cause),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(details) => {
                tracing::warn!(?details, "Validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    VALIDATION_MESSAGE.to_string(),
                    Some(details),
                )
            }
            AppError::NotFound(msg) => {
                tracing::warn!(code = "NOT_FOUND", "{}", msg);
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::Internal(cause) => {
                // The cause stays in the logs, never in the body.
                tracing::error!(code = "INTERNAL_ERROR", error = ?cause, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    INTERNAL_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code,
                message,
                details,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let err = AppError::Validation(vec![FieldError::new("name", "Required")]);
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": {
                    "code": "VALIDATION_ERROR",
                    "message": "Invalid request parameters",
                    "details": [{ "field": "name", "message": "Required" }]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_not_found_keeps_status() {
        let err: AppError = ServiceError::NotFound {
            name: "NonExistent".to_string(),
        }
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Market not found: NonExistent");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_hides_cause() {
        let err: AppError =
            ServiceError::Internal(anyhow::anyhow!("connect to db.internal:5432 failed")).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": {
                    "code": "INTERNAL_ERROR",
                    "message": "An unexpected error occurred"
                }
            })
        );
    }
}
