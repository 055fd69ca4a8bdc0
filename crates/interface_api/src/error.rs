//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_travel::ClaimError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// The offending input field for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
        };

        let (message, field) = match self {
            ApiError::Validation { field, message } => (message, field),
            ApiError::Internal(_) => ("Internal server error".to_string(), None),
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        if err.is_validation() {
            return ApiError::Validation {
                field: err.field().map(str::to_string),
                message: err.to_string(),
            };
        }

        match err {
            ClaimError::Unauthorized { .. } => ApiError::Forbidden(err.to_string()),
            ClaimError::InvalidTransition { .. } | ClaimError::ConcurrentModification { .. } => {
                ApiError::Conflict(err.to_string())
            }
            ClaimError::ClaimNotFound(id) => ApiError::NotFound(format!("Claim {id} not found")),
            ClaimError::Storage(PortError::Connection { message, .. }) => {
                ApiError::Unavailable(message)
            }
            other => {
                error!(error = %other, "Claim request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|f| f.to_string());
        ApiError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_travel::{ActionKind, ClaimStatus};

    fn status_of(err: ClaimError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_claim_error_status_codes() {
        assert_eq!(status_of(ClaimError::MissingField("destination")), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(ClaimError::Unauthorized {
                actor: "e-1".into(),
                action: ActionKind::Approve
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ClaimError::InvalidTransition {
                status: ClaimStatus::Paid,
                action: ActionKind::Reject
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ClaimError::ConcurrentModification {
                claim_id: "TADA-1".into(),
                expected: 1,
                actual: 2
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(ClaimError::ClaimNotFound("TADA-1".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ClaimError::Storage(PortError::connection("refused"))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_error_keeps_field() {
        let err = ApiError::from(ClaimError::MissingField("adminNotes"));
        assert!(matches!(err, ApiError::Validation { field: Some(ref f), .. } if f == "adminNotes"));
    }
}
