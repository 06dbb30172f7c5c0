use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input, rejected before any write.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// State-machine violation: the entity exists but is not in a state
    /// that permits the requested operation.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Referential constraint or lost race on a write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PreconditionFailed(_) | Self::InsufficientStock(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for HTTP responses. Internal errors collapse to a
    /// generic message so implementation details never reach the caller.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Translate a unique-constraint or foreign-key violation into the
    /// conflict the caller can act on; everything else stays a database error.
    pub fn from_write_error(err: sea_orm::error::DbErr, conflict_message: &str) -> Self {
        use sea_orm::error::SqlErr;
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_))
            | Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                ServiceError::Conflict(conflict_message.to_string())
            }
            _ => ServiceError::DatabaseError(err),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(
            ServiceError::ValidationError("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::PreconditionFailed("not approved".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::Conflict("already converted".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("wrong role".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = ServiceError::InternalError("secret pool state".into());
        assert_eq!(err.response_message(), "Internal server error");
    }
}
