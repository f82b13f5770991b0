//! Unified error handling with Sentry integration.
//!
//! All route handlers return `Result<T, ApiError>`. Server-side failures
//! are captured to Sentry before the response is written; client errors
//! carry enough detail to fix the request, and always name the offending
//! parameter or field rather than silently coercing it.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use shilpkaar_catalog::{RepositoryError, ValidationError};
use shilpkaar_search::{QueryError, SearchError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Search index operation failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// A query parameter was rejected.
    #[error("{0}")]
    Query(#[from] QueryError),

    /// A write payload was rejected.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller identity is missing or malformed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the role for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Repository(e) => matches!(
                e,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ),
            Self::Search(e) => matches!(e, SearchError::Index(_) | SearchError::Query(_)),
            Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Repository(e) => match e {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) | RepositoryError::IllegalTransition { .. } => {
                    StatusCode::CONFLICT
                }
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            // The index still building is retryable, not an empty result
            // and not a client mistake.
            Self::Search(SearchError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Search(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Query(_) | Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        // Don't expose internal error details to clients.
        let body = match &self {
            Self::Repository(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
            | Self::Search(SearchError::Index(_) | SearchError::Query(_))
            | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Search(SearchError::Unavailable) => json!({
                "error": self.to_string(),
                "retryable": true,
            }),
            Self::Validation(e) => json!({
                "error": "validation failed",
                "violations": e
                    .violations
                    .iter()
                    .map(|v| json!({ "field": v.field, "message": v.message }))
                    .collect::<Vec<_>>(),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(ApiError::Search(SearchError::Unavailable)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ApiError::Query(QueryError {
                parameter: "minPrice".to_string(),
                message: "must not be negative".to_string(),
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Repository(RepositoryError::Conflict(
                "taken".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Forbidden("artisans only".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_query_error_names_parameter() {
        let err = ApiError::Query(QueryError {
            parameter: "maxPrice".to_string(),
            message: "'abc' is not a number".to_string(),
        });
        assert!(err.to_string().contains("maxPrice"));
    }
}
