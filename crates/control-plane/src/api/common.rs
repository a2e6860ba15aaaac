// Common DTOs for public API
//
// These types are shared across multiple API endpoints.

use axum::http::StatusCode;
use axum::Json;
use modelgate_core::ConfigError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Map a service error to a status and a client-safe body.
///
/// Anything that is not a client error is logged here and reported as a
/// generic internal error.
pub fn error_response(err: ConfigError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        ConfigError::Validation(_) => StatusCode::BAD_REQUEST,
        ConfigError::NotFound(_) => StatusCode::NOT_FOUND,
        ConfigError::DuplicateName(_) | ConfigError::InUse { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_client_safe() {
        ErrorResponse::new(err.to_string()).into_response(status)
    } else {
        tracing::error!(error = %err, "Request failed");
        ErrorResponse::new("Internal server error").into_response(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ConfigError::validation("name is required"), StatusCode::BAD_REQUEST),
            (ConfigError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (ConfigError::DuplicateName("A".into()), StatusCode::CONFLICT),
            (
                ConfigError::InUse {
                    id: Uuid::nil(),
                    references: 1,
                },
                StatusCode::CONFLICT,
            ),
            (ConfigError::DecryptionFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(error_response(err).0, expected);
        }
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let (status, Json(body)) =
            error_response(ConfigError::storage("password authentication failed for user"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");

        let (_, Json(body)) =
            error_response(ConfigError::CheckFailed("relation \"messages\" does not exist".into()));
        assert_eq!(body.error, "Internal server error");
    }

    #[test]
    fn test_client_errors_keep_message() {
        let (_, Json(body)) = error_response(ConfigError::DuplicateName("Primary".into()));
        assert_eq!(body.error, "A configuration named 'Primary' already exists");
    }
}
