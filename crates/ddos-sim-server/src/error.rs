//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! body is a JSON object with a `message` and the numeric `status`;
//! validation failures add an `errors` list. Internal failures never leak
//! their detail to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ddos_sim_store::StoreError;

use crate::validation::FieldViolation;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session, or the session is unknown or expired.
    #[error("unauthorized")]
    Unauthorized,

    /// Login with an unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request body or path did not match the expected shape.
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else. Logged, never shown to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// A single-violation validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::UnknownServer { .. } | StoreError::UnregisteredServer { .. } => {
                Self::Conflict(err.to_string())
            }
            StoreError::UnknownTest(_) => Self::invalid("testId", err.to_string()),
            StoreError::DuplicateUsername(_) => Self::invalid("username", "Username already exists"),
            StoreError::IdExhausted(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Unauthorized => serde_json::json!({
                "message": "Unauthorized",
                "status": status.as_u16(),
            }),
            Self::InvalidCredentials => serde_json::json!({
                "message": "Invalid username or password",
                "status": status.as_u16(),
            }),
            Self::Validation(errors) => serde_json::json!({
                "message": "Invalid request data",
                "status": status.as_u16(),
                "errors": errors,
            }),
            Self::NotFound(msg) | Self::Conflict(msg) => serde_json::json!({
                "message": msg,
                "status": status.as_u16(),
            }),
            Self::Internal(detail) => {
                tracing::error!(%detail, "Request failed with internal error");
                serde_json::json!({
                    "message": "Internal server error",
                    "status": status.as_u16(),
                })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use ddos_sim_types::{ServerId, TestId, TestStatus};

    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound { entity: "test", id: 1 }, StatusCode::NOT_FOUND),
            (
                StoreError::UnknownServer {
                    test: TestId(1),
                    server: ServerId(2),
                },
                StatusCode::CONFLICT,
            ),
            (
                StoreError::UnregisteredServer {
                    server: ServerId(9),
                    status: TestStatus::Running,
                },
                StatusCode::CONFLICT,
            ),
            (StoreError::UnknownTest(TestId(3)), StatusCode::BAD_REQUEST),
            (StoreError::DuplicateUsername("a".into()), StatusCode::BAD_REQUEST),
            (StoreError::IdExhausted("test"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (store_err, expected) in cases {
            assert_eq!(ApiError::from(store_err).status(), expected);
        }
    }

    #[test]
    fn unauthorized_is_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
