use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::services::AuthError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    Unauthorized(String),

    DatabaseError(String),

    /// The recommendation pipeline hit a data-access failure; everything
    /// else on that path degrades to the local fallback instead.
    RecommendationFailed(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::RecommendationFailed(msg) => write!(f, "Recommendation error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            ApiError::RecommendationFailed(msg) => {
                tracing::error!("Recommendation error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to get recommendations".to_string(),
                )
            }
        };

        let body = ErrorBody { message };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email/password".to_string())
            }
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) | AuthError::Internal(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound("Not Found".to_string())
    }

    pub fn login_required() -> Self {
        ApiError::Unauthorized("Please login first".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }
}
