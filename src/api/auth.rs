use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use super::{ApiError, AppState, LoginRequest, LoginResponse, RegisterRequest};
use crate::services::RegisteredUser;

/// The authenticated caller, decoded from the bearer token and stashed in
/// request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Bearer-token authentication for everything except registration, login,
/// and public catalog reads. The token payload is trusted as-is; no user
/// lookup happens per request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(ApiError::login_required)?;

    let claims = state
        .tokens
        .verify(&token)
        .map_err(|_| ApiError::login_required())?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), ApiError> {
    let user = state
        .auth_service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let access_token = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert("Authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert("Authorization", "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert("Authorization", "Bearer ".parse().unwrap());
        assert!(extract_bearer_token(&headers).is_none());
    }
}
