//! # Admin authentication
//!
//! Admin-only routes require a token issued by `POST /api/auth/login`:
//! ```text
//! Authorization: Bearer <jwt>
//! ```
//! The verified claims are stored in the request extensions.

use super::AppState;
use crate::core::token::{self, Claims};
use crate::errors::AppError;
use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

/// Token from an `Authorization` value: exactly `Bearer <token>`.
pub fn bearer_token(header_value: &str) -> Result<&str, AppError> {
    let parts: Vec<&str> = header_value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(*token),
        _ => Err(AppError::unauthorized("invalid auth header")),
    }
}

/// Verify the bearer token and require the admin role.
pub fn authorize_admin(header_value: Option<&str>, secret: &str) -> Result<Claims, AppError> {
    let Some(value) = header_value else {
        return Err(AppError::unauthorized("missing token"));
    };
    let token = bearer_token(value)?;
    let claims = token::verify(token, secret).map_err(|e| {
        tracing::warn!(
            event = "auth_failure",
            reason = "invalid_token",
            "Rejected bearer token: {e}"
        );
        AppError::unauthorized("invalid token")
    })?;
    if !claims.is_admin() {
        return Err(AppError::Forbidden("admin required".into()));
    }
    Ok(claims)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    let claims = authorize_admin(auth_header, &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
