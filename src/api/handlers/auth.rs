use crate::api::AppState;
use crate::api::types::{CredentialsRequest, LoginResponse, LookupResponse};
use crate::core::{auth, token};
use crate::errors::{AppError, AppResult};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

/// `POST /api/auth/login`
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    let (usuario, password) = body.require()?;

    let user = auth::authenticate_by_login(&state.cred, &usuario, &password)
        .await?
        .ok_or_else(|| {
            tracing::warn!(event = "auth_failure", usuario = %usuario, "login rejected");
            AppError::unauthorized("invalid credentials")
        })?;

    let token = token::issue(&user, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    tracing::info!(usuario = %user.usuario, rol = %user.rol, "login");

    Ok(Json(LoginResponse {
        token,
        usuario: user.usuario,
        nombre: user.nombre,
        rol: user.rol,
    }))
}

/// `GET /api/auth/lookup/{num_empleado}`
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(num_empleado): Path<String>,
) -> AppResult<Json<LookupResponse>> {
    if num_empleado.trim().is_empty() {
        return Err(AppError::bad_request("num_empleado required"));
    }

    let user = auth::lookup_badge(&state.cred, &num_empleado)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    Ok(Json(LookupResponse {
        usuario: user.usuario,
        nombre: user.nombre,
        num_empleado: user.num_empleado,
    }))
}
