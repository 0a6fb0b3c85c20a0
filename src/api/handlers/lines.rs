use crate::api::AppState;
use crate::api::types::{CredentialsRequest, LinesResponse, OkResponse, StartRequest};
use crate::core::{auth, lines};
use crate::errors::{AppError, AppResult};
use crate::models::tension::parse_stencil_number;
use crate::models::user::User;
use crate::utils::time::now;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

/// `GET /api/lines`
pub async fn lines_handler(State(state): State<AppState>) -> AppResult<Json<LinesResponse>> {
    let count = state.config.lines;
    let target_ms = state.config.target_ms();

    let lines = state
        .stencil
        .run(move |conn| lines::line_states(conn, count, now(), target_ms))
        .await?;

    Ok(Json(LinesResponse {
        lines,
        hours: state.config.hours,
    }))
}

/// `POST /api/lines/{id}/start`
pub async fn start_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> AppResult<Json<OkResponse>> {
    let linea = lines::line_number(&id, state.config.lines)?;
    let Json(body) = payload?;

    let stencil = parse_stencil_number(body.stencil.as_ref())
        .ok_or_else(|| AppError::bad_request("stencil required"))?;
    let usuario = body
        .usuario
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    state
        .stencil
        .run(move |conn| lines::start_cycle(conn, linea, &stencil, usuario.as_deref(), now()))
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// Shared front half of stop and reset: line id, body, credentials.
async fn operator_for(
    state: &AppState,
    id: &str,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<(i64, User)> {
    let linea = lines::line_number(id, state.config.lines)?;
    let Json(body) = payload?;
    let (usuario, password) = body.require()?;

    let user = auth::authenticate_by_login(&state.cred, &usuario, &password)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;
    Ok((linea, user))
}

/// `POST /api/lines/{id}/stop`
pub async fn stop_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<OkResponse>> {
    let (linea, user) = operator_for(&state, &id, payload).await?;

    state
        .stencil
        .run(move |conn| lines::stop_cycle(conn, linea, &user.usuario, now()))
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// `POST /api/lines/{id}/reset`
pub async fn reset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<OkResponse>> {
    let (linea, user) = operator_for(&state, &id, payload).await?;
    let target_ms = state.config.target_ms();

    state
        .stencil
        .run(move |conn| lines::reset_cycle(conn, linea, &user.usuario, now(), target_ms))
        .await?;

    Ok(Json(OkResponse::ok()))
}
