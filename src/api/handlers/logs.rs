use crate::api::AppState;
use crate::api::types::{LimitQuery, LogsResponse};
use crate::core::token::Claims;
use crate::db::cycles;
use crate::errors::{AppError, AppResult};
use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};

pub const MAX_LIMIT: i64 = 1000;

/// `GET /api/logs?limit=` (admin only, see `api::auth::require_admin`)
pub async fn logs_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Json<LogsResponse>> {
    let Query(q) = query?;
    let limit = match q.limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| AppError::bad_request("invalid limit"))?
            .clamp(1, MAX_LIMIT),
        None => MAX_LIMIT,
    };

    tracing::debug!(usuario = %claims.usuario, limit, "admin log query");

    let registros = state
        .stencil
        .run(move |conn| cycles::list_recent(conn, limit))
        .await?;

    Ok(Json(LogsResponse { registros }))
}
