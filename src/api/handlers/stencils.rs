use crate::api::AppState;
use crate::db::stencils;
use crate::errors::{AppError, AppResult};
use crate::models::stencil::StencilInfo;
use axum::{
    Json,
    extract::{Path, State},
};

/// `GET /api/stencils/{identifier}`: by id when all digits, else by number.
pub async fn stencil_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> AppResult<Json<StencilInfo>> {
    let found = state
        .stencil
        .run(move |conn| stencils::find(conn, &identifier))
        .await?;

    found
        .map(Json)
        .ok_or_else(|| AppError::not_found("stencil not found"))
}
