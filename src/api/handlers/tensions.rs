use super::{download, export_format};
use crate::api::AppState;
use crate::api::types::{ExportQuery, LatestQuery, TensionResponse, TensionsResponse};
use crate::core::auth;
use crate::core::tensions::{self as intake, TensionPolicy};
use crate::db::tensions;
use crate::errors::{AppError, AppResult};
use crate::export::tension_sheet;
use crate::utils::time::now;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// `POST /api/tensions`
pub async fn create_tension_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TensionResponse>)> {
    let Json(body) = payload?;
    let input = intake::parse_input(&body)?;

    let user = auth::authenticate_by_badge(&state.cred, &input.num_empleado, &input.password)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    let policy = TensionPolicy {
        min: state.config.tension_min,
        max: state.config.tension_max,
        supervisor: state.config.tension_supervisor.clone(),
    };
    let record = state
        .stencil
        .run(move |conn| {
            intake::register(conn, &input.numero, input.readings, &user.nombre, &policy, now())
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TensionResponse {
            record: Some(record),
        }),
    ))
}

/// `GET /api/tensions/latest?numero=` (or `?id=`)
///
/// With a number: `{record}`, the latest for it or `null`.
/// Without: `{records}`, the latest per number.
pub async fn latest_handler(
    State(state): State<AppState>,
    query: Result<Query<LatestQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(q) = query?;
    // a blank `numero` falls through to `id`
    let pick = |v: Option<String>| v.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let numero = pick(q.numero).or_else(|| pick(q.id));

    match numero {
        Some(numero) => {
            let record = state
                .stencil
                .run(move |conn| tensions::latest_for_numero(conn, &numero))
                .await?;
            Ok(Json(TensionResponse { record }).into_response())
        }
        None => {
            let records = state.stencil.run(|conn| tensions::latest_per_numero(conn)).await?;
            Ok(Json(TensionsResponse { records }).into_response())
        }
    }
}

/// `GET /api/tensions/{numero}/all`
pub async fn history_for_numero_handler(
    State(state): State<AppState>,
    Path(numero): Path<String>,
) -> AppResult<Json<TensionsResponse>> {
    let records = state
        .stencil
        .run(move |conn| tensions::all_for_numero(conn, &numero))
        .await?;
    Ok(Json(TensionsResponse { records }))
}

/// `GET /api/tensions/export?format=csv|xlsx`
pub async fn export_handler(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(q) = query?;
    let format = export_format(q.format.as_deref())?;

    let rows = state
        .stencil
        .run(|conn| tensions::list_for_export(conn, None, None))
        .await?;

    download(format, &tension_sheet(&rows))
}
