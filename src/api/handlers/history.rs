use super::{download, export_format};
use crate::api::AppState;
use crate::api::types::{HistoryExportQuery, HistoryResponse};
use crate::core::history::HistoryFilter;
use crate::db::cycles;
use crate::errors::AppResult;
use crate::export::history_sheet;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};

/// `GET /api/history?line=&from=&to=&limit=`
pub async fn history_handler(
    State(state): State<AppState>,
    query: Result<Query<HistoryFilter>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(filter) = query?;
    let q = filter.to_query(true)?;

    let history = state
        .stencil
        .run(move |conn| cycles::query_history(conn, &q))
        .await?;

    Ok(Json(HistoryResponse { history }))
}

/// `GET /api/history/export?format=csv|xlsx&line=&from=&to=`
pub async fn history_export_handler(
    State(state): State<AppState>,
    query: Result<Query<HistoryExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = query?;
    let format = export_format(params.format.as_deref())?;
    let q = params.filter().to_query(false)?;

    let rows = state
        .stencil
        .run(move |conn| cycles::query_history(conn, &q))
        .await?;

    download(format, &history_sheet(&rows))
}
