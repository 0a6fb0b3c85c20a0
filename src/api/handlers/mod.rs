pub mod auth;
pub mod history;
pub mod lines;
pub mod logs;
pub mod stencils;
pub mod tensions;

use crate::errors::AppResult;
use crate::export::{self, ExportFormat, ExportSheet};
use axum::{
    Json,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// `GET /health`
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `csv` when absent.
pub(crate) fn export_format(raw: Option<&str>) -> AppResult<ExportFormat> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse(),
        None => Ok(ExportFormat::Csv),
    }
}

/// Rendered sheet as an attachment.
pub(crate) fn download(format: ExportFormat, sheet: &ExportSheet) -> AppResult<Response> {
    let bytes = export::render(format, sheet)?;
    let disposition = format!("attachment; filename=\"{}\"", format.file_name(sheet));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
