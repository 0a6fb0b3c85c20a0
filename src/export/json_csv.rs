// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::model::ExportSheet;

/// Pretty-printed JSON array, one object per row.
pub(crate) fn render_json(sheet: &ExportSheet) -> AppResult<Vec<u8>> {
    serde_json::to_vec_pretty(&sheet.to_json())
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))
}

/// CSV with a header line. Fields holding a comma, quote, CR or LF are
/// quoted with doubled inner quotes.
pub(crate) fn render_csv(sheet: &ExportSheet) -> AppResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        wtr.write_record(row.iter().map(|c| c.display()))?;
    }

    wtr.into_inner()
        .map_err(|e| AppError::Export(format!("CSV flush error: {e}")))
}
