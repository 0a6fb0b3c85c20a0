// src/export/mod.rs

mod excel_date;
mod fs_utils;
mod json_csv;
pub mod logic;
pub mod model;
mod range;
mod xlsx;

pub use logic::ExportLogic;
pub use model::{ExportSheet, history_sheet, tension_sheet};

use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;
use std::str::FromStr;

/// Common completion message for exports.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!(
        "{} export completed: {}",
        label.to_uppercase(),
        path.display()
    ));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }

    /// Download name for a sheet, e.g. `tensions_export.csv`.
    pub fn file_name(&self, sheet: &ExportSheet) -> String {
        format!("{}.{}", sheet.file_stem, self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::InvalidExportFormat(other.to_string())),
        }
    }
}

/// What `stencil-control export` writes out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    History,
    Tensions,
}

/// Render a sheet in the requested format.
pub fn render(format: ExportFormat, sheet: &ExportSheet) -> AppResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => json_csv::render_csv(sheet),
        ExportFormat::Xlsx => xlsx::render_xlsx(sheet),
        ExportFormat::Json => json_csv::render_json(sheet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(AppError::InvalidExportFormat(_))
        ));
    }

    #[test]
    fn download_name_uses_sheet_stem() {
        let sheet = tension_sheet(&[]);
        assert_eq!(ExportFormat::Csv.file_name(&sheet), "tensions_export.csv");
        assert_eq!(ExportFormat::Xlsx.file_name(&sheet), "tensions_export.xlsx");
    }
}
