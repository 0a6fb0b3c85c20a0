// src/export/logic.rs

use crate::db::cycles::{self, HistoryQuery};
use crate::db::pool::DbPool;
use crate::db::tensions;
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::model::{ExportSheet, history_sheet, tension_sheet};
use crate::export::range::parse_range;
use crate::export::{ExportFormat, ExportTarget, notify_export_success, render};
use crate::ui::messages::{info, warning};
use crate::utils::date::{end_of_day, start_of_day};
use crate::utils::path::expand_tilde;
use std::fs;

/// High level export used by `stencil-control export`.
pub struct ExportLogic;

impl ExportLogic {
    /// Export cycle history or tension measurements to `file`.
    ///
    /// - `range`: `None`, `"all"` or an expression accepted by `--range`
    /// - `line`: 1-based line filter, history only
    pub fn export(
        pool: &DbPool,
        what: ExportTarget,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        line: Option<i64>,
        force: bool,
    ) -> AppResult<()> {
        let expanded = expand_tilde(file);
        let path = expanded.as_path();
        ensure_writable(path, force)?;

        let bounds = match range {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };
        let from = bounds.map(|(d1, _)| start_of_day(d1));
        let to = bounds.map(|(_, d2)| end_of_day(d2));

        let sheet = load_sheet(pool, what, from, to, line)?;

        if sheet.is_empty() {
            warning("No records found for the selected range. Nothing to export.");
            return Ok(());
        }

        info(format!(
            "Exporting {} rows to {}: {}",
            sheet.rows.len(),
            format.as_str().to_uppercase(),
            path.display()
        ));

        let bytes = render(format, &sheet)?;
        fs::write(path, bytes)?;

        notify_export_success(format.as_str(), path);
        Ok(())
    }
}

fn load_sheet(
    pool: &DbPool,
    what: ExportTarget,
    from: Option<String>,
    to: Option<String>,
    line: Option<i64>,
) -> AppResult<ExportSheet> {
    pool.with_conn(|conn| match what {
        ExportTarget::History => {
            let q = HistoryQuery {
                linea: line,
                from,
                to,
                limit: None,
                ascending: true,
            };
            Ok(history_sheet(&cycles::query_history(conn, &q)?))
        }
        ExportTarget::Tensions => {
            if line.is_some() {
                warning("--line applies to history exports only, ignoring it.");
            }
            let rows = tensions::list_for_export(conn, from.as_deref(), to.as_deref())?;
            Ok(tension_sheet(&rows))
        }
    })
}
