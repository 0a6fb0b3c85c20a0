//! Queries over `registros`, the line cycle table.

use crate::errors::AppResult;
use crate::models::cycle::CycleRecord;
use crate::utils::time::{from_db, to_db};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};

const COLUMNS: &str = "id, linea, stencil, fh_i, fh_d, fh_r, usuario, usuario1";

/// Parse a stored timestamp column.
pub(crate) fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    from_db(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp '{raw}'").into(),
        )
    })
}

pub(crate) fn opt_ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(s) if !s.trim().is_empty() => ts_column(row, idx).map(Some),
        _ => Ok(None),
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<CycleRecord> {
    Ok(CycleRecord {
        id: row.get(0)?,
        linea: row.get(1)?,
        stencil: row.get(2)?,
        fh_i: ts_column(row, 3)?,
        fh_d: opt_ts_column(row, 4)?,
        fh_r: opt_ts_column(row, 5)?,
        usuario: row.get(6)?,
        usuario1: row.get(7)?,
    })
}

/// Latest record of a line (highest id), running or not.
pub fn latest_for_line(conn: &Connection, linea: i64) -> AppResult<Option<CycleRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM registros WHERE linea = ?1 ORDER BY id DESC LIMIT 1");
    Ok(conn.query_row(&sql, [linea], map_row).optional()?)
}

pub fn running_for_line(conn: &Connection, linea: i64) -> AppResult<Option<CycleRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM registros
         WHERE linea = ?1 AND fh_d IS NULL
         ORDER BY id DESC LIMIT 1"
    );
    Ok(conn.query_row(&sql, [linea], map_row).optional()?)
}

pub fn insert_cycle(
    conn: &Connection,
    linea: i64,
    stencil: &str,
    usuario: Option<&str>,
    at: &DateTime<Utc>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO registros (linea, stencil, fh_i, fh_d, fh_r, usuario)
         VALUES (?1, ?2, ?3, NULL, NULL, ?4)",
        params![linea, stencil, to_db(at), usuario],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn stop_cycle(conn: &Connection, id: i64, usuario: &str, at: &DateTime<Utc>) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE registros SET fh_d = ?1, usuario1 = ?2 WHERE id = ?3 AND fh_d IS NULL",
        params![to_db(at), usuario, id],
    )?)
}

pub fn mark_reset(conn: &Connection, id: i64, at: &DateTime<Utc>) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE registros SET fh_r = ?1 WHERE id = ?2",
        params![to_db(at), id],
    )?)
}

/// Filters for [`query_history`]. Bounds are stored-format timestamps.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub linea: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    /// Oldest first instead of newest first.
    pub ascending: bool,
}

/// A cycle matches `from` when it started or stopped at/after the bound,
/// and `to` when it started or stopped at/before it.
pub fn query_history(conn: &Connection, q: &HistoryQuery) -> AppResult<Vec<CycleRecord>> {
    let mut sql = format!("SELECT {COLUMNS} FROM registros WHERE 1=1");
    let mut args: Vec<&dyn ToSql> = Vec::new();

    if let Some(linea) = &q.linea {
        args.push(linea);
        sql.push_str(&format!(" AND linea = ?{}", args.len()));
    }
    if let Some(from) = &q.from {
        args.push(from);
        let n = args.len();
        sql.push_str(&format!(" AND (fh_i >= ?{n} OR fh_d >= ?{n})"));
    }
    if let Some(to) = &q.to {
        args.push(to);
        let n = args.len();
        sql.push_str(&format!(" AND (fh_i <= ?{n} OR fh_d <= ?{n})"));
    }

    if q.ascending {
        sql.push_str(" ORDER BY fh_i ASC, id ASC");
    } else {
        sql.push_str(" ORDER BY fh_i DESC, id DESC");
    }
    if let Some(limit) = &q.limit {
        args.push(limit);
        sql.push_str(&format!(" LIMIT ?{}", args.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args.as_slice(), map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// All records, newest first.
pub fn list_recent(conn: &Connection, limit: i64) -> AppResult<Vec<CycleRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM registros ORDER BY id DESC LIMIT ?1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([limit], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
