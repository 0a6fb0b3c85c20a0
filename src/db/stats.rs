//! Database maintenance helpers used by `stencil-control db`.

use crate::errors::AppResult;
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DbInfo {
    pub size_bytes: u64,
    pub tables: Vec<(String, i64)>,
    pub first_cycle: Option<String>,
    pub last_cycle: Option<String>,
}

impl DbInfo {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

pub(crate) fn table_exists(conn: &Connection, name: &str) -> AppResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn collect_info(conn: &Connection, path: Option<&Path>) -> AppResult<DbInfo> {
    let size_bytes = path
        .and_then(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    let mut tables = Vec::new();
    for name in ["registros", "stencil", "tension", "users", "log"] {
        if table_exists(conn, name)? {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {name}"), [], |row| row.get(0))?;
            tables.push((name.to_string(), count));
        }
    }

    let (first_cycle, last_cycle): (Option<String>, Option<String>) = if table_exists(conn, "registros")? {
        conn.query_row("SELECT MIN(fh_i), MAX(fh_i) FROM registros", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
    } else {
        (None, None)
    };

    Ok(DbInfo {
        size_bytes,
        tables,
        first_cycle,
        last_cycle,
    })
}

/// `PRAGMA integrity_check`; an empty vector means the file is sound.
pub fn integrity_check(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA integrity_check")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let problems = rows
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|r| r != "ok")
        .collect();
    Ok(problems)
}

pub fn vacuum(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("VACUUM;")?;
    Ok(())
}
