use crate::errors::AppResult;
use crate::models::stencil::StencilInfo;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_row(row: &Row<'_>) -> rusqlite::Result<StencilInfo> {
    Ok(StencilInfo {
        id: row.get(0)?,
        numero: row.get(1)?,
        model: row.get(2)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<StencilInfo>> {
    Ok(conn
        .query_row(
            "SELECT id, numero, model FROM stencil WHERE id = ?1",
            [id],
            map_row,
        )
        .optional()?)
}

/// The effective metadata for a number is its most recent insert.
pub fn latest_by_numero(conn: &Connection, numero: &str) -> AppResult<Option<StencilInfo>> {
    Ok(conn
        .query_row(
            "SELECT id, numero, model FROM stencil WHERE numero = ?1 ORDER BY id DESC LIMIT 1",
            [numero],
            map_row,
        )
        .optional()?)
}

/// Digits are tried as a primary key first, then everything as a number.
pub fn find(conn: &Connection, identifier: &str) -> AppResult<Option<StencilInfo>> {
    let identifier = identifier.trim();
    if !identifier.is_empty()
        && identifier.bytes().all(|b| b.is_ascii_digit())
        && let Ok(id) = identifier.parse::<i64>()
        && let Some(found) = find_by_id(conn, id)?
    {
        return Ok(Some(found));
    }
    latest_by_numero(conn, identifier)
}

pub fn insert(conn: &Connection, numero: &str, model: Option<&str>) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO stencil (numero, model) VALUES (?1, ?2)",
        params![numero, model],
    )?;
    Ok(conn.last_insert_rowid())
}
