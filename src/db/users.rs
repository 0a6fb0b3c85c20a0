//! Queries over the credentials `users` table.

use crate::errors::AppResult;
use crate::models::user::User;
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, usuario, nombre, rol, num_empleado, pass_hash";

fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        usuario: row.get(1)?,
        nombre: row.get(2)?,
        rol: row.get(3)?,
        num_empleado: row.get(4)?,
        pass_hash: row.get(5)?,
    })
}

pub fn find_by_login(conn: &Connection, usuario: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE usuario = ?1 LIMIT 1");
    Ok(conn.query_row(&sql, [usuario], map_row).optional()?)
}

/// Users carrying a badge number. Badges are compared after normalization,
/// so the match happens in Rust rather than in SQL.
pub fn with_badge(conn: &Connection) -> AppResult<Vec<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE num_empleado IS NOT NULL ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn list(conn: &Connection) -> AppResult<Vec<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users ORDER BY usuario");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn insert(
    conn: &Connection,
    usuario: &str,
    nombre: &str,
    rol: &str,
    num_empleado: Option<&str>,
    pass_hash: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO users (usuario, nombre, rol, num_empleado, pass_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![usuario, nombre, rol, num_empleado, pass_hash],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_password(conn: &Connection, usuario: &str, pass_hash: &str) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE users SET pass_hash = ?1 WHERE usuario = ?2",
        params![pass_hash, usuario],
    )?)
}
