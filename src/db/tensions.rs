//! Queries over the `tension` measurement table.

use crate::db::cycles::ts_column;
use crate::errors::AppResult;
use crate::models::tension::TensionRecord;
use crate::utils::time::to_db;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, fecha, numero, model, da, db, dc, dd, de, min, max, operador, supervisor";

/// Values of a measurement about to be stored.
#[derive(Debug, Clone)]
pub struct NewTension<'a> {
    pub fecha: DateTime<Utc>,
    pub numero: &'a str,
    pub model: Option<&'a str>,
    pub readings: [Option<f64>; 5],
    pub min: f64,
    pub max: f64,
    pub operador: &'a str,
    pub supervisor: &'a str,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<TensionRecord> {
    Ok(TensionRecord {
        id: row.get(0)?,
        fecha: ts_column(row, 1)?,
        numero: row.get(2)?,
        model: row.get(3)?,
        da: row.get(4)?,
        db: row.get(5)?,
        dc: row.get(6)?,
        dd: row.get(7)?,
        de: row.get(8)?,
        min: row.get(9)?,
        max: row.get(10)?,
        operador: row.get(11)?,
        supervisor: row.get(12)?,
    })
}

pub fn insert(conn: &Connection, t: &NewTension<'_>) -> AppResult<TensionRecord> {
    let [da, db, dc, dd, de] = t.readings;
    conn.execute(
        "INSERT INTO tension (fecha, numero, model, da, db, dc, dd, de, min, max, operador, supervisor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            to_db(&t.fecha),
            t.numero,
            t.model,
            da,
            db,
            dc,
            dd,
            de,
            t.min,
            t.max,
            t.operador,
            t.supervisor
        ],
    )?;
    let id = conn.last_insert_rowid();
    let sql = format!("SELECT {COLUMNS} FROM tension WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_row)?)
}

pub fn latest_for_numero(conn: &Connection, numero: &str) -> AppResult<Option<TensionRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM tension WHERE numero = ?1 ORDER BY fecha DESC, id DESC LIMIT 1"
    );
    Ok(conn.query_row(&sql, [numero], map_row).optional()?)
}

/// One record per stencil number: the newest by date, highest id on ties.
pub fn latest_per_numero(conn: &Connection) -> AppResult<Vec<TensionRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM (
            SELECT *, ROW_NUMBER() OVER (
                PARTITION BY numero ORDER BY fecha DESC, id DESC
            ) AS rn
            FROM tension
         )
         WHERE rn = 1
         ORDER BY numero DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn all_for_numero(conn: &Connection, numero: &str) -> AppResult<Vec<TensionRecord>> {
    let sql = format!("SELECT {COLUMNS} FROM tension WHERE numero = ?1 ORDER BY fecha DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([numero], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Export order. Optional inclusive bounds are stored-format timestamps.
pub fn list_for_export(
    conn: &Connection,
    from: Option<&str>,
    to: Option<&str>,
) -> AppResult<Vec<TensionRecord>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM tension
         WHERE (?1 IS NULL OR fecha >= ?1) AND (?2 IS NULL OR fecha <= ?2)
         ORDER BY fecha, numero"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![from, to], map_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
