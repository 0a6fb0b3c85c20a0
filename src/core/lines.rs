//! Line timers: start, stop and reset of stencil cycles.
//!
//! Every operation takes the clock as a parameter and runs in a single
//! transaction on the stencil database.

use crate::db::cycles;
use crate::db::log::audit_log;
use crate::errors::{AppError, AppResult};
use crate::models::cycle::LineState;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode};
use tracing::info;

/// Map a 0-based route id to the stored 1-based line number.
pub fn line_number(raw: &str, lines: u32) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id >= 0 && id < i64::from(lines) => Ok(id + 1),
        _ => Err(AppError::bad_request("invalid line id")),
    }
}

/// Dashboard state of lines `1..=lines`.
pub fn line_states(
    conn: &Connection,
    lines: u32,
    now: DateTime<Utc>,
    target_ms: i64,
) -> AppResult<Vec<LineState>> {
    (1..=i64::from(lines))
        .map(|linea| {
            Ok(match cycles::latest_for_line(conn, linea)? {
                Some(rec) => LineState::from_record(&rec, now, target_ms),
                None => LineState::idle(),
            })
        })
        .collect()
}

pub fn start_cycle(
    conn: &mut Connection,
    linea: i64,
    stencil: &str,
    usuario: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    let stencil = stencil.trim();
    if stencil.is_empty() {
        return Err(AppError::bad_request("stencil required"));
    }

    let tx = conn.transaction()?;
    if cycles::running_for_line(&tx, linea)?.is_some() {
        return Err(AppError::bad_request("line already running"));
    }
    let id = cycles::insert_cycle(&tx, linea, stencil, usuario, &now).map_err(running_conflict)?;
    audit_log(
        &tx,
        "line_start",
        &format!("linea {linea}"),
        &format!("stencil {stencil} started by {}", usuario.unwrap_or("-")),
    )?;
    tx.commit()?;

    info!(linea, stencil, id, "cycle started");
    Ok(id)
}

/// `ux_registros_running` rejects a start racing with another writer.
fn running_conflict(err: AppError) -> AppError {
    let is_constraint = matches!(
        &err,
        AppError::Db(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
    );
    if is_constraint {
        AppError::bad_request("line already running")
    } else {
        err
    }
}

pub fn stop_cycle(
    conn: &mut Connection,
    linea: i64,
    usuario: &str,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    let tx = conn.transaction()?;
    let Some(rec) = cycles::running_for_line(&tx, linea)? else {
        return Err(AppError::bad_request("no running cycle to stop"));
    };
    cycles::stop_cycle(&tx, rec.id, usuario, &now)?;
    audit_log(
        &tx,
        "line_stop",
        &format!("linea {linea}"),
        &format!("stencil {} stopped by {usuario}", rec.stencil),
    )?;
    tx.commit()?;

    info!(linea, id = rec.id, usuario, "cycle stopped");
    Ok(rec.id)
}

/// What a successful reset did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub completed_id: i64,
    /// New cycle started when the completed one was still running.
    pub restarted_id: Option<i64>,
}

/// Mark the latest cycle of a line as completed once the target is reached.
/// A cycle still running is closed and restarted with the same stencil.
pub fn reset_cycle(
    conn: &mut Connection,
    linea: i64,
    usuario: &str,
    now: DateTime<Utc>,
    target_ms: i64,
) -> AppResult<ResetOutcome> {
    let tx = conn.transaction()?;
    let Some(rec) = cycles::latest_for_line(&tx, linea)? else {
        return Err(AppError::bad_request("no cycle to reset"));
    };

    let elapsed_ms = rec.elapsed_ms(now);
    if elapsed_ms < target_ms {
        return Err(AppError::CycleNotCompleted {
            elapsed_ms,
            target_ms,
        });
    }

    cycles::mark_reset(&tx, rec.id, &now)?;

    let restarted_id = if rec.is_running() {
        cycles::stop_cycle(&tx, rec.id, usuario, &now)?;
        Some(cycles::insert_cycle(&tx, linea, &rec.stencil, Some(usuario), &now)?)
    } else {
        None
    };

    audit_log(
        &tx,
        "line_reset",
        &format!("linea {linea}"),
        &format!("stencil {} completed by {usuario}", rec.stencil),
    )?;
    tx.commit()?;

    info!(linea, id = rec.id, restarted = restarted_id.is_some(), "cycle reset");
    Ok(ResetOutcome {
        completed_id: rec.id,
        restarted_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_stencil_migrations;
    use chrono::{Duration, TimeZone};

    const TARGET: i64 = 8 * 3600 * 1000;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_stencil_migrations(&mut conn).unwrap();
        conn
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap()
    }

    #[test]
    fn route_ids_are_zero_based() {
        assert_eq!(line_number("0", 4).unwrap(), 1);
        assert_eq!(line_number("3", 4).unwrap(), 4);
        assert!(line_number("4", 4).is_err());
        assert!(line_number("-1", 4).is_err());
        assert!(line_number("abc", 4).is_err());
    }

    #[test]
    fn start_requires_a_stencil() {
        let mut conn = conn();
        let err = start_cycle(&mut conn, 1, "  ", None, t0()).unwrap_err();
        assert_eq!(err.to_string(), "stencil required");
    }

    #[test]
    fn second_start_on_a_running_line_fails() {
        let mut conn = conn();
        start_cycle(&mut conn, 1, "ST-1", Some("ana"), t0()).unwrap();
        let err = start_cycle(&mut conn, 1, "ST-2", None, t0()).unwrap_err();
        assert_eq!(err.to_string(), "line already running");
        start_cycle(&mut conn, 2, "ST-2", None, t0()).unwrap();
    }

    #[test]
    fn index_violation_reads_as_line_already_running() {
        let conn = conn();
        cycles::insert_cycle(&conn, 1, "ST-1", None, &t0()).unwrap();
        let raw = cycles::insert_cycle(&conn, 1, "ST-2", None, &t0()).unwrap_err();
        let err = running_conflict(raw);
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "line already running");

        let other = running_conflict(AppError::from(rusqlite::Error::InvalidQuery));
        assert!(matches!(other, AppError::Db(_)));
    }

    #[test]
    fn stop_needs_a_running_cycle() {
        let mut conn = conn();
        let err = stop_cycle(&mut conn, 1, "luis", t0()).unwrap_err();
        assert_eq!(err.to_string(), "no running cycle to stop");

        start_cycle(&mut conn, 1, "ST-1", None, t0()).unwrap();
        stop_cycle(&mut conn, 1, "luis", t0() + Duration::hours(1)).unwrap();
        let states = line_states(&conn, 2, t0() + Duration::hours(5), TARGET).unwrap();
        assert!(!states[0].running);
        assert_eq!(states[0].elapsed_ms, Some(3600 * 1000));
        assert_eq!(states[1], LineState::idle());
    }

    #[test]
    fn reset_before_target_reports_elapsed() {
        let mut conn = conn();
        start_cycle(&mut conn, 1, "ST-1", None, t0()).unwrap();
        let err = reset_cycle(&mut conn, 1, "ana", t0() + Duration::hours(2), TARGET).unwrap_err();
        match err {
            AppError::CycleNotCompleted {
                elapsed_ms,
                target_ms,
            } => {
                assert_eq!(elapsed_ms, 2 * 3600 * 1000);
                assert_eq!(target_ms, TARGET);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reset_of_running_cycle_restarts_it() {
        let mut conn = conn();
        start_cycle(&mut conn, 1, "ST-1", Some("ana"), t0()).unwrap();
        let later = t0() + Duration::hours(8);
        let outcome = reset_cycle(&mut conn, 1, "luis", later, TARGET).unwrap();
        assert!(outcome.restarted_id.is_some());

        let done = cycles::query_history(&conn, &Default::default()).unwrap();
        assert_eq!(done.len(), 2);
        let old = done.iter().find(|r| r.id == outcome.completed_id).unwrap();
        assert_eq!(old.fh_r, Some(later));
        assert_eq!(old.fh_d, Some(later));
        let new = cycles::running_for_line(&conn, 1).unwrap().unwrap();
        assert_eq!(new.stencil, "ST-1");
        assert_eq!(new.usuario.as_deref(), Some("luis"));
    }

    #[test]
    fn reset_of_stopped_cycle_only_marks_it() {
        let mut conn = conn();
        assert_eq!(
            reset_cycle(&mut conn, 1, "ana", t0(), TARGET)
                .unwrap_err()
                .to_string(),
            "no cycle to reset"
        );
        start_cycle(&mut conn, 1, "ST-1", None, t0()).unwrap();
        stop_cycle(&mut conn, 1, "ana", t0() + Duration::hours(9)).unwrap();
        let outcome = reset_cycle(&mut conn, 1, "ana", t0() + Duration::days(1), TARGET).unwrap();
        assert_eq!(outcome.restarted_id, None);
        assert!(cycles::running_for_line(&conn, 1).unwrap().is_none());
    }
}
