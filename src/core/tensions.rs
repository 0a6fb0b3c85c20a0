//! Tension measurement intake.

use crate::db::log::audit_log;
use crate::db::tensions::{self, NewTension};
use crate::db::stencils;
use crate::errors::{AppError, AppResult};
use crate::models::tension::{READING_COLUMNS, TensionRecord, parse_reading, parse_stencil_number};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::Value;
use tracing::info;

/// Thresholds and supervisor stamped on every new record.
#[derive(Debug, Clone)]
pub struct TensionPolicy {
    pub min: f64,
    pub max: f64,
    pub supervisor: String,
}

/// A validated submission, before authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct TensionInput {
    pub numero: String,
    pub readings: [Option<f64>; 5],
    pub num_empleado: String,
    pub password: String,
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Checks run in this order: stencil number, readings, then credentials.
pub fn parse_input(body: &Value) -> AppResult<TensionInput> {
    // `id` is only consulted when `numero` is absent or null
    let raw = match body.get("numero") {
        Some(v) if !v.is_null() => Some(v),
        _ => body.get("id"),
    };
    let numero =
        parse_stencil_number(raw).ok_or_else(|| AppError::bad_request("numero required"))?;

    let mut readings = [None; 5];
    for (slot, key) in readings.iter_mut().zip(READING_COLUMNS) {
        *slot = parse_reading(body.get(key))
            .map_err(|_| AppError::bad_request("da..de must be numeric"))?;
    }

    let num_empleado = text_field(body, "num_empleado");
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty());
    let (Some(num_empleado), Some(password)) = (num_empleado, password) else {
        return Err(AppError::bad_request("num_empleado and password required"));
    };

    Ok(TensionInput {
        numero,
        readings,
        num_empleado,
        password: password.to_string(),
    })
}

/// Store a measurement taken by `operador`. The stencil model is copied from
/// the latest metadata for the number, if any.
pub fn register(
    conn: &mut Connection,
    numero: &str,
    readings: [Option<f64>; 5],
    operador: &str,
    policy: &TensionPolicy,
    now: DateTime<Utc>,
) -> AppResult<TensionRecord> {
    let tx = conn.transaction()?;

    let model = stencils::latest_by_numero(&tx, numero)?.and_then(|s| s.model);
    let record = tensions::insert(
        &tx,
        &NewTension {
            fecha: now,
            numero,
            model: model.as_deref(),
            readings,
            min: policy.min,
            max: policy.max,
            operador,
            supervisor: &policy.supervisor,
        },
    )?;
    audit_log(
        &tx,
        "tension_add",
        numero,
        &format!("measurement {} by {operador}", record.id),
    )?;
    tx.commit()?;

    info!(numero, id = record.id, passed = record.passed(), "tension recorded");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_stencil_migrations;
    use serde_json::json;

    #[test]
    fn numero_is_checked_first() {
        let err = parse_input(&json!({ "da": "abc" })).unwrap_err();
        assert_eq!(err.to_string(), "numero required");
        let err = parse_input(&json!({ "numero": "", "da": 1 })).unwrap_err();
        assert_eq!(err.to_string(), "numero required");
    }

    #[test]
    fn readings_are_checked_before_credentials() {
        let err = parse_input(&json!({ "numero": "5", "db": "x" })).unwrap_err();
        assert_eq!(err.to_string(), "da..de must be numeric");
        let err = parse_input(&json!({ "numero": "5", "db": "2" })).unwrap_err();
        assert_eq!(err.to_string(), "num_empleado and password required");
    }

    #[test]
    fn id_is_an_alias_for_numero() {
        let input = parse_input(&json!({
            "id": 0, "da": 12.5, "de": "", "num_empleado": "0179A", "password": "pw"
        }))
        .unwrap();
        assert_eq!(input.numero, "0");
        assert_eq!(input.readings, [Some(-12.5), None, None, None, None]);
        assert_eq!(input.num_empleado, "0179A");
    }

    #[test]
    fn register_snapshots_the_stencil_model() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_stencil_migrations(&mut conn).unwrap();
        stencils::insert(&conn, "501", Some("M-A")).unwrap();
        stencils::insert(&conn, "501", Some("M-B")).unwrap();

        let policy = TensionPolicy {
            min: -30.0,
            max: -10.0,
            supervisor: "SUPERVISOR".into(),
        };
        let rec = register(
            &mut conn,
            "501",
            [Some(-20.0), None, None, None, None],
            "Ana",
            &policy,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rec.model.as_deref(), Some("M-B"));
        assert_eq!(rec.operador, "Ana");
        assert!(rec.passed());

        let unknown = register(&mut conn, "999", [None; 5], "Ana", &policy, Utc::now()).unwrap();
        assert_eq!(unknown.model, None);
    }
}
