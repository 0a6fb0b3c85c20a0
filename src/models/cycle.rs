//! Stencil cycles on a production line (`registros` rows) and the
//! per-line state derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub id: i64,
    /// 1-based line number.
    pub linea: i64,
    pub stencil: String,
    pub fh_i: DateTime<Utc>,
    /// Stop time, `None` while the cycle is running.
    pub fh_d: Option<DateTime<Utc>>,
    /// Completion (reset) time.
    pub fh_r: Option<DateTime<Utc>>,
    /// Started by.
    pub usuario: Option<String>,
    /// Stopped by.
    pub usuario1: Option<String>,
}

impl CycleRecord {
    pub fn is_running(&self) -> bool {
        self.fh_d.is_none()
    }

    /// Milliseconds from start to stop, or to `now` while running.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        let end = self.fh_d.unwrap_or(now);
        (end - self.fh_i).num_milliseconds().max(0)
    }

    pub fn is_completed(&self, now: DateTime<Utc>, target_ms: i64) -> bool {
        self.elapsed_ms(now) >= target_ms
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_running() {
            "En curso"
        } else {
            "Completado"
        }
    }
}

/// Dashboard view of one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineState {
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stencil: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fh_i: Option<DateTime<Utc>>,
    /// Start as epoch milliseconds, what the dashboard timer counts from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl LineState {
    /// A line that never ran a cycle.
    pub fn idle() -> Self {
        Self {
            running: false,
            stencil: None,
            fh_i: None,
            start_time: None,
            user: None,
            elapsed_ms: None,
            completed: None,
        }
    }

    pub fn from_record(rec: &CycleRecord, now: DateTime<Utc>, target_ms: i64) -> Self {
        Self {
            running: rec.is_running(),
            stencil: Some(rec.stencil.clone()),
            fh_i: Some(rec.fh_i),
            start_time: Some(rec.fh_i.timestamp_millis()),
            user: rec.usuario.clone(),
            elapsed_ms: Some(rec.elapsed_ms(now)),
            completed: Some(rec.is_completed(now, target_ms)),
        }
    }
}
