//! Request and response bodies of the HTTP API.
//!
//! Request fields are optional so that missing values reach the handlers
//! and produce the documented 400 messages instead of a decoding error.

use crate::core::history::HistoryFilter;
use crate::errors::{AppError, AppResult};
use crate::models::cycle::{CycleRecord, LineState};
use crate::models::tension::TensionRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// REQUESTS
// =============================================================================

/// `{usuario, password}` as sent by login, stop and reset.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields, non-empty.
    pub fn require(self) -> AppResult<(String, String)> {
        let usuario = self.usuario.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        match (usuario, password) {
            (Some(u), Some(p)) => Ok((u, p)),
            _ => Err(AppError::bad_request("usuario and password required")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// String or bare number.
    #[serde(default)]
    pub stencil: Option<Value>,
    /// Optional name of whoever starts the cycle.
    #[serde(default)]
    pub usuario: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    pub numero: Option<String>,
    /// Alias of `numero`.
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryExportQuery {
    pub format: Option<String>,
    pub line: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl HistoryExportQuery {
    pub fn filter(&self) -> HistoryFilter {
        HistoryFilter {
            line: self.line.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            limit: None,
        }
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: String,
    pub nombre: String,
    pub rol: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub usuario: String,
    pub nombre: String,
    pub num_empleado: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinesResponse {
    pub lines: Vec<LineState>,
    pub hours: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<CycleRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub registros: Vec<CycleRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TensionResponse {
    pub record: Option<TensionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TensionsResponse {
    pub records: Vec<TensionRecord>,
}
