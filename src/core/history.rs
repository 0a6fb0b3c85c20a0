//! Cycle history filters as received from the dashboard.

use crate::db::cycles::HistoryQuery;
use crate::errors::{AppError, AppResult};
use crate::utils::date::{end_of_day, parse_date, start_of_day};
use serde::Deserialize;

pub const DEFAULT_LIMIT: i64 = 500;
pub const MAX_LIMIT: i64 = 5000;

/// Raw query string values. Empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilter {
    pub line: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl HistoryFilter {
    /// Validate into a database query. `limit` is clamped to
    /// `1..=MAX_LIMIT`; exports pass `with_limit = false` to get every row.
    pub fn to_query(&self, with_limit: bool) -> AppResult<HistoryQuery> {
        let linea = match present(&self.line) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| AppError::bad_request("invalid line"))?,
            ),
            None => None,
        };

        let from = match present(&self.from) {
            Some(raw) => Some(start_of_day(
                parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))?,
            )),
            None => None,
        };
        let to = match present(&self.to) {
            Some(raw) => Some(end_of_day(
                parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))?,
            )),
            None => None,
        };

        let limit = if with_limit {
            let n = match present(&self.limit) {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| AppError::bad_request("invalid limit"))?,
                None => DEFAULT_LIMIT,
            };
            Some(n.clamp(1, MAX_LIMIT))
        } else {
            None
        };

        Ok(HistoryQuery {
            linea,
            from,
            to,
            limit,
            ascending: false,
        })
    }
}
