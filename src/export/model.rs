// src/export/model.rs

use crate::models::cycle::CycleRecord;
use crate::models::tension::TensionRecord;
use crate::utils::time::{DB_FORMAT, format_duration_ms};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
}

/// One exported value. `verdict` marks readings checked against the
/// tension thresholds, spreadsheets colour them.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub verdict: Option<bool>,
}

impl Cell {
    fn new(value: CellValue) -> Self {
        Self {
            value,
            verdict: None,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::new(CellValue::Text(s.into()))
    }

    pub fn opt_text(s: Option<&str>) -> Self {
        match s {
            Some(s) => Self::text(s),
            None => Self::new(CellValue::Empty),
        }
    }

    pub fn int(n: i64) -> Self {
        Self::new(CellValue::Int(n))
    }

    pub fn float(n: Option<f64>) -> Self {
        match n {
            Some(n) => Self::new(CellValue::Float(n)),
            None => Self::new(CellValue::Empty),
        }
    }

    pub fn timestamp(ts: Option<DateTime<Utc>>) -> Self {
        match ts {
            Some(ts) => Self::new(CellValue::Timestamp(ts.naive_utc())),
            None => Self::new(CellValue::Empty),
        }
    }

    pub fn with_verdict(mut self, verdict: Option<bool>) -> Self {
        self.verdict = verdict;
        self
    }

    /// Plain text rendering, as written to CSV.
    pub fn display(&self) -> String {
        match &self.value {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(n) => n.to_string(),
            CellValue::Timestamp(ts) => ts.format(DB_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match &self.value {
            CellValue::Empty => Value::Null,
            CellValue::Int(n) => Value::from(*n),
            CellValue::Float(n) => Value::from(*n),
            _ => Value::String(self.display()),
        }
    }
}

/// A table ready to be rendered in any export format.
#[derive(Debug, Clone)]
pub struct ExportSheet {
    pub name: &'static str,
    /// Download name without extension.
    pub file_stem: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl ExportSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as objects keyed by header.
    pub fn to_json(&self) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(h, c)| (h.to_string(), c.to_json()))
                    .collect();
                Value::Object(obj)
            })
            .collect();
        Value::Array(rows)
    }
}

pub const HISTORY_HEADERS: [&str; 9] = [
    "ID",
    "Línea",
    "Stencil",
    "Inicio",
    "Fin",
    "Duración",
    "Iniciado por",
    "Detenido por",
    "Estado",
];

pub const TENSION_HEADERS: [&str; 13] = [
    "id",
    "fecha",
    "numero",
    "model",
    "da",
    "db",
    "dc",
    "dd",
    "de",
    "min",
    "max",
    "operador",
    "supervisor",
];

pub fn history_sheet(records: &[CycleRecord]) -> ExportSheet {
    let rows = records
        .iter()
        .map(|r| {
            let duration = match r.fh_d {
                Some(stop) => format_duration_ms((stop - r.fh_i).num_milliseconds()),
                None => "-".to_string(),
            };
            vec![
                Cell::int(r.id),
                Cell::int(r.linea),
                Cell::text(r.stencil.as_str()),
                Cell::timestamp(Some(r.fh_i)),
                Cell::timestamp(r.fh_d),
                Cell::text(duration),
                Cell::opt_text(r.usuario.as_deref()),
                Cell::opt_text(r.usuario1.as_deref()),
                Cell::text(r.status_label()),
            ]
        })
        .collect();

    ExportSheet {
        name: "Historial",
        file_stem: "history_export",
        headers: HISTORY_HEADERS.to_vec(),
        rows,
    }
}

pub fn tension_sheet(records: &[TensionRecord]) -> ExportSheet {
    let rows = records
        .iter()
        .map(|t| {
            let mut row = vec![
                Cell::int(t.id),
                Cell::timestamp(Some(t.fecha)),
                Cell::text(t.numero.as_str()),
                Cell::opt_text(t.model.as_deref()),
            ];
            row.extend(
                t.readings()
                    .into_iter()
                    .zip(t.verdicts())
                    .map(|(value, verdict)| Cell::float(value).with_verdict(verdict)),
            );
            row.extend([
                Cell::float(Some(t.min)),
                Cell::float(Some(t.max)),
                Cell::text(t.operador.as_str()),
                Cell::text(t.supervisor.as_str()),
            ]);
            row
        })
        .collect();

    ExportSheet {
        name: "Tensiones",
        file_stem: "tensions_export",
        headers: TENSION_HEADERS.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn running_cycles_have_no_duration() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap();
        let running = CycleRecord {
            id: 7,
            linea: 1,
            stencil: "ST-9".into(),
            fh_i: start,
            fh_d: None,
            fh_r: None,
            usuario: None,
            usuario1: None,
        };
        let stopped = CycleRecord {
            fh_d: Some(start + Duration::seconds(8 * 3600 + 125)),
            ..running.clone()
        };

        let sheet = history_sheet(&[running, stopped]);
        assert_eq!(sheet.rows[0][5].display(), "-");
        assert_eq!(sheet.rows[0][8].display(), "En curso");
        assert_eq!(sheet.rows[1][5].display(), "8h 2m 5s");
        assert_eq!(sheet.rows[1][8].display(), "Completado");
        assert_eq!(sheet.rows[0][3].display(), "2025-06-02 06:00:00");
    }

    #[test]
    fn tension_readings_carry_verdicts() {
        let rec = TensionRecord {
            id: 1,
            fecha: Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap(),
            numero: "501".into(),
            model: Some("X1".into()),
            da: Some(-20.0),
            db: Some(-40.0),
            dc: None,
            dd: None,
            de: None,
            min: -30.0,
            max: -10.0,
            operador: "Ana".into(),
            supervisor: "SUPERVISOR".into(),
        };
        let sheet = tension_sheet(&[rec]);
        let row = &sheet.rows[0];
        assert_eq!(row.len(), TENSION_HEADERS.len());
        assert_eq!(row[4].verdict, Some(true));
        assert_eq!(row[5].verdict, Some(false));
        assert_eq!(row[6].verdict, None);
        assert_eq!(row[4].display(), "-20");

        let json = sheet.to_json();
        assert_eq!(json[0]["numero"], "501");
        assert_eq!(json[0]["dc"], Value::Null);
    }
}
