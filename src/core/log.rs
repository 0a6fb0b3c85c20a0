use crate::db::log::{LogEntry, list};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{header, warning};
use ansi_term::Colour;
use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

static ANSI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").unwrap());

const OP_WIDTH_MAX: usize = 40;

fn strip_ansi(s: &str) -> String {
    ANSI.replace_all(s, "").into_owned()
}

/// Colour of an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "line_start" => Colour::Green,
        "line_stop" => Colour::Red,
        "line_reset" => Colour::Yellow,
        "tension_add" => Colour::Cyan,
        "user_add" | "user_passwd" | "stencil_add" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

fn format_entry(entry: &LogEntry, id_w: usize, date_w: usize, op_w: usize) -> String {
    let colored = color_for_operation(&entry.operation)
        .paint(entry.operation.as_str())
        .to_string();
    let op_target = if entry.target.is_empty() {
        colored
    } else {
        format!("{colored} ({})", entry.target)
    };
    let visible = strip_ansi(&op_target).width();
    let padding = " ".repeat(op_w.saturating_sub(visible));

    format!(
        "{:>id_w$}: {:<date_w$} | {}{} => {}",
        entry.id, entry.date, op_target, padding, entry.message
    )
}

pub struct LogLogic;

impl LogLogic {
    /// Print the audit log of a database, oldest first.
    pub fn print_log(pool: &DbPool, limit: i64) -> AppResult<()> {
        let mut entries = pool.with_conn(|conn| list(conn, limit))?;
        entries.reverse();

        if entries.is_empty() {
            warning("The log is empty.");
            return Ok(());
        }

        let id_w = entries.iter().map(|e| e.id.to_string().len()).max().unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);
        let op_w = entries
            .iter()
            .map(|e| e.operation.width() + if e.target.is_empty() { 0 } else { e.target.width() + 3 })
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_MAX);

        header("📜 Internal log");
        for entry in &entries {
            println!("{}", format_entry(entry, id_w, date_w, op_w));
        }
        Ok(())
    }
}
