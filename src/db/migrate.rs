//! Versioned schema migrations.
//!
//! Each step runs once per database file; applied steps are recorded in the
//! `log` table as `operation = 'migration_applied'`, `target = <version>`.

use crate::db::log::audit_log;
use crate::db::stats::table_exists;
use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const STENCIL_MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_registros",
        description: "Created registros table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS registros (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            linea     INTEGER NOT NULL,
            stencil   TEXT NOT NULL,
            fh_i      TEXT NOT NULL,
            fh_d      TEXT,
            fh_r      TEXT,
            usuario   TEXT,
            usuario1  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_registros_linea ON registros(linea, id);
        CREATE INDEX IF NOT EXISTS idx_registros_fh_i ON registros(fh_i);
        "#,
    },
    Migration {
        version: "20250301_0002_create_stencil",
        description: "Created stencil table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS stencil (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            numero  TEXT NOT NULL,
            model   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_stencil_numero ON stencil(numero, id);
        "#,
    },
    Migration {
        version: "20250301_0003_create_tension",
        description: "Created tension table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS tension (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            fecha       TEXT NOT NULL,
            numero      TEXT NOT NULL,
            model       TEXT,
            da          REAL,
            db          REAL,
            dc          REAL,
            dd          REAL,
            de          REAL,
            min         REAL NOT NULL,
            max         REAL NOT NULL,
            operador    TEXT NOT NULL,
            supervisor  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tension_numero_fecha ON tension(numero, fecha);
        "#,
    },
    Migration {
        version: "20250412_0004_single_running_cycle",
        description: "Closed duplicate running cycles and added ux_registros_running",
        sql: r#"
        UPDATE registros
           SET fh_d = fh_i
         WHERE fh_d IS NULL
           AND id NOT IN (
               SELECT MAX(id) FROM registros WHERE fh_d IS NULL GROUP BY linea
           );

        CREATE UNIQUE INDEX IF NOT EXISTS ux_registros_running
            ON registros(linea) WHERE fh_d IS NULL;
        "#,
    },
];

const CREDENTIAL_MIGRATIONS: &[Migration] = &[Migration {
    version: "20250301_0001_create_users",
    description: "Created users table",
    sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            usuario       TEXT NOT NULL UNIQUE,
            nombre        TEXT NOT NULL,
            rol           TEXT NOT NULL DEFAULT 'Operador',
            num_empleado  TEXT,
            pass_hash     TEXT NOT NULL
        );
        "#,
}];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply_all(conn: &mut Connection, migrations: &[Migration]) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in migrations {
        if is_applied(conn, m.version)? {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(m.sql)
            .map_err(|e| AppError::Migration(format!("{}: {e}", m.version)))?;
        audit_log(&tx, "migration_applied", m.version, m.description)?;
        tx.commit()?;

        info!(version = m.version, "Migration applied: {}", m.description);
        applied += 1;
    }
    Ok(applied)
}

/// Run all pending migrations on the stencil database.
pub fn run_stencil_migrations(conn: &mut Connection) -> AppResult<usize> {
    apply_all(conn, STENCIL_MIGRATIONS)
}

/// Run all pending migrations on the credentials database.
pub fn run_credentials_migrations(conn: &mut Connection) -> AppResult<usize> {
    apply_all(conn, CREDENTIAL_MIGRATIONS)
}

/// Versions known to this build that are not yet applied. Read-only: a
/// database without a `log` table has every version pending.
pub fn pending_stencil_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    pending(conn, STENCIL_MIGRATIONS)
}

pub fn pending_credentials_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    pending(conn, CREDENTIAL_MIGRATIONS)
}

fn pending(conn: &Connection, migrations: &[Migration]) -> AppResult<Vec<&'static str>> {
    if !table_exists(conn, "log")? {
        return Ok(migrations.iter().map(|m| m.version).collect());
    }
    let mut out = Vec::new();
    for m in migrations {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}
