use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::{pending_credentials_migrations, pending_stencil_migrations};
use crate::db::pool::DbPool;
use crate::db::stats::{self, DbInfo};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, field, header, info, success};
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    //
    // 1) MIGRATE
    //
    if *migrate {
        super::migrate::run_all(cfg)?;
    }

    //
    // 2) INFO
    //
    if *show_info {
        let pool = open_existing(&cfg.stencil_database)?;
        let db_info = pool.with_conn(|conn| stats::collect_info(conn, pool.path()))?;
        print_info(&cfg.stencil_database, &db_info);

        let stencil_pending = pool.with_conn(|conn| pending_stencil_migrations(conn))?;
        let cred = open_existing(&cfg.credentials_database)?;
        let cred_pending = cred.with_conn(|conn| pending_credentials_migrations(conn))?;
        field("Pending migrations (stencil)", pending_label(&stencil_pending));
        field("Pending migrations (credentials)", pending_label(&cred_pending));
    }

    //
    // 3) CHECK
    //
    if *check {
        for path in [&cfg.stencil_database, &cfg.credentials_database] {
            info(format!("Running integrity check on {path}…"));
            let pool = open_existing(path)?;
            let problems = pool.with_conn(|conn| stats::integrity_check(conn))?;
            if problems.is_empty() {
                success("Integrity check passed.");
            } else {
                error(format!("Integrity check failed: {}", problems.join("; ")));
            }
        }
    }

    //
    // 4) VACUUM
    //
    if *vacuum {
        let pool = DbPool::new(&cfg.stencil_database)?;
        info("Running VACUUM…");
        pool.with_conn(|conn| stats::vacuum(conn))?;
        success("Vacuum completed.");
    }

    Ok(())
}

/// Inspection never creates a database file.
fn open_existing(path: &str) -> AppResult<DbPool> {
    if !Path::new(path).exists() {
        return Err(AppError::NotFound(format!("database not found: {path}")));
    }
    DbPool::new(path)
}

fn print_info(path: &str, db: &DbInfo) {
    header("🗄️  Database information");
    field("Path", path);
    field("Size", format!("{:.2} MB", db.size_mb()));
    for (table, count) in &db.tables {
        field(format!("Rows in {table}"), count);
    }
    field("First cycle", db.first_cycle.as_deref().unwrap_or("-"));
    field("Last cycle", db.last_cycle.as_deref().unwrap_or("-"));
}

fn pending_label(versions: &[&str]) -> String {
    if versions.is_empty() {
        "none".to_string()
    } else {
        versions.join(", ")
    }
}
