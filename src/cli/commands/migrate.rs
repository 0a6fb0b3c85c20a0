use crate::config::Config;
use crate::db::migrate::{run_credentials_migrations, run_stencil_migrations};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Apply pending migrations to both databases.
pub fn handle(cfg: &Config) -> AppResult<()> {
    run_all(cfg)?;
    Ok(())
}

/// Shared with `db --migrate`; returns the number of applied steps.
pub(crate) fn run_all(cfg: &Config) -> AppResult<usize> {
    info("Running migrations…");

    let stencil = DbPool::new(&cfg.stencil_database)?;
    let applied_stencil = stencil.with_conn(run_stencil_migrations)?;

    let cred = DbPool::new(&cfg.credentials_database)?;
    let applied_cred = cred.with_conn(run_credentials_migrations)?;

    let total = applied_stencil + applied_cred;
    if total == 0 {
        success("Databases already up to date.");
    } else {
        success(format!(
            "Migration completed: {applied_stencil} stencil, {applied_cred} credentials step(s)."
        ));
    }
    Ok(total)
}
