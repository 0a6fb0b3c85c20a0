use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::audit_log;
use crate::db::{open_credentials, open_stencil};
use crate::errors::AppResult;
use crate::ui::messages::{field, header, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - both SQLite databases with all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.stencil_db.clone(), cli.cred_db.clone(), cli.test)?;

    header("⚙️  Initializing stencil-control");
    if !cli.test {
        field("Config file", Config::config_file().display());
    }
    field("Stencil DB", &cfg.stencil_database);
    field("Credentials DB", &cfg.credentials_database);

    let stencil = open_stencil(&cfg.stencil_database)?;
    open_credentials(&cfg.credentials_database)?;

    if let Err(e) = stencil.with_conn(|conn| {
        audit_log(
            conn,
            "init",
            "",
            &format!("Database initialized at {}", cfg.stencil_database),
        )
    }) {
        warning(format!("Failed to write internal log: {e}"));
    }

    success("stencil-control initialization completed!");
    Ok(())
}
