use crate::api::{AppState, run_server};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::{open_credentials, open_stencil};
use crate::errors::AppResult;

/// Handle the `serve` command: migrate both databases, then run the API
/// until Ctrl+C or SIGTERM.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Serve { host, port } = cmd else {
        return Ok(());
    };

    let host = host.clone().unwrap_or_else(|| cfg.host.clone());
    let port = port.unwrap_or(cfg.port);

    let stencil = open_stencil(&cfg.stencil_database)?;
    let cred = open_credentials(&cfg.credentials_database)?;

    tracing::info!(
        lines = cfg.lines,
        hours = cfg.hours,
        stencil_db = %cfg.stencil_database,
        cred_db = %cfg.credentials_database,
        "starting stencil-control"
    );

    let state = AppState::new(cfg.clone(), stencil, cred);
    run_server(&format!("{host}:{port}"), state).await
}
