//! stencil-control library root.
//! Exposes the CLI parser, the HTTP API, the high-level run() function and internal modules.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use utils::path::expand_tilde;

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Serve { .. } => cli::commands::serve::handle(&cli.command, cfg).await,
        Commands::Migrate => cli::commands::migrate::handle(cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::User { .. } => cli::commands::user::handle(&cli.command, cfg),
        Commands::Stencil { .. } => cli::commands::stencil::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Test mode never reads the user's config file.
    let mut cfg = if cli.test {
        let mut cfg = Config::default();
        cfg.apply_env();
        cfg
    } else {
        Config::load()?
    };

    if let Some(path) = &cli.stencil_db {
        cfg.stencil_database = expand_tilde(path).to_string_lossy().to_string();
    }
    if let Some(path) = &cli.cred_db {
        cfg.credentials_database = expand_tilde(path).to_string_lossy().to_string();
    }

    dispatch(&cli, &cfg).await
}
