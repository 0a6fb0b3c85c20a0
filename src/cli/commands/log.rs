use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::open_stencil;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = cmd {
        let pool = open_stencil(&cfg.stencil_database)?;
        LogLogic::print_log(&pool, *limit)?;
    }

    Ok(())
}
