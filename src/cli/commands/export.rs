use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::open_stencil;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        what,
        format,
        file,
        range,
        line,
        force,
    } = cmd
    {
        let pool = open_stencil(&cfg.stencil_database)?;
        ExportLogic::export(&pool, *what, *format, file, range.as_deref(), *line, *force)?;
    }
    Ok(())
}
