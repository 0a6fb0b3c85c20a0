use crate::cli::parser::{Commands, StencilAction};
use crate::config::Config;
use crate::db::log::audit_log;
use crate::db::{open_stencil, stencils};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{field, header, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Stencil { action } = cmd else {
        return Ok(());
    };

    let pool = open_stencil(&cfg.stencil_database)?;

    match action {
        StencilAction::Add { numero, model } => {
            let numero = numero.trim();
            if numero.is_empty() {
                return Err(AppError::bad_request("numero required"));
            }
            let model = model.as_deref().map(str::trim).filter(|m| !m.is_empty());
            let id = pool.with_conn(|conn| {
                let tx = conn.transaction()?;
                let id = stencils::insert(&tx, numero, model)?;
                audit_log(
                    &tx,
                    "stencil_add",
                    numero,
                    &format!("Stencil {numero} registered with model {}", model.unwrap_or("-")),
                )?;
                tx.commit()?;
                Ok(id)
            })?;
            success(format!("Stencil {numero} registered (id {id})."));
        }
        StencilAction::Show { identifier } => {
            let found = pool.with_conn(|conn| stencils::find(conn, identifier))?;
            let stencil = found.ok_or_else(|| AppError::not_found("stencil not found"))?;
            header(format!("Stencil {}", stencil.numero));
            field("ID", stencil.id);
            field("Numero", &stencil.numero);
            field("Model", stencil.model.as_deref().unwrap_or("-"));
        }
    }

    Ok(())
}
