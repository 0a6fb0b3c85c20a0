use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::core::users::{NewUser, add_user, change_password};
use crate::db::{open_credentials, users};
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::User { action } = cmd else {
        return Ok(());
    };

    let pool = open_credentials(&cfg.credentials_database)?;

    match action {
        UserAction::Add {
            usuario,
            nombre,
            rol,
            badge,
            password,
        } => {
            let new_user = NewUser {
                usuario,
                nombre,
                rol,
                num_empleado: badge.as_deref(),
                password,
            };
            let id = pool.with_conn(|conn| add_user(conn, &new_user, cfg.bcrypt_cost))?;
            success(format!("User '{}' created (id {id}).", usuario.trim()));
        }
        UserAction::List => {
            let all = pool.with_conn(|conn| users::list(conn))?;
            if all.is_empty() {
                warning("No users registered.");
                return Ok(());
            }
            let mut table = Table::new(["ID", "Usuario", "Nombre", "Rol", "Badge"]);
            for u in all {
                table.add_row(vec![
                    u.id.to_string(),
                    u.usuario,
                    u.nombre,
                    u.rol,
                    u.num_empleado.unwrap_or_else(|| "-".into()),
                ]);
            }
            print!("{}", table.render());
        }
        UserAction::Passwd { usuario, password } => {
            pool.with_conn(|conn| change_password(conn, usuario, password, cfg.bcrypt_cost))?;
            success(format!("Password updated for '{usuario}'."));
        }
    }

    Ok(())
}
