//! Credential management behind `stencil-control user`.

use crate::core::auth::hash_password;
use crate::db::log::audit_log;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub usuario: &'a str,
    pub nombre: &'a str,
    pub rol: &'a str,
    pub num_empleado: Option<&'a str>,
    pub password: &'a str,
}

pub fn add_user(conn: &mut Connection, user: &NewUser<'_>, cost: u32) -> AppResult<i64> {
    let usuario = user.usuario.trim();
    if usuario.is_empty() || user.password.is_empty() {
        return Err(AppError::bad_request("usuario and password required"));
    }

    let tx = conn.transaction()?;
    if users::find_by_login(&tx, usuario)?.is_some() {
        return Err(AppError::bad_request(format!("user '{usuario}' already exists")));
    }

    let hash = hash_password(user.password, cost)?;
    let badge = user.num_empleado.map(str::trim).filter(|b| !b.is_empty());
    let id = users::insert(&tx, usuario, user.nombre.trim(), user.rol.trim(), badge, &hash)?;
    audit_log(
        &tx,
        "user_add",
        usuario,
        &format!("{} ({})", user.nombre.trim(), user.rol.trim()),
    )?;
    tx.commit()?;
    Ok(id)
}

pub fn change_password(conn: &mut Connection, usuario: &str, password: &str, cost: u32) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::bad_request("password required"));
    }
    let hash = hash_password(password, cost)?;

    let tx = conn.transaction()?;
    if users::update_password(&tx, usuario, &hash)? == 0 {
        return Err(AppError::not_found("user not found"));
    }
    audit_log(&tx, "user_passwd", usuario, "password changed")?;
    tx.commit()?;
    Ok(())
}
