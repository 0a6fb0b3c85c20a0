//! Operator authentication against the credentials database.
//!
//! Lookups run on the connection; bcrypt comparisons run on the blocking
//! pool without holding the connection lock.

use crate::db::pool::DbPool;
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::badge::same_badge;
use crate::models::user::User;
use tracing::{debug, warn};

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A stored hash that bcrypt cannot parse counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash.trim()) {
        Ok(ok) => ok,
        Err(e) => {
            warn!("Unusable password hash in credentials table: {e}");
            false
        }
    }
}

/// Badge lookup with normalization on both sides. First match by id wins.
pub fn find_by_badge(candidates: Vec<User>, badge: &str) -> Option<User> {
    candidates.into_iter().find(|u| {
        u.num_empleado
            .as_deref()
            .is_some_and(|stored| same_badge(stored, badge))
    })
}

async fn check_password(user: Option<User>, password: &str) -> AppResult<Option<User>> {
    let Some(user) = user else {
        return Ok(None);
    };
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        if verify_password(&password, &user.pass_hash) {
            Some(user)
        } else {
            None
        }
    })
    .await
    .map_err(|e| AppError::Other(format!("password check failed: {e}")))
}

/// Login name + password. `None` when the user is unknown or the password
/// does not match.
pub async fn authenticate_by_login(
    cred: &DbPool,
    usuario: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let login = usuario.to_string();
    let user = cred.run(move |conn| users::find_by_login(conn, &login)).await?;
    if user.is_none() {
        debug!(usuario, "login: unknown user");
    }
    check_password(user, password).await
}

/// Badge number + password, the badge being normalized first.
pub async fn authenticate_by_badge(
    cred: &DbPool,
    badge: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let user = lookup_badge(cred, badge).await?;
    if user.is_none() {
        debug!(badge, "badge login: no matching user");
    }
    check_password(user, password).await
}

pub async fn lookup_badge(cred: &DbPool, badge: &str) -> AppResult<Option<User>> {
    let badge = badge.to_string();
    cred.run(move |conn| Ok(find_by_badge(users::with_badge(conn)?, &badge)))
        .await
}
