pub mod cycles;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod stats;
pub mod stencils;
pub mod tensions;
pub mod users;

use crate::errors::AppResult;
use pool::DbPool;

/// Open the stencil database and bring its schema up to date.
pub fn open_stencil(path: &str) -> AppResult<DbPool> {
    let pool = DbPool::new(path)?;
    pool.with_conn(migrate::run_stencil_migrations)?;
    Ok(pool)
}

/// Open the credentials database and bring its schema up to date.
pub fn open_credentials(path: &str) -> AppResult<DbPool> {
    let pool = DbPool::new(path)?;
    pool.with_conn(migrate::run_credentials_migrations)?;
    Ok(pool)
}
