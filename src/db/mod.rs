//! PostgreSQL storage.
//!
//! [`Store`][crate::store::Store] and [`Admin`][crate::store::Admin] are
//! implemented directly for [`Connection`], so that any connection can be
//! passed where a store is expected.

use diesel::pg::PgConnection;
use failure::{Fail, err_msg};
use std::env;

use crate::store::StoreError;
use super::Config;

pub mod models;
pub mod schema;

mod store;

pub type Connection = PgConnection;

/// Find the correct database URL based on configuration and environment.
pub fn database_url(cfg: &Config) -> Result<String, GetDatabaseUrlError> {
    match env::var("DATABASE_URL") {
        Ok(url) => return Ok(url),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(GetDatabaseUrlError::VarInvalidUnicode);
        }
        Err(env::VarError::NotPresent) => (),
    }

    if let Some(ref db) = cfg.database {
        return Ok(db.url.clone());
    }

    Err(GetDatabaseUrlError::NotConfigured)
}

#[derive(Debug, Fail)]
pub enum GetDatabaseUrlError {
    #[fail(display = "No database connection configured")]
    NotConfigured,
    #[fail(display = "DATABASE_URL contains invalid Unicode")]
    VarInvalidUnicode,
}

/// Create a new connection, running pending migrations in release builds.
pub fn connect(cfg: &Config) -> crate::Result<Connection> {
    use diesel::Connection;

    let url = database_url(cfg)?;
    let conn = PgConnection::establish(&url).map_err(StoreError::from)?;

    if cfg!(not(debug_assertions)) {
        embedded_migrations::run_with_output(&conn, &mut std::io::stderr())
            .map_err(|_| err_msg("Migrations failed"))?;
    }

    Ok(conn)
}

// Embed migrations when building for production.
#[cfg(not(debug_assertions))]
embed_migrations!();

// `connect` requires embedded_migrations::run_with_output to typecheck, even
// if it's never used.
#[cfg(debug_assertions)]
mod embedded_migrations {
    use diesel::pg::PgConnection;
    pub fn run_with_output<W>(_: &PgConnection, _: &mut W) -> Result<(), ()> {
        Ok(())
    }
}
