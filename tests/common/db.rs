//! PostgreSQL database for tests.
//!
//! Tests using the database are skipped unless `DATABASE_URL` is set. Each of
//! them works inside a transaction which is never committed, so they neither
//! see each other's data nor leave anything behind.

use diesel::{Connection, pg::PgConnection};
use failure::Fallible;
use lazy_static::lazy_static;
use std::{env, sync::Mutex};

use super::Fixture;

lazy_static! {
    /// Whether migrations were already run by this test binary.
    static ref MIGRATED: Mutex<bool> = Mutex::new(false);
}

/// Build the test library in the database.
///
/// Returns `None` when `DATABASE_URL` is not set.
pub fn fixture() -> Fallible<Option<Fixture<PgConnection>>> {
    let url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL is not set, skipping");
            return Ok(None);
        }
    };

    let conn = PgConnection::establish(&url)?;

    {
        let mut migrated = MIGRATED.lock().unwrap_or_else(|e| e.into_inner());

        if !*migrated {
            diesel_migrations::run_pending_migrations(&conn)?;
            *migrated = true;
        }
    }

    conn.begin_test_transaction()?;

    Fixture::with_store(conn).map(Some)
}
