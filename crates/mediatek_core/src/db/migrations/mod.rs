//! Catalog schema versions.
//!
//! The schema version lives in `PRAGMA user_version`. Each step below moves a
//! database from `version - 1` to `version`; `apply_migrations` brings a
//! database from whatever it holds up to `latest_version()` in one
//! transaction.
//!
//! # Invariants
//! - Steps are numbered 1, 2, 3, ... without gaps.
//! - A database stamped with a version this build does not know is refused
//!   untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "catalog_schema",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "status_dictionaries",
        sql: include_str!("0002_dictionaries.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Upgrades `conn` to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Sqlite` when a step fails; no step is kept in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stamped = stamped_version(conn)?;
    ensure_known_version(stamped)?;

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > stamped)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in pending {
        info!(
            "event=schema_migrated module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

fn ensure_known_version(stamped: u32) -> DbResult<()> {
    let latest = latest_version();
    if stamped > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stamped,
            latest_supported: latest,
        });
    }
    Ok(())
}

fn stamped_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
