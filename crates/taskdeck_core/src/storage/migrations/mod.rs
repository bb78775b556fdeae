//! Schema versioning for the key-value database.
//!
//! # Responsibility
//! - Hold the ordered list of schema steps.
//! - Bring a connection up to the newest step inside one transaction.
//!
//! # Invariants
//! - Step `n` (1-based) is schema version `n`; steps are append-only.
//! - The applied version is mirrored to `PRAGMA user_version`.

use crate::storage::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::cmp::Ordering;

const STEPS: &[&str] = &[include_str!("0001_kv_entries.sql")];

/// Newest schema version this binary can write.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Reads the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Applies every step newer than the recorded version.
///
/// Returns the number of steps applied (0 when already current).
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a
///   newer binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    match from.cmp(&latest) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from,
                latest_supported: latest,
            })
        }
        Ordering::Equal => return Ok(0),
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for (version, sql) in (1u32..).zip(STEPS.iter()).skip(from as usize) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=storage status=ok from_version={from} to_version={latest}");
    Ok(latest - from)
}
