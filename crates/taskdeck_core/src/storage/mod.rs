//! Durable key-value storage for the task slot.
//!
//! # Responsibility
//! - Define the `KeyValueStore` port the task store persists through.
//! - Open and migrate SQLite connections backing the durable implementation.
//! - Provide an in-memory implementation for tests and throwaway sessions.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - `set` replaces the whole value for a key (last write wins).

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_kv;
pub mod migrations;
mod open;
mod sqlite_kv;

pub use memory_kv::MemoryKeyValueStore;
pub use open::{open_db, open_db_in_memory};
pub use sqlite_kv::SqliteKeyValueStore;

pub type DbResult<T> = Result<T, DbError>;
pub type StorageResult<T> = Result<T, StorageError>;

/// Connection bootstrap and migration failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Key-value read/write failures.
///
/// Payload encoding is the caller's concern; JSON errors surface as
/// `StoreError::Encode` in the task store.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One-slot-per-key string storage.
///
/// Mirrors a browser-style local storage: values are opaque strings and the
/// caller owns their encoding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
