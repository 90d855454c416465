//! Key-value preference storage contracts and implementations.
//!
//! # Responsibility
//! - Define the synchronous string-keyed store the tracker persists into.
//! - Keep SQL details behind the `KeyValueStore` boundary.
//!
//! # Invariants
//! - A key holds exactly one typed value (integer or string) at a time.
//! - Reading a key with the wrong type is reported as `InvalidData`, never
//!   coerced.
//! - Missing keys read as `Ok(None)`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqlitePreferenceStore;

/// Namespace used by the step tracker screens.
pub const DEFAULT_NAMESPACE: &str = "step_tracker";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for preference reads and writes.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted preference: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string-keyed store with integer and string values.
///
/// No transactions and no schema versioning at this level; every `put_*`
/// is an independent write.
pub trait KeyValueStore {
    fn get_int(&self, key: &str) -> StoreResult<Option<i64>>;
    fn put_int(&self, key: &str, value: i64) -> StoreResult<()>;
    fn get_string(&self, key: &str) -> StoreResult<Option<String>>;
    fn put_string(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_int(&self, key: &str) -> StoreResult<Option<i64>> {
        (**self).get_int(key)
    }

    fn put_int(&self, key: &str, value: i64) -> StoreResult<()> {
        (**self).put_int(key, value)
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).put_string(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
