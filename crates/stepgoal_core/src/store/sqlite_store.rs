//! SQLite-backed preference store.
//!
//! # Invariants
//! - Rows are scoped by `namespace`; two stores with different namespaces on
//!   the same connection never observe each other's keys.
//! - Writes upsert; the previous value of the other type is cleared.

use super::{KeyValueStore, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Preference store over an already-migrated connection.
pub struct SqlitePreferenceStore<'conn> {
    conn: &'conn Connection,
    namespace: String,
}

impl<'conn> SqlitePreferenceStore<'conn> {
    pub fn new(conn: &'conn Connection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    fn read_row(&self, key: &str) -> StoreResult<Option<(Option<i64>, Option<String>)>> {
        let row = self
            .conn
            .query_row(
                "SELECT int_value, text_value
                 FROM preferences
                 WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace, key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }
}

impl KeyValueStore for SqlitePreferenceStore<'_> {
    fn get_int(&self, key: &str) -> StoreResult<Option<i64>> {
        match self.read_row(key)? {
            None => Ok(None),
            Some((Some(value), _)) => Ok(Some(value)),
            Some((None, _)) => Err(StoreError::InvalidData(format!(
                "key `{key}` in namespace `{}` holds a string, expected integer",
                self.namespace
            ))),
        }
    }

    fn put_int(&self, key: &str, value: i64) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (namespace, key, int_value, text_value)
             VALUES (?1, ?2, ?3, NULL)
             ON CONFLICT (namespace, key) DO UPDATE SET
                int_value = excluded.int_value,
                text_value = NULL,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        match self.read_row(key)? {
            None => Ok(None),
            Some((_, Some(value))) => Ok(Some(value)),
            Some((_, None)) => Err(StoreError::InvalidData(format!(
                "key `{key}` in namespace `{}` holds an integer, expected string",
                self.namespace
            ))),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (namespace, key, int_value, text_value)
             VALUES (?1, ?2, NULL, ?3)
             ON CONFLICT (namespace, key) DO UPDATE SET
                int_value = NULL,
                text_value = excluded.text_value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM preferences WHERE namespace = ?1 AND key = ?2;",
            params![self.namespace, key],
        )?;
        Ok(())
    }
}
