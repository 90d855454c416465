//! In-process preference store.
//!
//! Used by hosts that keep preferences elsewhere and by tests.

use super::{KeyValueStore, StoreError, StoreResult};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    Int(i64),
    Text(String),
}

/// `HashMap`-backed store with single-threaded interior mutability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str) -> StoreResult<Option<i64>> {
        match self.values.borrow().get(key) {
            None => Ok(None),
            Some(StoredValue::Int(value)) => Ok(Some(*value)),
            Some(StoredValue::Text(_)) => Err(StoreError::InvalidData(format!(
                "key `{key}` holds a string, expected integer"
            ))),
        }
    }

    fn put_int(&self, key: &str, value: i64) -> StoreResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), StoredValue::Int(value));
        Ok(())
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        match self.values.borrow().get(key) {
            None => Ok(None),
            Some(StoredValue::Text(value)) => Ok(Some(value.clone())),
            Some(StoredValue::Int(_)) => Err(StoreError::InvalidData(format!(
                "key `{key}` holds an integer, expected string"
            ))),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), StoredValue::Text(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
