//! Object store capability.
//!
//! The sync engine only needs whole-object `put` and `get`. Transport
//! concerns (credentials, retries, endpoints) belong to the implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Failure reported by an object store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,

    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Whole-object storage addressed by slash-delimited keys.
pub trait ObjectStore {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, body)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(key)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, body)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(key)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(key, body)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(key)
    }
}

/// In-memory store that counts the requests it serves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object without counting it as a `put`.
    pub fn insert(&self, key: impl Into<String>, body: Vec<u8>) {
        self.lock().insert(key.into(), body);
    }

    /// Returns a copy of an object without counting it as a `get`.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of `put` calls served, successful or not.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `get` calls served, successful or not.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // a panicked writer cannot leave a half-inserted map entry
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.lock().insert(key.to_string(), body);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.lock().get(key).cloned().ok_or(StoreError::NotFound)
    }
}
