//! In-memory implementation of [`StateStore`].
//!
//! Backs node-local state scope and the test suites. Contents do not
//! survive a process restart, so cluster-scoped deployments need a real
//! backend; this one exists so the tracking core can be exercised without
//! any external service.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{StateStore, StoreResult};

/// Mutex-guarded map store. Cheap to clone state in and out; every value is
/// an owned `Bytes` so readers never observe partial writes.
pub struct InMemoryStateStore {
    name: String,
    entries: Mutex<HashMap<String, Bytes>>,
}

impl InMemoryStateStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new("in-memory")
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
