//! Pluggable persistence for tracker state.
//!
//! The tracking core persists one opaque serialized record per component
//! instance. This module defines the store interface it needs: get/put of
//! raw bytes under a scope-derived key. The trait is object-safe via
//! `async_trait` so callers can hand the coordinator an
//! `Arc<dyn StateStore>` backed by whatever the deployment provides.
//!
//! Consistency contract: when several cooperating instances share one key
//! (cluster scope with leader failover), the backing store must give them a
//! single consistent view (read-modify-write without lost updates). The
//! tracking logic assumes this and does not do its own distributed locking.

use async_trait::async_trait;
use bytes::Bytes;
use std::error::Error as StdError;

pub mod mem;

/// Error type for store operations (boxed for object safety).
pub type StoreError = Box<dyn StdError + Send + Sync + 'static>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Where a component's tracker state lives.
///
/// Cluster scope survives leadership handovers between nodes; node scope is
/// private to one process. The scope only influences the key the state is
/// filed under; the store backend decides what each scope means physically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    Cluster,
    Node,
}

impl StateScope {
    fn prefix(&self) -> &'static str {
        match self {
            StateScope::Cluster => "cluster",
            StateScope::Node => "node",
        }
    }
}

/// Derives the store key for a component instance's tracker state.
pub fn state_key(scope: StateScope, component_id: &str) -> String {
    format!("{}/{}", scope.prefix(), component_id)
}

/// Key-value persistence over opaque bytes.
///
/// Implementations must be safe to share across tasks (`Send + Sync`); the
/// coordinator serializes its own calls, so no per-key locking is required
/// beyond the consistency contract above.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the value for a key, `Ok(None)` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Insert or replace the value for a key.
    async fn put(&self, key: &str, value: Bytes) -> StoreResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Store name/identifier, used in logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_scoping() {
        assert_eq!(state_key(StateScope::Cluster, "lister-1"), "cluster/lister-1");
        assert_eq!(state_key(StateScope::Node, "lister-1"), "node/lister-1");
        assert_ne!(
            state_key(StateScope::Cluster, "a"),
            state_key(StateScope::Node, "a")
        );
    }
}
