//! One poll cycle, end to end.
//!
//! The coordinator wires a [`RemoteLister`], the active [`Tracker`] and a
//! [`StateStore`] handle into a single logically-atomic step: load state,
//! list, filter, emit, persist. The host serializes triggers so at most one
//! poll per component instance is in flight; when several instances share a
//! state scope (cluster scope with leader failover), read-modify-write
//! consistency is the store's contract, not re-implemented here.
//!
//! Failure semantics:
//! - Listing failure aborts the cycle with no state mutation; fully
//!   retryable on the next trigger.
//! - A state read failure also aborts; polling with unknown history would
//!   re-emit everything.
//! - A state write failure after the emission was computed follows the
//!   at-least-once policy: the emission is still returned, state is not
//!   advanced, and the next poll re-emits. Downstream consumers must be
//!   idempotent on the entity identifier.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use listflow_shared::store::{StateScope, StateStore, state_key};

use crate::config::{EndpointConfig, TrackerConfig};
use crate::lister::RemoteLister;
use crate::message::FileRecord;
use crate::state::{TrackerState, decode_state};
use crate::tracker::Tracker;
use crate::{Error, Result};

pub struct PollCoordinator {
    endpoint: EndpointConfig,
    tracker: Tracker,
    lister: Arc<dyn RemoteLister>,
    store: Arc<dyn StateStore>,
    state_key: String,
}

impl PollCoordinator {
    /// Builds a coordinator for one component instance. Config validation
    /// happens here; an invalid config never reaches a poll cycle. The
    /// store handle decides where state physically lives: pass a
    /// cluster-scoped store to survive leadership handovers.
    pub fn new(
        endpoint: EndpointConfig,
        tracker_config: &TrackerConfig,
        lister: Arc<dyn RemoteLister>,
        store: Arc<dyn StateStore>,
        scope: StateScope,
        component_id: &str,
    ) -> Result<Self> {
        let tracker = Tracker::from_config(tracker_config)?;
        Ok(Self {
            endpoint,
            tracker,
            lister,
            store,
            state_key: state_key(scope, component_id),
        })
    }

    /// Runs one poll cycle against `path` and returns the entities that are
    /// new since the last committed cycle, ordered by
    /// `(timestamp, identifier)`. An empty result is a normal successful
    /// poll, never an error.
    pub async fn poll(&self, path: &str) -> Result<Vec<FileRecord>> {
        self.poll_at(path, Utc::now().timestamp_millis()).await
    }

    /// Same as [`poll`](Self::poll) with an explicit clock, which is what
    /// the tests drive.
    pub async fn poll_at(&self, path: &str, now_ms: i64) -> Result<Vec<FileRecord>> {
        let prior = self.load_state().await?;

        let listing = self.lister.list(path).await?;
        debug!(
            path,
            listed = listing.len(),
            strategy = ?self.tracker.strategy(),
            "remote listing complete"
        );

        let (emitted, next_state) = self.tracker.filter(&listing, prior.as_ref(), now_ms)?;
        let records: Vec<FileRecord> = emitted
            .iter()
            .map(|e| FileRecord::new(&self.endpoint, e))
            .collect();

        if let Some(next) = next_state
            && prior.as_ref() != Some(&next)
        {
            self.persist_state(&next).await;
        }

        if !records.is_empty() {
            info!(path, emitted = records.len(), "new entities discovered");
        }
        Ok(records)
    }

    async fn load_state(&self) -> Result<Option<TrackerState>> {
        let bytes = self
            .store
            .get(&self.state_key)
            .await
            .map_err(|e| Error::StatePersist(format!("reading tracker state - {e}")))?;
        match bytes {
            None => Ok(None),
            Some(bytes) => decode_state(bytes).map(Some),
        }
    }

    /// Best-effort persist, per the at-least-once policy: a failure here
    /// must not fail the poll, because the emission has already been
    /// computed and will be handed to the caller. The un-advanced state
    /// makes the next cycle re-emit the same entities.
    async fn persist_state(&self, state: &TrackerState) {
        let bytes = match Bytes::try_from(state) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to serialize tracker state, entities will be listed again");
                return;
            }
        };
        if let Err(e) = self.store.put(&self.state_key, bytes).await {
            warn!(
                error = %e,
                store = self.store.name(),
                key = %self.state_key,
                "failed to persist tracker state, entities will be listed again"
            );
        }
    }
}
