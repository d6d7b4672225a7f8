//! Per-entity tracked-cache strategy.
//!
//! Remembers the last-seen `(timestamp, size)` of every entity reported
//! within a sliding time window, and re-emits an entity only when that pair
//! changes. This catches in-place modifications and rewrites with older
//! timestamps (the cases the watermark strategy is blind to) at the cost
//! of state proportional to the number of entities inside the window.
//!
//! The window bounds memory, and the bound has a documented hazard: an
//! entry evicted by window expiry loses its history, so if the entity shows
//! up in a later listing (even byte-for-byte unchanged) it is treated as
//! new and emitted again. Size the window above the remote's listing
//! horizon to keep that from recurring.

use std::time::Duration;

use crate::entity::{ListableEntity, sort_for_emission};
use crate::state::{CachedEntity, EntityCacheState};

#[derive(Debug, Clone)]
pub struct EntityCacheTracker {
    tracking_window: Duration,
    initial_listing_target: Option<i64>,
}

impl EntityCacheTracker {
    pub fn new(tracking_window: Duration, initial_listing_target: Option<i64>) -> Self {
        Self {
            tracking_window,
            initial_listing_target,
        }
    }

    /// Filters one listing against the cache.
    ///
    /// Eviction first (stored timestamps older than the window go away),
    /// then the diff: absent-or-changed entities are candidates. Candidates
    /// inside the window are upserted; candidates already older than the
    /// window are emitted but never cached; there is nothing to suppress
    /// them with later, which is the hazard described above.
    pub fn filter(
        &self,
        listing: &[ListableEntity],
        state: Option<&EntityCacheState>,
        now_ms: i64,
    ) -> (Vec<ListableEntity>, Option<EntityCacheState>) {
        let window_ms = i64::try_from(self.tracking_window.as_millis()).unwrap_or(i64::MAX);
        let window_start = now_ms.saturating_sub(window_ms);
        let first_poll = state.is_none();

        let mut entries = state.map(|s| s.entries.clone()).unwrap_or_default();
        entries.retain(|_, cached| cached.timestamp >= window_start);

        let mut emitted: Vec<ListableEntity> = listing
            .iter()
            .filter(|e| {
                if first_poll
                    && let Some(target) = self.initial_listing_target
                    && e.timestamp < target
                {
                    return false;
                }
                match entries.get(&e.identifier) {
                    None => true,
                    Some(cached) => cached.timestamp != e.timestamp || cached.size != e.size,
                }
            })
            .cloned()
            .collect();
        sort_for_emission(&mut emitted);

        for e in &emitted {
            if e.timestamp >= window_start {
                entries.insert(
                    e.identifier.clone(),
                    CachedEntity {
                        timestamp: e.timestamp,
                        size: e.size,
                    },
                );
            }
        }

        if first_poll && emitted.is_empty() && entries.is_empty() {
            // Nothing was ever eligible: stay stateless so the initial
            // listing target still applies to the next cycle.
            return (emitted, None);
        }

        (
            emitted,
            Some(EntityCacheState {
                entries,
                window_start,
            }),
        )
    }
}
