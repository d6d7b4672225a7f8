//! Persisted tracker state and its byte-level codec.
//!
//! State is owned exclusively by the active tracker strategy and stored as
//! a versioned JSON envelope. Decoding fails closed: undecodable bytes or
//! an unknown schema version surface as [`Error::StateCorrupt`] instead of
//! silently resetting to empty, because an empty state would re-emit every
//! entity the component ever reported.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::ListingStrategy;
use crate::{Error, Result};

/// Bumped whenever the persisted shape changes incompatibly. Anything else
/// found in the store is rejected, never reinterpreted.
pub const STATE_VERSION: u32 = 1;

/// Watermark-strategy state: the highest timestamp emitted so far, plus the
/// identifiers already emitted at exactly that timestamp (tie-breaking).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WatermarkState {
    pub latest_timestamp: i64,
    pub identifiers_at_latest: BTreeSet<String>,
}

/// One cached observation of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntity {
    pub timestamp: i64,
    pub size: u64,
}

/// EntityCache-strategy state: last-seen `(timestamp, size)` per identifier
/// within the sliding window starting at `window_start`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityCacheState {
    pub entries: BTreeMap<String, CachedEntity>,
    pub window_start: i64,
}

/// The two mutually exclusive persisted shapes. The serde tag doubles as
/// the on-disk strategy marker, so a state written by one strategy is
/// detected (and rejected) when another strategy is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum TrackerState {
    Watermark(WatermarkState),
    EntityCache(EntityCacheState),
}

impl TrackerState {
    pub fn strategy(&self) -> ListingStrategy {
        match self {
            TrackerState::Watermark(_) => ListingStrategy::Watermark,
            TrackerState::EntityCache(_) => ListingStrategy::EntityCache,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    #[serde(flatten)]
    state: TrackerState,
}

impl TryFrom<&TrackerState> for Bytes {
    type Error = Error;

    fn try_from(state: &TrackerState) -> std::result::Result<Self, Self::Error> {
        let envelope = Envelope {
            version: STATE_VERSION,
            state: state.clone(),
        };
        let encoded = serde_json::to_vec(&envelope)
            .map_err(|e| Error::StatePersist(format!("serializing tracker state - {e}")))?;
        Ok(Bytes::from(encoded))
    }
}

impl TryFrom<Bytes> for TrackerState {
    type Error = Error;

    fn try_from(bytes: Bytes) -> std::result::Result<Self, Self::Error> {
        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| Error::StateCorrupt(format!("decoding tracker state - {e}")))?;
        if envelope.version != STATE_VERSION {
            return Err(Error::StateCorrupt(format!(
                "unsupported tracker state version {} (expected {})",
                envelope.version, STATE_VERSION
            )));
        }
        Ok(envelope.state)
    }
}

pub(crate) fn decode_state(bytes: Bytes) -> Result<TrackerState> {
    TrackerState::try_from(bytes)
}
