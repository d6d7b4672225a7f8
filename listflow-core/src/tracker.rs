//! The "what is new" decision, behind one capability surface.
//!
//! Two strategies exist and the set is closed: callers match on nothing,
//! they hold a [`Tracker`] and call [`Tracker::filter`]. Each strategy owns
//! one persisted state shape; handing a tracker the other strategy's state
//! is corruption, not a reset (see [`crate::state`]).

use crate::config::{ListingStrategy, TrackerConfig};
use crate::entity::ListableEntity;
use crate::state::TrackerState;
use crate::{Error, Result};

pub mod entity_cache;
pub mod watermark;

pub use entity_cache::EntityCacheTracker;
pub use watermark::WatermarkTracker;

/// The active listing strategy.
#[derive(Debug, Clone)]
pub enum Tracker {
    Watermark(WatermarkTracker),
    EntityCache(EntityCacheTracker),
}

impl Tracker {
    /// Builds the tracker selected by the config. Validation happens here
    /// so an invalid config can never reach a poll cycle.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(match config.strategy {
            ListingStrategy::Watermark => Tracker::Watermark(WatermarkTracker::new(
                config.lag,
                config.initial_listing_target,
            )),
            ListingStrategy::EntityCache => Tracker::EntityCache(EntityCacheTracker::new(
                config.tracking_window,
                config.initial_listing_target,
            )),
        })
    }

    pub fn strategy(&self) -> ListingStrategy {
        match self {
            Tracker::Watermark(_) => ListingStrategy::Watermark,
            Tracker::EntityCache(_) => ListingStrategy::EntityCache,
        }
    }

    /// One filtering step: decide which of the listed entities are new
    /// relative to `state`, and compute the successor state.
    ///
    /// Pure with respect to `now_ms`; the caller supplies the clock. The
    /// emitted entities are sorted by `(timestamp, identifier)` ascending.
    /// A returned state of `None` means "still no state" (nothing was ever
    /// eligible), which keeps first-poll semantics such as the initial
    /// listing target alive for the next cycle.
    pub fn filter(
        &self,
        listing: &[ListableEntity],
        state: Option<&TrackerState>,
        now_ms: i64,
    ) -> Result<(Vec<ListableEntity>, Option<TrackerState>)> {
        match self {
            Tracker::Watermark(tracker) => {
                let prior = match state {
                    None => None,
                    Some(TrackerState::Watermark(ws)) => Some(ws),
                    Some(other) => return Err(shape_mismatch(self.strategy(), other)),
                };
                let (emitted, next) = tracker.filter(listing, prior, now_ms);
                Ok((emitted, next.map(TrackerState::Watermark)))
            }
            Tracker::EntityCache(tracker) => {
                let prior = match state {
                    None => None,
                    Some(TrackerState::EntityCache(cs)) => Some(cs),
                    Some(other) => return Err(shape_mismatch(self.strategy(), other)),
                };
                let (emitted, next) = tracker.filter(listing, prior, now_ms);
                Ok((emitted, next.map(TrackerState::EntityCache)))
            }
        }
    }
}

fn shape_mismatch(configured: ListingStrategy, found: &TrackerState) -> Error {
    Error::StateCorrupt(format!(
        "persisted state belongs to strategy {:?} but {:?} is configured; \
         refusing to reinterpret or reset it",
        found.strategy(),
        configured
    ))
}
