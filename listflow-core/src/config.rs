//! Configuration consumed by the tracking core. Values only; transport
//! concerns (credentials, TLS, proxies) never reach this crate.

use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DEFAULT_TRACKING_WINDOW: Duration = Duration::from_secs(3 * 60 * 60);
const DEFAULT_REMOTE_BATCH_SIZE: usize = 5000;

/// Which algorithm decides that a remote entity is "new" since the last
/// poll. A closed set; unknown strings fail at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStrategy {
    /// Remember only the latest emitted timestamp plus the identifiers seen
    /// at exactly that timestamp. O(1)-ish state, but a rewrite with an
    /// older-or-equal timestamp is permanently invisible.
    Watermark,
    /// Remember `(timestamp, size)` per identifier inside a sliding time
    /// window. Catches in-place modifications, at O(entities-in-window)
    /// state.
    EntityCache,
}

/// Tracker-side knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub strategy: ListingStrategy,
    /// Watermark only: subtracted from "now" so entities still being
    /// written are left for a later poll.
    pub lag: Duration,
    /// EntityCache only: sliding horizon outside which cached entries are
    /// evicted. Must be non-zero for that strategy.
    pub tracking_window: Duration,
    /// First-poll lower bound (epoch millis). Entities older than this are
    /// never listed when no prior state exists.
    pub initial_listing_target: Option<i64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            strategy: ListingStrategy::Watermark,
            lag: Duration::ZERO,
            tracking_window: DEFAULT_TRACKING_WINDOW,
            initial_listing_target: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.strategy == ListingStrategy::EntityCache && self.tracking_window.is_zero() {
            return Err(Error::Config(
                "tracking window must be non-zero for the entity-cache strategy".to_string(),
            ));
        }
        Ok(())
    }
}

/// Listing-scope knobs, applied by the lister before the tracker ever sees
/// an entity. None of these change tracker semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListerConfig {
    pub recursive: bool,
    pub follow_symlinks: bool,
    /// Regex the entity name must match, if set.
    pub file_name_filter_pattern: Option<String>,
    /// Regex the entity's directory path must match, if set. Only
    /// meaningful when recursing.
    pub path_filter_pattern: Option<String>,
    pub ignore_dot_files: bool,
    /// Caps entities requested per underlying remote listing call.
    pub remote_batch_size: usize,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            follow_symlinks: false,
            file_name_filter_pattern: None,
            path_filter_pattern: None,
            ignore_dot_files: true,
            remote_batch_size: DEFAULT_REMOTE_BATCH_SIZE,
        }
    }
}

impl ListerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.remote_batch_size == 0 {
            return Err(Error::Config(
                "remote batch size must be greater than zero".to_string(),
            ));
        }
        compile_pattern(self.file_name_filter_pattern.as_deref(), "file name filter")?;
        compile_pattern(self.path_filter_pattern.as_deref(), "path filter")?;
        Ok(())
    }
}

pub(crate) fn compile_pattern(pattern: Option<&str>, what: &str) -> Result<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {what} pattern {p:?} - {e}"))),
    }
}

/// Identity of the remote endpoint, carried on every emitted record so
/// downstream can fetch the actual bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    /// Username the listing runs as, when the protocol has one.
    pub user: Option<String>,
}
