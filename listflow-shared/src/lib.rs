//! Shared building blocks for the listflow crates.
//!
//! Currently this holds the persisted state-store seam: trackers and the
//! poll coordinator only ever see opaque bytes behind [`store::StateStore`],
//! so where the state actually lives (cluster-wide service, node-local
//! memory) is decided by whoever constructs the store.

pub mod store;
