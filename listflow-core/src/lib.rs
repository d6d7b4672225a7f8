//! Incremental discovery of new or changed files on a remote
//! file-transfer endpoint.
//!
//! A long-running poller repeatedly lists a remote directory and must hand
//! downstream only what it has not already reported, across process
//! restarts and leadership handovers, on top of an unreliable remote clock
//! and unordered listings. This crate implements that tracking core:
//! - [`entity::ListableEntity`] is the uniform shape of a remote entry.
//! - [`lister::RemoteLister`] is the seam to the transfer protocol; it
//!   returns a best-effort snapshot and keeps no memory of past calls.
//! - [`tracker::Tracker`] decides what is "new": either a timestamp
//!   watermark with tie-breaking identifiers, or a sliding-window cache of
//!   per-entity `(timestamp, size)` pairs.
//! - [`poll::PollCoordinator`] runs one cycle: load persisted state, list,
//!   filter, emit in deterministic order, persist the updated state.
//!
//! The transfer protocol itself, credentials, and the physical state store
//! are external collaborators; state persistence goes through
//! `listflow_shared::store::StateStore`.

mod error;

pub use crate::error::{Error, Result};

pub mod config;
pub mod entity;
pub mod lister;
pub mod message;
pub mod poll;
pub mod state;
pub mod tracker;
