//! Feed domain model.
//!
//! # Responsibility
//! - Define the story record persisted on the device.
//! - Express feed mutations as pure functions over an owned feed.
//!
//! # Invariants
//! - Feed order is newest-first by insertion, never re-sorted by date.
//! - Stories are never deleted.

pub mod feed;
pub mod story;
