//! Collective presence derivation.
//!
//! # Responsibility
//! - Turn an external membership signal into a participant count.
//! - Keep the ritual particle count in step with that count.
//!
//! # Invariants
//! - An unreachable real-time subsystem means "self only", never an error.

pub mod counter;
pub mod ritual;
pub mod room;
