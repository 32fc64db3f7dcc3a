//! Feed use-case services.
//!
//! # Responsibility
//! - Orchestrate storage reads/writes into the operations a UI calls.
//! - Keep UI layers decoupled from storage details.

pub mod optimistic;
pub mod story_store;
