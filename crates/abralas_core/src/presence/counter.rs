//! Live participant count derived from an external membership signal.
//!
//! # Invariants
//! - Count is `others + 1` when the signal is available, otherwise `1`.
//! - Nothing is cached: every call re-reads the source.
//! - Source failures never surface to callers.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

/// External real-time membership collaborator.
///
/// Implementations return `None` when they are not connected, not yet
/// initialized, or failed; all of these mean "no peers known".
pub trait PresenceSource {
    /// Other observers in the active room, excluding this participant.
    fn other_observers(&self) -> Option<usize>;
}

impl<T: PresenceSource + ?Sized> PresenceSource for &T {
    fn other_observers(&self) -> Option<usize> {
        (**self).other_observers()
    }
}

impl<T: PresenceSource + ?Sized> PresenceSource for Rc<T> {
    fn other_observers(&self) -> Option<usize> {
        (**self).other_observers()
    }
}

impl<T: PresenceSource + ?Sized> PresenceSource for Arc<T> {
    fn other_observers(&self) -> Option<usize> {
        (**self).other_observers()
    }
}

/// Acknowledgement of a ritual join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RitualJoin {
    pub participants: usize,
}

/// Join failure. The local optimistic join never produces one; the type is
/// the contract an authoritative participant service would report through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    Unavailable,
}

impl Display for PresenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "real-time presence is unavailable"),
        }
    }
}

impl Error for PresenceError {}

pub struct PresenceCounter<P> {
    source: Option<P>,
}

impl<P: PresenceSource> PresenceCounter<P> {
    pub fn new(source: P) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Counter with no real-time subsystem at all.
    pub fn detached() -> Self {
        Self { source: None }
    }

    /// Participants including self.
    pub fn current_count(&self) -> usize {
        match self.source.as_ref().and_then(|source| source.other_observers()) {
            Some(others) => others.saturating_add(1),
            None => {
                debug!("event=presence_count module=presence status=fallback count=1");
                1
            }
        }
    }

    /// Optimistic local join; reports the locally known count.
    pub fn join_ritual(&self) -> Result<RitualJoin, PresenceError> {
        let participants = self.current_count();
        debug!(
            "event=ritual_join module=presence status=ok participants={}",
            participants
        );
        Ok(RitualJoin { participants })
    }
}
