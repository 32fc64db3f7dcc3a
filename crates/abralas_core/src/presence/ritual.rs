//! Ritual session state backing the particle visualization.
//!
//! # Invariants
//! - `particles` follows the latest observed participant count.
//! - A successful join with a non-zero count overrides `particles`.
//! - At most `MAX_RENDERED_PARTICLES` particles are drawn.

use crate::presence::counter::{PresenceCounter, PresenceError, PresenceSource};

pub const MAX_RENDERED_PARTICLES: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RitualSession {
    particles: usize,
    joined: bool,
}

impl RitualSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the ritual and seeds the particle count from the join reply.
    pub fn join<P: PresenceSource>(
        &mut self,
        counter: &PresenceCounter<P>,
    ) -> Result<usize, PresenceError> {
        let reply = counter.join_ritual()?;
        if reply.participants > 0 {
            self.particles = reply.participants;
        }
        self.joined = true;
        Ok(self.particles)
    }

    /// Re-reads the live count; called whenever presence changes.
    pub fn sync<P: PresenceSource>(&mut self, counter: &PresenceCounter<P>) -> usize {
        self.particles = counter.current_count();
        self.particles
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn particles(&self) -> usize {
        self.particles
    }

    pub fn rendered_particles(&self) -> usize {
        self.particles.min(MAX_RENDERED_PARTICLES)
    }
}
