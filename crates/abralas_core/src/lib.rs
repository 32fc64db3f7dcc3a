//! Device-local story feed and collective presence core for Abralas.
//! This crate is the single source of truth for feed invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod presence;
pub mod service;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::feed::{apply_command, FeedCommand, FeedCommandError, FeedOutcome};
pub use model::story::{
    seed_feed, seed_story, Feed, Story, StoryId, StoryValidationError, ANONYMOUS_NAME,
    SEED_STORY_ID,
};
pub use presence::counter::{PresenceCounter, PresenceError, PresenceSource, RitualJoin};
pub use presence::ritual::{RitualSession, MAX_RENDERED_PARTICLES};
pub use presence::room::{ConnectionStatus, PeerId, RoomPresence};
pub use service::optimistic::{OptimisticEndorse, OptimisticFeed};
pub use service::story_store::{StoreError, StoreResult, StoryStore};
pub use storage::memory_kv::MemoryKeyValueStore;
pub use storage::sqlite_kv::SqliteKeyValueStore;
pub use storage::{
    KeyValueStore, StorageCapability, StorageError, StorageResult, FEED_KEY, RITUAL_STATE_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
