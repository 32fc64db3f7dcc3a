//! Story feed use-case service.
//!
//! # Responsibility
//! - Sole reader/writer of the persisted feed on this device.
//! - Assign ids and timestamps to new submissions.
//! - Map storage and validation failures to explicit `StoreError` values.
//!
//! # Invariants
//! - Every mutation is read-modify-write of the full feed; the last writer
//!   wins. Overlapping mutations may lose an update.
//! - Issued ids strictly increase across calls and across restarts.
//! - `load` never fails: missing data, unreadable data and unavailable storage
//!   all yield the seed feed.
//! - Story content and names are never logged.

use crate::clock::{Clock, SystemClock};
use crate::model::feed::{
    decode_feed, encode_feed, endorse, latest_issued_ms, prepend, FeedCommandError,
};
use crate::model::story::{
    check_content, seed_feed, Feed, Story, StoryId, StoryValidationError,
};
use crate::storage::{KeyValueStore, StorageCapability, StorageError, FEED_KEY};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by story store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Submission input is missing or blank.
    Validation(StoryValidationError),
    /// Endorsement target is not in the persisted feed.
    NotFound(StoryId),
    /// No device storage in this execution context.
    Unavailable,
    /// Storage backend failed to read or write.
    Storage(StorageError),
    /// Persisted feed cannot be decoded; mutations refuse to overwrite it.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "story not found: {id}"),
            Self::Unavailable => write!(f, "device storage is unavailable in this context"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted feed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::Unavailable | Self::InvalidData(_) => None,
        }
    }
}

impl From<StoryValidationError> for StoreError {
    fn from(value: StoryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<FeedCommandError> for StoreError {
    fn from(value: FeedCommandError) -> Self {
        match value {
            FeedCommandError::StoryNotFound(id) => Self::NotFound(id),
            FeedCommandError::DuplicateId(id) => {
                Self::InvalidData(format!("story id `{id}` already present"))
            }
        }
    }
}

/// Device-local story feed store.
pub struct StoryStore<S: KeyValueStore, C: Clock = SystemClock> {
    storage: StorageCapability<S>,
    clock: C,
    last_issued_ms: Cell<i64>,
}

impl<S: KeyValueStore> StoryStore<S> {
    /// Creates a store on the wall clock.
    pub fn new(storage: StorageCapability<S>) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> StoryStore<S, C> {
    pub fn with_clock(storage: StorageCapability<S>, clock: C) -> Self {
        Self {
            storage,
            clock,
            last_issued_ms: Cell::new(i64::MIN),
        }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// Returns the persisted feed, or the seed feed when there is none.
    ///
    /// The seed feed is never written by this call.
    pub fn load(&self) -> Feed {
        let Some(storage) = self.storage.store() else {
            info!("event=feed_load module=store status=ok source=seed reason=unavailable");
            return seed_feed();
        };

        match read_feed(storage) {
            Ok(Some(feed)) => {
                info!(
                    "event=feed_load module=store status=ok source=storage len={}",
                    feed.len()
                );
                feed
            }
            Ok(None) => {
                info!("event=feed_load module=store status=ok source=seed reason=empty");
                seed_feed()
            }
            Err(err) => {
                warn!(
                    "event=feed_load module=store status=degraded source=seed error={}",
                    err
                );
                seed_feed()
            }
        }
    }

    /// Creates a story and persists it at the front of the feed.
    ///
    /// # Contract
    /// - `Unavailable` when the context has no storage.
    /// - `Validation` when `content` is absent or blank; nothing is written.
    /// - Blank or absent `name` becomes `"Anônimo"`.
    /// - The whole feed is rewritten (last writer wins).
    pub fn submit(&self, name: Option<&str>, content: Option<&str>) -> StoreResult<Story> {
        let started_at = Instant::now();
        let storage = self.storage.store().ok_or(StoreError::Unavailable)?;

        match self.submit_to(storage, name, content) {
            Ok((story, len)) => {
                info!(
                    "event=story_submit module=store status=ok story_id={} feed_len={} duration_ms={}",
                    story.id,
                    len,
                    started_at.elapsed().as_millis()
                );
                Ok(story)
            }
            Err(err) => {
                warn!(
                    "event=story_submit module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Adds one unit of energy to a persisted story and returns the new value.
    ///
    /// # Contract
    /// - `Unavailable` when the context has no storage.
    /// - `NotFound` when the id is absent; nothing is written.
    /// - Not atomic across overlapping calls.
    pub fn endorse(&self, story_id: &str) -> StoreResult<u64> {
        let started_at = Instant::now();
        let storage = self.storage.store().ok_or(StoreError::Unavailable)?;

        let result = endorse_in(storage, story_id);
        match &result {
            Ok(energy) => info!(
                "event=story_endorse module=store status=ok story_id={} energy={} duration_ms={}",
                story_id,
                energy,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=story_endorse module=store status=error story_id={} duration_ms={} error={}",
                story_id,
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }

    fn submit_to(
        &self,
        storage: &S,
        name: Option<&str>,
        content: Option<&str>,
    ) -> StoreResult<(Story, usize)> {
        check_content(content)?;
        let mut feed = read_feed(storage)?.unwrap_or_else(seed_feed);
        let now = self.clock.now();
        let now_ms = now.timestamp_millis();
        let issued_ms = self.next_issued_ms(&feed, now_ms)?;
        let date = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or(now);
        let story = Story::submitted(issued_ms.to_string(), name, content, date)?;

        let len = prepend(&mut feed, story.clone())?;
        write_feed(storage, &feed)?;
        self.last_issued_ms.set(issued_ms);
        Ok((story, len))
    }

    /// Picks an id strictly greater than anything issued or persisted so far.
    ///
    /// Fails with `InvalidData` when the largest known id is already `i64::MAX`.
    fn next_issued_ms(&self, feed: &[Story], now_ms: i64) -> StoreResult<i64> {
        let floor = latest_issued_ms(feed)
            .unwrap_or(i64::MIN)
            .max(self.last_issued_ms.get());
        if now_ms > floor {
            return Ok(now_ms);
        }
        floor.checked_add(1).ok_or_else(|| {
            StoreError::InvalidData(format!("no story id left after `{floor}`"))
        })
    }
}

/// Reads and decodes the persisted feed. `Ok(None)` when the key is unset.
fn read_feed<S: KeyValueStore>(storage: &S) -> StoreResult<Option<Feed>> {
    let Some(raw) = storage.read(FEED_KEY)? else {
        return Ok(None);
    };
    decode_feed(&raw)
        .map(Some)
        .map_err(|err| StoreError::InvalidData(err.to_string()))
}

fn endorse_in<S: KeyValueStore>(storage: &S, story_id: &str) -> StoreResult<u64> {
    let mut feed = read_feed(storage)?.unwrap_or_else(seed_feed);
    let energy = endorse(&mut feed, story_id)?;
    write_feed(storage, &feed)?;
    Ok(energy)
}

fn write_feed<S: KeyValueStore>(storage: &S, feed: &[Story]) -> StoreResult<()> {
    let encoded = encode_feed(feed).map_err(|err| StoreError::InvalidData(err.to_string()))?;
    storage.write(FEED_KEY, &encoded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{StoreError, StoryStore};
    use crate::clock::ManualClock;
    use crate::model::story::Story;
    use crate::storage::memory_kv::MemoryKeyValueStore;
    use crate::storage::StorageCapability;
    use chrono::{DateTime, Utc};

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(ms).expect("valid timestamp")
    }

    #[test]
    fn next_id_follows_clock_when_it_moves_forward() {
        let kv = MemoryKeyValueStore::new();
        let store = StoryStore::with_clock(StorageCapability::Available(&kv), ManualClock::new(at(0)));
        assert_eq!(store.next_issued_ms(&[], 1_000).unwrap(), 1_000);
    }

    #[test]
    fn next_id_bumps_past_persisted_ids_when_clock_lags() {
        let kv = MemoryKeyValueStore::new();
        let store = StoryStore::with_clock(StorageCapability::Available(&kv), ManualClock::new(at(0)));
        let persisted =
            Story::submitted("5000", None, Some("later"), at(5_000)).expect("valid story");
        assert_eq!(store.next_issued_ms(&[persisted], 1_000).unwrap(), 5_001);
    }

    #[test]
    fn next_id_fails_when_persisted_id_is_at_the_limit() {
        let kv = MemoryKeyValueStore::new();
        let store = StoryStore::with_clock(StorageCapability::Available(&kv), ManualClock::new(at(0)));
        let persisted =
            Story::submitted(i64::MAX.to_string(), None, Some("fim"), at(0)).expect("valid story");
        let err = store.next_issued_ms(&[persisted], 1_000).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidData(message) if message.contains("no story id left")
        ));
    }

    #[test]
    fn submit_truncates_date_to_millis() {
        let kv = MemoryKeyValueStore::new();
        let now = at(1_700_000_000_123) + chrono::Duration::nanoseconds(456_789);
        let store = StoryStore::with_clock(StorageCapability::Available(&kv), ManualClock::new(now));
        let story = store.submit(None, Some("hello")).unwrap();
        assert_eq!(story.date, at(1_700_000_000_123));
        assert_eq!(story.id, "1700000000123");
    }
}
