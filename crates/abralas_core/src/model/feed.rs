//! Pure feed mutations and the persisted feed codec.
//!
//! # Responsibility
//! - Express every feed change as `(Feed, FeedCommand) -> Feed`.
//! - Encode/decode the JSON array stored under the feed key.
//!
//! # Invariants
//! - A failed command leaves the feed untouched.
//! - New stories are always inserted at the front.
//! - Endorsement increments exactly one story by exactly one.

use crate::model::story::{Feed, Story, StoryId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One mutation applied to a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    /// Insert a new story at the front of the feed.
    Prepend(Story),
    /// Add one unit of energy to the story with this id.
    Endorse(StoryId),
}

/// Result of a successfully applied command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Prepended { len: usize },
    Endorsed { energy: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommandError {
    DuplicateId(StoryId),
    StoryNotFound(StoryId),
}

impl Display for FeedCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "story id already present in feed: {id}"),
            Self::StoryNotFound(id) => write!(f, "story not found: {id}"),
        }
    }
}

impl Error for FeedCommandError {}

/// Applies one command in place.
///
/// # Contract
/// - On `Err`, `feed` is unchanged.
pub fn apply_command(
    feed: &mut Feed,
    command: FeedCommand,
) -> Result<FeedOutcome, FeedCommandError> {
    match command {
        FeedCommand::Prepend(story) => prepend(feed, story).map(|len| FeedOutcome::Prepended { len }),
        FeedCommand::Endorse(id) => {
            endorse(feed, &id).map(|energy| FeedOutcome::Endorsed { energy })
        }
    }
}

/// Inserts `story` at the front and returns the new feed length.
pub fn prepend(feed: &mut Feed, story: Story) -> Result<usize, FeedCommandError> {
    if feed.iter().any(|existing| existing.id == story.id) {
        return Err(FeedCommandError::DuplicateId(story.id));
    }
    feed.insert(0, story);
    Ok(feed.len())
}

/// Adds one unit of energy to the story with `id`, saturating at `u64::MAX`.
pub fn endorse(feed: &mut [Story], id: &str) -> Result<u64, FeedCommandError> {
    let story = feed
        .iter_mut()
        .find(|story| story.id == id)
        .ok_or_else(|| FeedCommandError::StoryNotFound(id.to_string()))?;
    story.energy = story.energy.saturating_add(1);
    Ok(story.energy)
}

/// Largest time-derived id present in the feed.
pub fn latest_issued_ms(feed: &[Story]) -> Option<i64> {
    feed.iter().filter_map(Story::issued_at_ms).max()
}

pub fn decode_feed(raw: &str) -> Result<Feed, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn encode_feed(feed: &[Story]) -> Result<String, serde_json::Error> {
    serde_json::to_string(feed)
}
