//! Story domain model.
//!
//! # Responsibility
//! - Define the persisted shape of one feed entry.
//! - Provide the constant seed feed returned before any data exists.
//!
//! # Invariants
//! - `id` is unique within a feed and never reused.
//! - `energy` only grows; stories are never edited or deleted.
//! - `content` is never empty for a persisted story.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Client-assigned story identifier.
///
/// Seed entries use a fixed textual id; submitted stories use the decimal
/// epoch-millisecond value they were issued at.
pub type StoryId = String;

/// Newest-first sequence of stories. Insertion order is authoritative.
pub type Feed = Vec<Story>;

/// Display name used when a submission omits one.
pub const ANONYMOUS_NAME: &str = "Anônimo";
/// Author email attached to every submitted story.
pub const DEFAULT_AUTHOR_EMAIL: &str = "anon@abralas.com";

pub const SEED_STORY_ID: &str = "init-1";
pub const SEED_STORY_NAME: &str = "Sistema";
pub const SEED_STORY_CONTENT: &str =
    "O Grimório está aberto. Suas memórias são guardadas neste dispositivo.";
/// 2025-01-01T00:00:00Z. Fixed so the seed feed is identical on every load.
const SEED_STORY_EPOCH_MS: i64 = 1_735_689_600_000;

/// One user-submitted narrative entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub name: String,
    /// Absent on the seed entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub content: String,
    /// Creation time, serialized as RFC 3339 with millisecond precision.
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    /// Endorsement counter. Older payloads may omit it.
    #[serde(default)]
    pub energy: u64,
}

/// Story validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryValidationError {
    /// Submission content is missing or blank.
    EmptyContent,
    /// Story id is blank.
    EmptyId,
}

impl Display for StoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "story content is required"),
            Self::EmptyId => write!(f, "story id must not be empty"),
        }
    }
}

impl Error for StoryValidationError {}

impl Story {
    /// Builds a freshly submitted story with zero energy.
    ///
    /// # Contract
    /// - Fails with `EmptyContent` when `content` is absent or blank.
    /// - Blank or absent `name` becomes [`ANONYMOUS_NAME`].
    pub fn submitted(
        id: impl Into<StoryId>,
        name: Option<&str>,
        content: Option<&str>,
        date: DateTime<Utc>,
    ) -> Result<Self, StoryValidationError> {
        let content = check_content(content)?;
        let story = Self {
            id: id.into(),
            name: display_name(name),
            email: Some(DEFAULT_AUTHOR_EMAIL.to_string()),
            content: content.to_string(),
            date,
            energy: 0,
        };
        story.validate()?;
        Ok(story)
    }

    /// Checks invariants that hold for every persisted story.
    pub fn validate(&self) -> Result<(), StoryValidationError> {
        if self.id.trim().is_empty() {
            return Err(StoryValidationError::EmptyId);
        }
        if self.content.trim().is_empty() {
            return Err(StoryValidationError::EmptyContent);
        }
        Ok(())
    }

    /// Numeric creation stamp encoded in the id, if the id is time-derived.
    pub fn issued_at_ms(&self) -> Option<i64> {
        self.id.parse::<i64>().ok()
    }
}

/// Returns the fixed system-authored welcome story.
pub fn seed_story() -> Story {
    Story {
        id: SEED_STORY_ID.to_string(),
        name: SEED_STORY_NAME.to_string(),
        email: None,
        content: SEED_STORY_CONTENT.to_string(),
        date: DateTime::<Utc>::from_timestamp_millis(SEED_STORY_EPOCH_MS).unwrap_or_default(),
        energy: 0,
    }
}

/// Returns the one-element feed used when nothing has been persisted.
pub fn seed_feed() -> Feed {
    vec![seed_story()]
}

/// Returns the submission content, or `EmptyContent` when absent or blank.
pub fn check_content(content: Option<&str>) -> Result<&str, StoryValidationError> {
    match content {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StoryValidationError::EmptyContent),
    }
}

fn display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => ANONYMOUS_NAME.to_string(),
    }
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, the shape browsers write for dates.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
