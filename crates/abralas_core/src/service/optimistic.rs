//! Optimistic in-session view over the persisted feed.
//!
//! # Responsibility
//! - Hold the feed a UI session displays.
//! - Apply endorsements locally before the durable write, without rollback.
//!
//! # Invariants
//! - A failed durable endorse leaves the displayed energy ahead of storage
//!   until the next `refresh`.
//! - Submissions are shown only after they were persisted.

use crate::clock::Clock;
use crate::model::feed::{apply_command, FeedCommand, FeedOutcome};
use crate::model::story::{Feed, Story};
use crate::service::story_store::{StoreResult, StoryStore};
use crate::storage::KeyValueStore;
use log::debug;

/// Outcome of an optimistic endorsement.
#[derive(Debug)]
pub struct OptimisticEndorse {
    /// Energy now displayed for the story, `None` when it is not in the view.
    pub displayed_energy: Option<u64>,
    /// Result of the durable write.
    pub persisted: StoreResult<u64>,
}

impl OptimisticEndorse {
    /// Whether the displayed value is ahead of what storage accepted.
    pub fn is_diverged(&self) -> bool {
        match (&self.persisted, self.displayed_energy) {
            (Ok(stored), Some(shown)) => *stored != shown,
            (Err(_), Some(_)) => true,
            (_, None) => false,
        }
    }
}

pub struct OptimisticFeed<'store, S: KeyValueStore, C: Clock> {
    store: &'store StoryStore<S, C>,
    stories: Feed,
}

impl<'store, S: KeyValueStore, C: Clock> OptimisticFeed<'store, S, C> {
    /// Loads the current feed into a new session view.
    pub fn open(store: &'store StoryStore<S, C>) -> Self {
        Self {
            stories: store.load(),
            store,
        }
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Persists a submission and shows it at the top of the view.
    pub fn submit(&mut self, name: Option<&str>, content: Option<&str>) -> StoreResult<&Story> {
        let story = self.store.submit(name, content)?;
        self.stories.insert(0, story);
        Ok(&self.stories[0])
    }

    /// Bumps the displayed energy first, then issues the durable write.
    pub fn endorse(&mut self, story_id: &str) -> OptimisticEndorse {
        let displayed_energy =
            match apply_command(&mut self.stories, FeedCommand::Endorse(story_id.to_string())) {
                Ok(FeedOutcome::Endorsed { energy }) => Some(energy),
                Ok(FeedOutcome::Prepended { .. }) | Err(_) => None,
            };

        let persisted = self.store.endorse(story_id);
        if persisted.is_err() {
            debug!(
                "event=optimistic_endorse module=service status=diverged story_id={}",
                story_id
            );
        }

        OptimisticEndorse {
            displayed_energy,
            persisted,
        }
    }

    /// Discards local state and reloads from storage.
    pub fn refresh(&mut self) -> &[Story] {
        self.stories = self.store.load();
        &self.stories
    }
}
