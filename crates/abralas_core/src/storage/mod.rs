//! Device key-value storage port and adapters.
//!
//! # Responsibility
//! - Define the narrow read/write contract the story store depends on.
//! - Make storage availability an explicit construction-time choice.
//!
//! # Invariants
//! - Absence of a key is `Ok(None)`, never an error.
//! - `write` replaces the full value stored under a key.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

pub mod memory_kv;
pub mod sqlite_kv;

/// Key holding the JSON story feed, newest-first.
pub const FEED_KEY: &str = "abralas-relatos";
/// Reserved for ritual-session state. Nothing writes it yet.
pub const RITUAL_STATE_KEY: &str = "abralas-ritual-state";

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Connection exists but was not bootstrapped by `open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Backend refused the write (quota, read-only medium, test double).
    WriteRejected { key: String },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store connection is at schema version {actual_version}, expected {expected_version}"
            ),
            Self::WriteRejected { key } => write!(f, "storage rejected write for key `{key}`"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } | Self::WriteRejected { .. } => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent key-value store of the current device.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

/// Whether the current execution context has device storage at all.
///
/// Non-interactive contexts (headless evaluation, prerendering) are built with
/// `Unavailable`; reads then degrade to defaults and writes fail explicitly.
#[derive(Debug, Clone)]
pub enum StorageCapability<S> {
    Available(S),
    Unavailable,
}

impl<S> StorageCapability<S> {
    pub fn store(&self) -> Option<&S> {
        match self {
            Self::Available(store) => Some(store),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl<S> From<Option<S>> for StorageCapability<S> {
    fn from(value: Option<S>) -> Self {
        value.map_or(Self::Unavailable, Self::Available)
    }
}
