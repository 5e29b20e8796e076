//! Error types for datastore lookups.

use thiserror::Error;

/// Errors produced by datastore operations.
///
/// Lookup variants carry the name that failed to resolve and a stable
/// numeric [`code`](StoreError::code) so callers can branch without string
/// matching.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The named index does not exist.
    #[error("unknown index: {index}")]
    UnknownIndex { index: String },

    /// The named database does not exist in its index.
    #[error("unknown database: {database}")]
    UnknownDatabase { database: String },

    /// Either the index or the database could not be resolved.
    #[error("unknown index or database: {index}/{database}")]
    UnknownIndexOrDatabase { index: String, database: String },

    /// The entry key is absent from its database.
    #[error("unknown entry: {entry}")]
    UnknownEntry { entry: String },

    /// A lock guarding store state was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    pub const CODE_UNKNOWN_INDEX: u32 = 0;
    pub const CODE_UNKNOWN_DATABASE: u32 = 1;
    pub const CODE_UNKNOWN_INDEX_OR_DATABASE: u32 = 2;
    pub const CODE_UNKNOWN_ENTRY: u32 = 3;
    pub const CODE_LOCK_POISONED: u32 = 4;

    pub fn unknown_index(index: impl Into<String>) -> Self {
        Self::UnknownIndex {
            index: index.into(),
        }
    }

    pub fn unknown_database(database: impl Into<String>) -> Self {
        Self::UnknownDatabase {
            database: database.into(),
        }
    }

    pub fn unknown_index_or_database(index: impl Into<String>, database: impl Into<String>) -> Self {
        Self::UnknownIndexOrDatabase {
            index: index.into(),
            database: database.into(),
        }
    }

    pub fn unknown_entry(entry: impl Into<String>) -> Self {
        Self::UnknownEntry {
            entry: entry.into(),
        }
    }

    /// Numeric code of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::UnknownIndex { .. } => Self::CODE_UNKNOWN_INDEX,
            Self::UnknownDatabase { .. } => Self::CODE_UNKNOWN_DATABASE,
            Self::UnknownIndexOrDatabase { .. } => Self::CODE_UNKNOWN_INDEX_OR_DATABASE,
            Self::UnknownEntry { .. } => Self::CODE_UNKNOWN_ENTRY,
            Self::LockPoisoned(_) => Self::CODE_LOCK_POISONED,
        }
    }

    /// Returns `true` for the "name did not resolve" family of errors.
    pub fn is_lookup(&self) -> bool {
        !matches!(self, Self::LockPoisoned(_))
    }
}

/// Result alias for datastore operations.
pub type StoreResult<T> = Result<T, StoreError>;
