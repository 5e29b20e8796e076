use std::fmt;

use serde::{Deserialize, Serialize};

/// Every operation the datastore understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Create an index. No reply.
    SetIndex,
    /// Insert or overwrite an entry. No reply.
    SetEntry,
    /// Remove an entry. No reply.
    DeleteEntry,
    /// List index names. Replies with [`Reply::Indexes`](crate::Reply::Indexes).
    FetchIndexes,
    /// List database names of an index. Replies with [`Reply::Databases`](crate::Reply::Databases).
    FetchDatabases,
    /// List entry keys of a database. Replies with [`Reply::Entries`](crate::Reply::Entries).
    FetchEntries,
    /// Read one entry. Replies with [`Reply::Entry`](crate::Reply::Entry).
    FetchEntry,
    /// Read every object of a database. Replies with [`Reply::Objects`](crate::Reply::Objects).
    FetchAllEntries,
    /// Clear an entry's object in place. No reply.
    ClearData,
}

/// Whether a request field must be present or absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Forbidden,
}

/// Field presence table for one request kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRules {
    pub index: Presence,
    pub database: Presence,
    pub entry: Presence,
    pub payload: Presence,
    pub reply: Presence,
}

/// How the dispatcher picks a worker for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// No ordering needed relative to a key: any worker will do.
    Namespace,
    /// Ordered per (index, database) pair: always the same worker.
    Shard,
}

impl RequestKind {
    pub const ALL: [RequestKind; 9] = [
        RequestKind::SetIndex,
        RequestKind::SetEntry,
        RequestKind::DeleteEntry,
        RequestKind::FetchIndexes,
        RequestKind::FetchDatabases,
        RequestKind::FetchEntries,
        RequestKind::FetchEntry,
        RequestKind::FetchAllEntries,
        RequestKind::ClearData,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetIndex => "SetIndex",
            Self::SetEntry => "SetEntry",
            Self::DeleteEntry => "DeleteEntry",
            Self::FetchIndexes => "FetchIndexes",
            Self::FetchDatabases => "FetchDatabases",
            Self::FetchEntries => "FetchEntries",
            Self::FetchEntry => "FetchEntry",
            Self::FetchAllEntries => "FetchAllEntries",
            Self::ClearData => "ClearData",
        }
    }

    /// Returns `true` for kinds that answer over a reply path.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Self::FetchIndexes
                | Self::FetchDatabases
                | Self::FetchEntries
                | Self::FetchEntry
                | Self::FetchAllEntries
        )
    }

    pub fn scope(&self) -> Scope {
        match self {
            Self::SetIndex | Self::FetchIndexes | Self::FetchDatabases | Self::FetchEntries => {
                Scope::Namespace
            }
            Self::SetEntry
            | Self::DeleteEntry
            | Self::FetchEntry
            | Self::FetchAllEntries
            | Self::ClearData => Scope::Shard,
        }
    }

    pub fn rules(&self) -> FieldRules {
        use Presence::{Forbidden as F, Required as R};
        let (index, database, entry, payload, reply) = match self {
            Self::SetIndex => (R, F, F, F, F),
            Self::SetEntry => (R, R, R, R, F),
            Self::DeleteEntry | Self::ClearData => (R, R, R, F, F),
            Self::FetchIndexes => (F, F, F, F, R),
            Self::FetchDatabases => (R, F, F, F, R),
            Self::FetchEntries | Self::FetchAllEntries => (R, R, F, F, R),
            Self::FetchEntry => (R, R, R, F, R),
        };
        FieldRules {
            index,
            database,
            entry,
            payload,
            reply,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
