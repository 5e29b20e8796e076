use chrono::Utc;

use tessera_store::Object;

use crate::builder::RequestBuilder;
use crate::error::RequestResult;
use crate::kind::RequestKind;
use crate::reply::{reply_channel, PendingReply, ReplySender};

/// The validated shape of a request, one variant per kind.
///
/// Each variant carries exactly the fields its kind allows, so a request that
/// reaches a worker cannot be missing a key or carry a stray payload.
#[derive(Debug)]
pub enum Operation {
    SetIndex {
        index: String,
    },
    SetEntry {
        index: String,
        database: String,
        entry: String,
        object: Box<dyn Object>,
    },
    DeleteEntry {
        index: String,
        database: String,
        entry: String,
    },
    FetchIndexes {
        reply: ReplySender,
    },
    FetchDatabases {
        index: String,
        reply: ReplySender,
    },
    FetchEntries {
        index: String,
        database: String,
        reply: ReplySender,
    },
    FetchEntry {
        index: String,
        database: String,
        entry: String,
        reply: ReplySender,
    },
    FetchAllEntries {
        index: String,
        database: String,
        reply: ReplySender,
    },
    ClearData {
        index: String,
        database: String,
        entry: String,
    },
}

impl Operation {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::SetIndex { .. } => RequestKind::SetIndex,
            Self::SetEntry { .. } => RequestKind::SetEntry,
            Self::DeleteEntry { .. } => RequestKind::DeleteEntry,
            Self::FetchIndexes { .. } => RequestKind::FetchIndexes,
            Self::FetchDatabases { .. } => RequestKind::FetchDatabases,
            Self::FetchEntries { .. } => RequestKind::FetchEntries,
            Self::FetchEntry { .. } => RequestKind::FetchEntry,
            Self::FetchAllEntries { .. } => RequestKind::FetchAllEntries,
            Self::ClearData { .. } => RequestKind::ClearData,
        }
    }
}

/// A unit of work travelling from a producer to a worker.
#[derive(Debug)]
pub struct Request {
    operation: Operation,
    timestamp: i64,
}

impl Request {
    pub(crate) fn from_parts(operation: Operation, timestamp: i64) -> Self {
        Self {
            operation,
            timestamp,
        }
    }

    /// Start building a request.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    pub fn set_index(index: impl Into<String>) -> RequestResult<Self> {
        Self::unanswered(Self::builder().kind(RequestKind::SetIndex).index(index))
    }

    pub fn set_entry(
        index: impl Into<String>,
        database: impl Into<String>,
        entry: impl Into<String>,
        object: Box<dyn Object>,
    ) -> RequestResult<Self> {
        Self::unanswered(
            Self::builder()
                .kind(RequestKind::SetEntry)
                .index(index)
                .database(database)
                .entry(entry)
                .payload(object),
        )
    }

    pub fn delete_entry(
        index: impl Into<String>,
        database: impl Into<String>,
        entry: impl Into<String>,
    ) -> RequestResult<Self> {
        Self::unanswered(
            Self::builder()
                .kind(RequestKind::DeleteEntry)
                .index(index)
                .database(database)
                .entry(entry),
        )
    }

    pub fn clear_data(
        index: impl Into<String>,
        database: impl Into<String>,
        entry: impl Into<String>,
    ) -> RequestResult<Self> {
        Self::unanswered(
            Self::builder()
                .kind(RequestKind::ClearData)
                .index(index)
                .database(database)
                .entry(entry),
        )
    }

    /// List every index. Has no fields to validate.
    pub fn fetch_indexes() -> (Self, PendingReply) {
        let (reply, pending) = reply_channel();
        let request = Self::from_parts(Operation::FetchIndexes { reply }, now_millis());
        (request, pending)
    }

    pub fn fetch_databases(index: impl Into<String>) -> RequestResult<(Self, PendingReply)> {
        Self::answered(Self::builder().kind(RequestKind::FetchDatabases).index(index))
    }

    pub fn fetch_entries(
        index: impl Into<String>,
        database: impl Into<String>,
    ) -> RequestResult<(Self, PendingReply)> {
        Self::answered(
            Self::builder()
                .kind(RequestKind::FetchEntries)
                .index(index)
                .database(database),
        )
    }

    pub fn fetch_entry(
        index: impl Into<String>,
        database: impl Into<String>,
        entry: impl Into<String>,
    ) -> RequestResult<(Self, PendingReply)> {
        Self::answered(
            Self::builder()
                .kind(RequestKind::FetchEntry)
                .index(index)
                .database(database)
                .entry(entry),
        )
    }

    pub fn fetch_all_entries(
        index: impl Into<String>,
        database: impl Into<String>,
    ) -> RequestResult<(Self, PendingReply)> {
        Self::answered(
            Self::builder()
                .kind(RequestKind::FetchAllEntries)
                .index(index)
                .database(database),
        )
    }

    fn unanswered(builder: RequestBuilder) -> RequestResult<Self> {
        builder.build().map(|(request, _)| request)
    }

    fn answered(builder: RequestBuilder) -> RequestResult<(Self, PendingReply)> {
        let (reply, pending) = reply_channel();
        let (request, _) = builder.reply_to(reply).build()?;
        Ok((request, pending))
    }

    pub fn kind(&self) -> RequestKind {
        self.operation.kind()
    }

    /// Milliseconds since the Unix epoch, stamped at build time.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn into_operation(self) -> Operation {
        self.operation
    }

    pub fn index(&self) -> Option<&str> {
        match &self.operation {
            Operation::FetchIndexes { .. } => None,
            Operation::SetIndex { index }
            | Operation::SetEntry { index, .. }
            | Operation::DeleteEntry { index, .. }
            | Operation::FetchDatabases { index, .. }
            | Operation::FetchEntries { index, .. }
            | Operation::FetchEntry { index, .. }
            | Operation::FetchAllEntries { index, .. }
            | Operation::ClearData { index, .. } => Some(index),
        }
    }

    pub fn database(&self) -> Option<&str> {
        match &self.operation {
            Operation::SetIndex { .. }
            | Operation::FetchIndexes { .. }
            | Operation::FetchDatabases { .. } => None,
            Operation::SetEntry { database, .. }
            | Operation::DeleteEntry { database, .. }
            | Operation::FetchEntries { database, .. }
            | Operation::FetchEntry { database, .. }
            | Operation::FetchAllEntries { database, .. }
            | Operation::ClearData { database, .. } => Some(database),
        }
    }

    pub fn entry(&self) -> Option<&str> {
        match &self.operation {
            Operation::SetEntry { entry, .. }
            | Operation::DeleteEntry { entry, .. }
            | Operation::FetchEntry { entry, .. }
            | Operation::ClearData { entry, .. } => Some(entry),
            _ => None,
        }
    }
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
