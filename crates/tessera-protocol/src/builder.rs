use tessera_store::Object;

use crate::error::{Field, RequestError, RequestResult};
use crate::kind::{Presence, RequestKind};
use crate::reply::{reply_channel, PendingReply, ReplySender};
use crate::request::{now_millis, Operation, Request};

/// Fluent constructor for [`Request`].
///
/// Setters never fail. Empty strings are treated as absent. All field rules
/// are checked by [`validate`](Self::validate), which has no side effects and
/// may be called any number of times; [`build`](Self::build) runs the same
/// checks and, for fetch kinds without an attached reply path, allocates one
/// and hands back its waiting end.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    kind: Option<RequestKind>,
    index: Option<String>,
    database: Option<String>,
    entry: Option<String>,
    payload: Option<Box<dyn Object>>,
    reply: Option<ReplySender>,
    timestamp: Option<i64>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: RequestKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = non_empty(index.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = non_empty(database.into());
        self
    }

    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = non_empty(entry.into());
        self
    }

    pub fn payload(mut self, object: Box<dyn Object>) -> Self {
        self.payload = Some(object);
        self
    }

    /// Attach an existing reply path instead of letting `build` allocate one.
    pub fn reply_to(mut self, reply: ReplySender) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Override the build-time timestamp (milliseconds since the epoch).
    pub fn timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Check the field rules for the configured kind.
    ///
    /// A missing reply path is not an error: `build` supplies one.
    pub fn validate(&self) -> RequestResult<RequestKind> {
        let kind = self.kind.ok_or(RequestError::MissingKind)?;
        let rules = kind.rules();

        check(kind, Field::Index, rules.index, self.index.is_some())?;
        check(kind, Field::Database, rules.database, self.database.is_some())?;
        check(kind, Field::Entry, rules.entry, self.entry.is_some())?;
        check(kind, Field::Payload, rules.payload, self.payload.is_some())?;
        if rules.reply == Presence::Forbidden && self.reply.is_some() {
            return Err(RequestError::ForbiddenField {
                kind,
                field: Field::Reply,
            });
        }
        Ok(kind)
    }

    /// Validate and produce the request.
    ///
    /// The second element is `Some` only when this call allocated the reply
    /// path; a caller that attached its own already holds the waiting end.
    pub fn build(self) -> RequestResult<(Request, Option<PendingReply>)> {
        let kind = self.validate()?;
        let timestamp = self.timestamp.unwrap_or_else(now_millis);

        let (reply, pending) = match (kind.expects_reply(), self.reply) {
            (true, Some(reply)) => (Some(reply), None),
            (true, None) => {
                let (reply, pending) = reply_channel();
                (Some(reply), Some(pending))
            }
            (false, _) => (None, None),
        };

        let index = self.index;
        let database = self.database;
        let entry = self.entry;

        let operation = match kind {
            RequestKind::SetIndex => Operation::SetIndex {
                index: require(kind, Field::Index, index)?,
            },
            RequestKind::SetEntry => Operation::SetEntry {
                index: require(kind, Field::Index, index)?,
                database: require(kind, Field::Database, database)?,
                entry: require(kind, Field::Entry, entry)?,
                object: require(kind, Field::Payload, self.payload)?,
            },
            RequestKind::DeleteEntry => Operation::DeleteEntry {
                index: require(kind, Field::Index, index)?,
                database: require(kind, Field::Database, database)?,
                entry: require(kind, Field::Entry, entry)?,
            },
            RequestKind::ClearData => Operation::ClearData {
                index: require(kind, Field::Index, index)?,
                database: require(kind, Field::Database, database)?,
                entry: require(kind, Field::Entry, entry)?,
            },
            RequestKind::FetchIndexes => Operation::FetchIndexes {
                reply: require(kind, Field::Reply, reply)?,
            },
            RequestKind::FetchDatabases => Operation::FetchDatabases {
                index: require(kind, Field::Index, index)?,
                reply: require(kind, Field::Reply, reply)?,
            },
            RequestKind::FetchEntries => Operation::FetchEntries {
                index: require(kind, Field::Index, index)?,
                database: require(kind, Field::Database, database)?,
                reply: require(kind, Field::Reply, reply)?,
            },
            RequestKind::FetchAllEntries => Operation::FetchAllEntries {
                index: require(kind, Field::Index, index)?,
                database: require(kind, Field::Database, database)?,
                reply: require(kind, Field::Reply, reply)?,
            },
            RequestKind::FetchEntry => Operation::FetchEntry {
                index: require(kind, Field::Index, index)?,
                database: require(kind, Field::Database, database)?,
                entry: require(kind, Field::Entry, entry)?,
                reply: require(kind, Field::Reply, reply)?,
            },
        };

        Ok((Request::from_parts(operation, timestamp), pending))
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn check(kind: RequestKind, field: Field, rule: Presence, present: bool) -> RequestResult<()> {
    match (rule, present) {
        (Presence::Required, false) => Err(RequestError::MissingField { kind, field }),
        (Presence::Forbidden, true) => Err(RequestError::ForbiddenField { kind, field }),
        _ => Ok(()),
    }
}

fn require<T>(kind: RequestKind, field: Field, value: Option<T>) -> RequestResult<T> {
    value.ok_or(RequestError::MissingField { kind, field })
}
