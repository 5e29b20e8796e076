use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::kind::RequestKind;

/// A request field subject to presence rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Index,
    Database,
    Entry,
    Payload,
    Reply,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Index => "index",
            Self::Database => "database",
            Self::Entry => "entry",
            Self::Payload => "payload",
            Self::Reply => "reply path",
        })
    }
}

/// Validation failures when building a request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request kind not set")]
    MissingKind,

    #[error("{kind} requires {field}")]
    MissingField { kind: RequestKind, field: Field },

    #[error("{kind} forbids {field}")]
    ForbiddenField { kind: RequestKind, field: Field },
}

pub type RequestResult<T> = Result<T, RequestError>;

/// Failures handing a request to a queue.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("submission timed out after {0:?}")]
    Timeout(Duration),

    #[error("request channel closed")]
    Closed,
}
