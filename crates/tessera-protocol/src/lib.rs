//! Request protocol for the tessera datastore.
//!
//! A [`Request`] names one [`RequestKind`] and carries exactly the fields that
//! kind allows. Requests are assembled with [`RequestBuilder`], which enforces
//! the per-kind field table, or with the typed constructors on `Request`.
//!
//! Fetch requests own a single-use reply path. The worker either sends one
//! [`Reply`] on it or drops it; the waiting [`PendingReply`] then resolves to
//! `None`. Dropping an unhandled request closes its reply path the same way.

pub mod builder;
pub mod error;
pub mod kind;
pub mod reply;
pub mod request;
pub mod submit;

pub use builder::RequestBuilder;
pub use error::{Field, RequestError, RequestResult, SubmitError};
pub use kind::{FieldRules, Presence, RequestKind, Scope};
pub use reply::{reply_channel, PendingReply, Reply, ReplySender};
pub use request::{Operation, Request};
pub use submit::{request_channel, send_timeout, try_send, RequestReceiver, RequestSender};
