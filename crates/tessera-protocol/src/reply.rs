use std::fmt;

use tokio::sync::oneshot;

use tessera_store::Object;

/// Result payload of a fetch request.
#[derive(Debug)]
pub enum Reply {
    Indexes(Vec<String>),
    Databases(Vec<String>),
    Entries(Vec<String>),
    Entry(Box<dyn Object>),
    /// Every object of one database, ordered by key.
    Objects(Vec<Box<dyn Object>>),
}

impl Reply {
    /// The name list carried by an `Indexes`, `Databases`, or `Entries` reply.
    pub fn into_names(self) -> Option<Vec<String>> {
        match self {
            Self::Indexes(names) | Self::Databases(names) | Self::Entries(names) => Some(names),
            Self::Entry(_) | Self::Objects(_) => None,
        }
    }

    /// The object carried by an `Entry` reply.
    pub fn into_object(self) -> Option<Box<dyn Object>> {
        match self {
            Self::Entry(object) => Some(object),
            _ => None,
        }
    }

    /// The objects carried by an `Objects` reply.
    pub fn into_objects(self) -> Option<Vec<Box<dyn Object>>> {
        match self {
            Self::Objects(objects) => Some(objects),
            _ => None,
        }
    }
}

/// Create a single-use reply path.
pub fn reply_channel() -> (ReplySender, PendingReply) {
    let (tx, rx) = oneshot::channel();
    (ReplySender(tx), PendingReply(rx))
}

/// Writing end of a reply path, owned by the request.
///
/// The path closes when this value is consumed by [`send`](Self::send) or
/// dropped, so every code path that consumes a fetch request closes it
/// exactly once.
pub struct ReplySender(oneshot::Sender<Reply>);

impl ReplySender {
    /// Deliver a reply and close the path. Returns `false` if the caller
    /// stopped waiting.
    pub fn send(self, reply: Reply) -> bool {
        self.0.send(reply).is_ok()
    }

    /// Close the path without a value.
    pub fn close(self) {}

    /// Returns `true` if the waiting side has gone away.
    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

impl fmt::Debug for ReplySender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplySender")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Waiting end of a reply path.
#[derive(Debug)]
pub struct PendingReply(oneshot::Receiver<Reply>);

impl PendingReply {
    /// Wait for the reply. `None` means the path was closed without a value:
    /// the lookup failed or the request was dropped before handling.
    pub async fn recv(self) -> Option<Reply> {
        self.0.await.ok()
    }
}
