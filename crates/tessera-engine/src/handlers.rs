//! Request handlers, one per operation.
//!
//! Handlers run synchronously on a worker and never hold a store lock across
//! an await point. A fetch reply path is either consumed by `send` or dropped
//! when the handler returns, so it is closed on every path.

use tessera_protocol::{Operation, Reply, ReplySender};
use tessera_store::{Datastore, StoreResult};
use tracing::{debug, error};

/// Execute one operation against the store.
///
/// Lookup failures are logged here and returned so the caller can count them.
pub(crate) fn handle(store: &Datastore, operation: Operation) -> StoreResult<()> {
    let result = match operation {
        Operation::SetIndex { index } => store.add_index(&index).map(|_| ()),
        Operation::SetEntry {
            index,
            database,
            entry,
            object,
        } => store.set_entry(&index, &database, &entry, object),
        Operation::DeleteEntry {
            index,
            database,
            entry,
        } => store.delete_entry(&index, &database, &entry),
        Operation::ClearData {
            index,
            database,
            entry,
        } => store.clear_entry(&index, &database, &entry),
        Operation::FetchIndexes { reply } => store
            .index_names()
            .map(|names| respond(reply, Reply::Indexes(names))),
        Operation::FetchDatabases { index, reply } => store
            .database_names(&index)
            .map(|names| respond(reply, Reply::Databases(names))),
        Operation::FetchEntries {
            index,
            database,
            reply,
        } => store
            .entry_keys(&index, &database)
            .map(|keys| respond(reply, Reply::Entries(keys))),
        Operation::FetchEntry {
            index,
            database,
            entry,
            reply,
        } => store
            .fetch_entry(&index, &database, &entry)
            .map(|object| respond(reply, Reply::Entry(object))),
        Operation::FetchAllEntries {
            index,
            database,
            reply,
        } => store
            .fetch_all_entries(&index, &database)
            .map(|objects| respond(reply, Reply::Objects(objects))),
    };

    match &result {
        Ok(()) => debug!("ok"),
        Err(e) => error!(code = e.code(), error = %e, "request failed"),
    }
    result
}

fn respond(reply: ReplySender, value: Reply) {
    if !reply.send(value) {
        debug!("caller stopped waiting for reply");
    }
}
