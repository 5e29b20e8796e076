use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use crate::index::Index;
use crate::object::Object;

/// Top-level index map.
///
/// The datastore lock is held only long enough to resolve or insert an
/// index; indexes are never removed. With `auto_index` enabled, writes to an
/// unknown index create it transparently; otherwise they fail with
/// [`StoreError::UnknownIndex`].
pub struct Datastore {
    indexes: RwLock<HashMap<String, Arc<Index>>>,
    auto_index: bool,
}

impl Datastore {
    pub fn new(auto_index: bool) -> Self {
        Self {
            indexes: RwLock::new(HashMap::new()),
            auto_index,
        }
    }

    pub fn auto_index(&self) -> bool {
        self.auto_index
    }

    /// Look up an index by name.
    pub fn get_index(&self, name: &str) -> StoreResult<Arc<Index>> {
        let indexes = self.indexes.read().map_err(poisoned)?;
        indexes
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::unknown_index(name))
    }

    /// Return the named index, creating it if absent.
    ///
    /// The boolean is `true` when this call created the index. Concurrent
    /// creators of the same name converge: exactly one observes `true`.
    pub fn get_or_create_index(&self, name: &str) -> StoreResult<(Arc<Index>, bool)> {
        if let Some(existing) = self.indexes.read().map_err(poisoned)?.get(name) {
            return Ok((Arc::clone(existing), false));
        }

        let mut indexes = self.indexes.write().map_err(poisoned)?;
        if let Some(existing) = indexes.get(name) {
            return Ok((Arc::clone(existing), false));
        }
        let index = Arc::new(Index::new(name));
        indexes.insert(name.to_string(), Arc::clone(&index));
        Ok((index, true))
    }

    /// Create an index. An existing name is left untouched and a warning is
    /// logged. Returns `true` if the index was created.
    pub fn add_index(&self, name: &str) -> StoreResult<bool> {
        let (_, created) = self.get_or_create_index(name)?;
        if created {
            debug!(index = name, "adding index");
        } else {
            warn!(index = name, "index exists");
        }
        Ok(created)
    }

    /// Sorted index names.
    pub fn index_names(&self) -> StoreResult<Vec<String>> {
        let indexes = self.indexes.read().map_err(poisoned)?;
        let mut names: Vec<String> = indexes.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn index_count(&self) -> StoreResult<usize> {
        Ok(self.indexes.read().map_err(poisoned)?.len())
    }

    /// Resolve a database through its index.
    pub fn database(&self, index: &str, database: &str) -> StoreResult<Arc<Database>> {
        self.get_index(index)?.get_database(database)
    }

    /// Sorted database names of one index.
    pub fn database_names(&self, index: &str) -> StoreResult<Vec<String>> {
        self.get_index(index)?.database_names()
    }

    /// Insert or overwrite an entry, creating the database as needed and the
    /// index when auto-indexing is enabled.
    pub fn set_entry(
        &self,
        index: &str,
        database: &str,
        key: &str,
        object: Box<dyn Object>,
    ) -> StoreResult<()> {
        let index = self.index_for_write(index)?;
        let database = index.get_or_create_database(database)?;
        database.add_entry(key, object)?;
        Ok(())
    }

    /// Remove an entry.
    pub fn delete_entry(&self, index: &str, database: &str, key: &str) -> StoreResult<()> {
        self.database(index, database)?.delete_entry(key)?;
        Ok(())
    }

    /// Clear an entry's object in place.
    pub fn clear_entry(&self, index: &str, database: &str, key: &str) -> StoreResult<()> {
        self.database(index, database)?.clear_entry(key)
    }

    /// Owned copy of the object stored at `index/database/key`.
    pub fn fetch_entry(
        &self,
        index: &str,
        database: &str,
        key: &str,
    ) -> StoreResult<Box<dyn Object>> {
        self.database(index, database)?.get_entry(key)
    }

    /// Sorted entry keys of one database.
    pub fn entry_keys(&self, index: &str, database: &str) -> StoreResult<Vec<String>> {
        self.database(index, database)?.entry_keys()
    }

    /// Owned copies of every object in one database, ordered by key.
    pub fn fetch_all_entries(
        &self,
        index: &str,
        database: &str,
    ) -> StoreResult<Vec<Box<dyn Object>>> {
        self.database(index, database)?.entries_snapshot()
    }

    fn index_for_write(&self, name: &str) -> StoreResult<Arc<Index>> {
        if !self.auto_index {
            return self.get_index(name);
        }
        let (index, created) = self.get_or_create_index(name)?;
        if created {
            debug!(index = name, "auto-adding index");
        }
        Ok(index)
    }
}

impl Default for Datastore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.indexes.read().map(|i| i.len()).unwrap_or_default();
        f.debug_struct("Datastore")
            .field("index_count", &count)
            .field("auto_index", &self.auto_index)
            .finish()
    }
}

fn poisoned(e: impl fmt::Display) -> StoreError {
    StoreError::LockPoisoned(format!("datastore: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::thread;

    #[derive(Clone, Debug, PartialEq)]
    struct Tag(String);

    impl Object for Tag {
        fn id(&self) -> String {
            self.0.clone()
        }

        fn clear(&mut self) {
            self.0.clear();
        }
    }

    fn tag(s: &str) -> Box<dyn Object> {
        Box::new(Tag(s.to_string()))
    }

    #[test]
    fn set_then_fetch() {
        let store = Datastore::new(true);
        store.set_entry("a", "b", "c", tag("payload")).unwrap();
        assert_eq!(store.fetch_entry("a", "b", "c").unwrap().id(), "payload");
    }

    #[test]
    fn auto_index_disabled_rejects_unknown_index() {
        let store = Datastore::new(false);
        let err = store.set_entry("a", "b", "c", tag("x")).unwrap_err();
        assert_eq!(err, StoreError::unknown_index("a"));
        assert!(store.index_names().unwrap().is_empty());
    }

    #[test]
    fn auto_index_disabled_allows_known_index() {
        let store = Datastore::new(false);
        store.add_index("a").unwrap();
        store.set_entry("a", "b", "c", tag("x")).unwrap();
        assert_eq!(store.entry_keys("a", "b").unwrap(), vec!["c"]);
    }

    #[test]
    fn fetch_from_missing_database() {
        let store = Datastore::new(true);
        store.add_index("a").unwrap();
        let err = store.fetch_entry("a", "never", "c").unwrap_err();
        assert_eq!(err, StoreError::unknown_database("never"));
    }

    #[test]
    fn fetch_all_entries_in_key_order() {
        let store = Datastore::new(true);
        store.set_entry("a", "b", "k2", tag("second")).unwrap();
        store.set_entry("a", "b", "k1", tag("first")).unwrap();
        store.set_entry("a", "other", "k0", tag("elsewhere")).unwrap();

        let ids: Vec<String> = store
            .fetch_all_entries("a", "b")
            .unwrap()
            .iter()
            .map(|o| o.id())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(
            store.fetch_all_entries("a", "never").unwrap_err(),
            StoreError::unknown_database("never")
        );
    }

    #[test]
    fn fetch_from_missing_index() {
        let store = Datastore::new(true);
        let err = store.fetch_entry("nope", "b", "c").unwrap_err();
        assert_eq!(err.code(), StoreError::CODE_UNKNOWN_INDEX);
    }

    #[test]
    fn add_index_twice_is_noop() {
        let store = Datastore::new(true);
        assert!(store.add_index("a").unwrap());
        store.set_entry("a", "db", "k", tag("v")).unwrap();
        assert!(!store.add_index("a").unwrap());
        assert_eq!(store.index_count().unwrap(), 1);
        // The existing index keeps its contents.
        assert_eq!(store.fetch_entry("a", "db", "k").unwrap().id(), "v");
    }

    #[test]
    fn delete_missing_entry_is_error_without_side_effects() {
        let store = Datastore::new(true);
        store.set_entry("a", "b", "keep", tag("v")).unwrap();
        assert!(store.delete_entry("a", "b", "gone").is_err());
        assert_eq!(store.entry_keys("a", "b").unwrap(), vec!["keep"]);
    }

    #[test]
    fn clear_keeps_key() {
        let store = Datastore::new(true);
        store.set_entry("a", "b", "c", tag("data")).unwrap();
        store.clear_entry("a", "b", "c").unwrap();
        store.clear_entry("a", "b", "c").unwrap();
        assert_eq!(store.fetch_entry("a", "b", "c").unwrap().id(), "");
        assert_eq!(store.entry_keys("a", "b").unwrap(), vec!["c"]);
    }

    #[test]
    fn concurrent_index_creation_has_one_winner() {
        let store = Arc::new(Datastore::new(true));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.get_or_create_index("race").unwrap().1)
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(store.index_count().unwrap(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        SetIndex(u8),
        SetEntry(u8, u8, u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4).prop_map(Op::SetIndex),
            (0u8..4, 0u8..3, 0u8..5).prop_map(|(i, d, k)| Op::SetEntry(i, d, k)),
        ]
    }

    proptest! {
        #[test]
        fn names_stay_unique(ops in proptest::collection::vec(op(), 0..64)) {
            let store = Datastore::new(true);
            let mut indexes = HashSet::new();
            let mut entries = HashSet::new();

            for (n, op) in ops.iter().enumerate() {
                match op {
                    Op::SetIndex(i) => {
                        store.add_index(&format!("i{i}")).unwrap();
                        indexes.insert(format!("i{i}"));
                    }
                    Op::SetEntry(i, d, k) => {
                        let (i, d, k) = (format!("i{i}"), format!("d{d}"), format!("k{k}"));
                        store.set_entry(&i, &d, &k, tag(&format!("v{n}"))).unwrap();
                        indexes.insert(i.clone());
                        entries.insert((i, d, k));
                    }
                }
            }

            let names = store.index_names().unwrap();
            prop_assert_eq!(names.len(), indexes.len());

            let mut stored = 0;
            for index in &names {
                for db in store.database_names(index).unwrap() {
                    stored += store.entry_keys(index, &db).unwrap().len();
                }
            }
            prop_assert_eq!(stored, entries.len());
        }
    }
}
