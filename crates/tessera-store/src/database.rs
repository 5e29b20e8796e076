use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entry::Entry;
use crate::error::{StoreError, StoreResult};
use crate::object::Object;

/// A named collection of entries behind a single read/write lock.
///
/// Reads (lookups, key listings) take the shared side of the lock so
/// concurrent fetches do not serialize; every mutation takes the exclusive
/// side. `last_access` is tracked for future eviction and updated on every
/// read or write.
pub struct Database {
    name: String,
    entries: RwLock<HashMap<String, Entry>>,
    last_access: AtomicI64,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            last_access: AtomicI64::new(now_millis()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Milliseconds since the UNIX epoch of the last read or write.
    pub fn last_access(&self) -> i64 {
        self.last_access.load(Ordering::Relaxed)
    }

    /// Return an owned copy of the object stored under `key`.
    pub fn get_entry(&self, key: &str) -> StoreResult<Box<dyn Object>> {
        let entries = self.read()?;
        entries
            .get(key)
            .map(Entry::snapshot)
            .ok_or_else(|| StoreError::unknown_entry(key))
    }

    /// Returns `true` if an entry is stored under `key`.
    pub fn contains_entry(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(key))
    }

    /// Insert or overwrite the entry under `key`.
    ///
    /// Returns the object previously stored there, if any.
    pub fn add_entry(
        &self,
        key: impl Into<String>,
        object: Box<dyn Object>,
    ) -> StoreResult<Option<Box<dyn Object>>> {
        let mut entries = self.write()?;
        let previous = entries.insert(key.into(), Entry::new(object));
        Ok(previous.map(Entry::into_object))
    }

    /// Remove the entry under `key`, returning its object.
    pub fn delete_entry(&self, key: &str) -> StoreResult<Box<dyn Object>> {
        let mut entries = self.write()?;
        entries
            .remove(key)
            .map(Entry::into_object)
            .ok_or_else(|| StoreError::unknown_entry(key))
    }

    /// Clear the object under `key` in place. The entry itself is kept.
    pub fn clear_entry(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.write()?;
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| StoreError::unknown_entry(key))?;
        entry.clear();
        Ok(())
    }

    /// Sorted list of all entry keys.
    pub fn entry_keys(&self) -> StoreResult<Vec<String>> {
        let entries = self.read()?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Owned copies of every stored object, ordered by key.
    pub fn entries_snapshot(&self) -> StoreResult<Vec<Box<dyn Object>>> {
        let entries = self.read()?;
        let mut pairs: Vec<(&String, &Entry)> = entries.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        Ok(pairs.into_iter().map(|(_, entry)| entry.snapshot()).collect())
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Entry>>> {
        let guard = self
            .entries
            .read()
            .map_err(|e| StoreError::LockPoisoned(format!("database {}: {e}", self.name)))?;
        self.touch();
        Ok(guard)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        let guard = self
            .entries
            .write()
            .map_err(|e| StoreError::LockPoisoned(format!("database {}: {e}", self.name)))?;
        self.touch();
        Ok(guard)
    }

    fn touch(&self) {
        self.last_access.fetch_max(now_millis(), Ordering::Relaxed);
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("entry_count", &count)
            .field("last_access", &self.last_access())
            .finish()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Clone, Debug, PartialEq)]
    struct Reading {
        sensor: String,
        values: Vec<u32>,
    }

    impl Object for Reading {
        fn id(&self) -> String {
            self.sensor.clone()
        }

        fn clear(&mut self) {
            self.values.clear();
        }
    }

    fn reading(sensor: &str, values: &[u32]) -> Box<dyn Object> {
        Box::new(Reading {
            sensor: sensor.into(),
            values: values.to_vec(),
        })
    }

    fn values_of(obj: &(dyn Object + 'static)) -> Vec<u32> {
        obj.downcast_ref::<Reading>().unwrap().values.clone()
    }

    #[test]
    fn add_and_get_entry() {
        let db = Database::new("db");
        assert!(db.add_entry("k", reading("s1", &[1, 2])).unwrap().is_none());

        let got = db.get_entry("k").unwrap();
        assert_eq!(got.id(), "s1");
        assert_eq!(values_of(got.as_ref()), vec![1, 2]);
    }

    #[test]
    fn add_overwrites_and_returns_previous() {
        let db = Database::new("db");
        db.add_entry("k", reading("first", &[1])).unwrap();
        let previous = db.add_entry("k", reading("second", &[2])).unwrap();

        assert_eq!(previous.unwrap().id(), "first");
        assert_eq!(db.get_entry("k").unwrap().id(), "second");
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn get_missing_entry_is_unknown_entry() {
        let db = Database::new("db");
        let err = db.get_entry("nope").unwrap_err();
        assert_eq!(err, StoreError::unknown_entry("nope"));
        assert_eq!(err.code(), StoreError::CODE_UNKNOWN_ENTRY);
    }

    #[test]
    fn delete_removes_entry() {
        let db = Database::new("db");
        db.add_entry("k", reading("s", &[1])).unwrap();
        let removed = db.delete_entry("k").unwrap();
        assert_eq!(removed.id(), "s");
        assert!(!db.contains_entry("k").unwrap());
        assert!(db.delete_entry("k").is_err());
    }

    #[test]
    fn clear_keeps_entry_and_is_idempotent() {
        let db = Database::new("db");
        db.add_entry("k", reading("s", &[1, 2, 3])).unwrap();

        db.clear_entry("k").unwrap();
        let once = values_of(db.get_entry("k").unwrap().as_ref());
        db.clear_entry("k").unwrap();
        let twice = values_of(db.get_entry("k").unwrap().as_ref());

        assert!(once.is_empty());
        assert_eq!(once, twice);
        assert!(db.contains_entry("k").unwrap());
    }

    #[test]
    fn clear_missing_entry_errors() {
        let db = Database::new("db");
        assert_eq!(
            db.clear_entry("k").unwrap_err(),
            StoreError::unknown_entry("k")
        );
    }

    #[test]
    fn fetched_snapshot_does_not_alias_store() {
        let db = Database::new("db");
        db.add_entry("k", reading("s", &[9])).unwrap();
        let mut snapshot = db.get_entry("k").unwrap();
        snapshot.clear();
        assert_eq!(values_of(db.get_entry("k").unwrap().as_ref()), vec![9]);
    }

    #[test]
    fn entry_keys_are_sorted() {
        let db = Database::new("db");
        for key in ["c", "a", "b"] {
            db.add_entry(key, reading(key, &[])).unwrap();
        }
        assert_eq!(db.entry_keys().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn entries_snapshot_is_ordered_and_owned() {
        let db = Database::new("db");
        for (key, value) in [("b", 2), ("c", 3), ("a", 1)] {
            db.add_entry(key, reading(key, &[value])).unwrap();
        }

        let mut all = db.entries_snapshot().unwrap();
        let ids: Vec<String> = all.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        all[0].clear();
        assert_eq!(values_of(db.get_entry("a").unwrap().as_ref()), vec![1]);
        assert!(Database::new("empty").entries_snapshot().unwrap().is_empty());
    }

    #[test]
    fn access_updates_last_access() {
        let db = Database::new("db");
        let created = db.last_access();
        db.add_entry("k", reading("s", &[])).unwrap();
        assert!(db.last_access() >= created);
    }

    #[test]
    fn concurrent_readers_and_writer() {
        let db = Arc::new(Database::new("db"));
        db.add_entry("k", reading("s", &[1])).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    if i == 0 {
                        for n in 0..100u32 {
                            db.add_entry(format!("w{n}"), reading("w", &[n])).unwrap();
                        }
                    } else {
                        for _ in 0..100 {
                            assert_eq!(db.get_entry("k").unwrap().id(), "s");
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(db.len().unwrap(), 101);
    }

    #[test]
    fn debug_format() {
        let db = Database::new("metrics");
        let debug = format!("{db:?}");
        assert!(debug.contains("metrics"));
        assert!(debug.contains("entry_count"));
    }
}
