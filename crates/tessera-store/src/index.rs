use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::database::Database;
use crate::error::{StoreError, StoreResult};

/// A namespace of databases.
///
/// The index lock only guards the name → database map. Callers receive an
/// `Arc<Database>` and take the database lock after this one is released.
pub struct Index {
    name: String,
    databases: RwLock<HashMap<String, Arc<Database>>>,
}

impl Index {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            databases: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a database by name.
    ///
    /// A missing database is reported as [`StoreError::UnknownDatabase`] so
    /// callers can decide between creating it and propagating the error.
    pub fn get_database(&self, name: &str) -> StoreResult<Arc<Database>> {
        let databases = self.databases.read().map_err(|e| self.poisoned(e))?;
        databases
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::unknown_database(name))
    }

    /// Create a database. Creating a name that already exists is a no-op
    /// that logs a warning and returns the existing database.
    pub fn add_database(&self, name: &str) -> StoreResult<Arc<Database>> {
        let mut databases = self.databases.write().map_err(|e| self.poisoned(e))?;
        if let Some(existing) = databases.get(name) {
            warn!(index = %self.name, database = name, "database exists");
            return Ok(Arc::clone(existing));
        }
        debug!(index = %self.name, database = name, "creating database");
        let database = Arc::new(Database::new(name));
        databases.insert(name.to_string(), Arc::clone(&database));
        Ok(database)
    }

    /// Return the named database, creating it if absent.
    ///
    /// Lookup and insertion happen under one exclusive lock, so concurrent
    /// callers for the same name converge on a single database.
    pub fn get_or_create_database(&self, name: &str) -> StoreResult<Arc<Database>> {
        let mut databases = self.databases.write().map_err(|e| self.poisoned(e))?;
        let database = databases.entry(name.to_string()).or_insert_with(|| {
            debug!(index = %self.name, database = name, "creating database");
            Arc::new(Database::new(name))
        });
        Ok(Arc::clone(database))
    }

    /// Sorted database names.
    pub fn database_names(&self) -> StoreResult<Vec<String>> {
        let databases = self.databases.read().map_err(|e| self.poisoned(e))?;
        let mut names: Vec<String> = databases.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn database_count(&self) -> StoreResult<usize> {
        Ok(self.databases.read().map_err(|e| self.poisoned(e))?.len())
    }

    fn poisoned(&self, e: impl fmt::Display) -> StoreError {
        StoreError::LockPoisoned(format!("index {}: {e}", self.name))
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.databases.read().map(|d| d.len()).unwrap_or_default();
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("database_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn missing_database_is_typed_error() {
        let index = Index::new("idx");
        let err = index.get_database("db").unwrap_err();
        assert_eq!(err, StoreError::unknown_database("db"));
    }

    #[test]
    fn add_database_twice_returns_existing() {
        let index = Index::new("idx");
        let first = index.add_database("db").unwrap();
        let second = index.add_database("db").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(index.database_count().unwrap(), 1);
    }

    #[test]
    fn get_or_create_converges() {
        let index = Arc::new(Index::new("idx"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || index.get_or_create_database("shared").unwrap())
            })
            .collect();

        let dbs: Vec<Arc<Database>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for db in &dbs[1..] {
            assert!(Arc::ptr_eq(&dbs[0], db));
        }
        assert_eq!(index.database_names().unwrap(), vec!["shared"]);
    }

    #[test]
    fn database_names_sorted() {
        let index = Index::new("idx");
        index.add_database("zeta").unwrap();
        index.add_database("alpha").unwrap();
        assert_eq!(index.database_names().unwrap(), vec!["alpha", "zeta"]);
    }
}
