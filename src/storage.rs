use crate::dlog;
use crate::error::{Error, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;

/// Key under which the workout snapshot is kept.
pub const WORKOUTS_KEY: &str = "workouts";

/// String-keyed store holding whole values; every write replaces the value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

const CREATE_KV_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS kv (
      key    TEXT NOT NULL PRIMARY KEY,
      value  TEXT NOT NULL
    )
";

const UPSERT_KV: &str = r"
    INSERT INTO kv (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value
";

const SELECT_KV: &str = "SELECT value FROM kv WHERE key = ?1";

const DELETE_KV: &str = "DELETE FROM kv WHERE key = ?1";

/// Durable store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening store");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        dlog!("ensuring kv table");
        conn.execute_batch(CREATE_KV_TABLE)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    /// The column is declared TEXT but SQLite will hold anything; a value
    /// that is not UTF-8 text comes back as `UnreadableValue`.
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(SELECT_KV, params![key], |row| {
                Ok(match row.get_ref(0)? {
                    ValueRef::Null => Ok(None),
                    ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                        .map(|s| Some(s.to_string()))
                        .map_err(|_| "invalid UTF-8 text"),
                    ValueRef::Integer(_) => Err("integer"),
                    ValueRef::Real(_) => Err("real"),
                    ValueRef::Blob(_) => Err("blob"),
                })
            })
            .optional()?;

        match value {
            None => Ok(None),
            Some(Ok(text)) => Ok(text),
            Some(Err(found)) => Err(Error::UnreadableValue {
                key: key.to_string(),
                found,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        dlog!("kv set key={key} bytes={}", value.len());
        self.conn.execute(UPSERT_KV, params![key, value])?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let n = self.conn.execute(DELETE_KV, params![key])?;
        dlog!("kv remove key={key} removed={n}");
        Ok(())
    }
}

/// Process-local store, gone when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn KeyValueStore) {
        assert_eq!(store.get("workouts").unwrap(), None);

        store.set("workouts", "[]").unwrap();
        assert_eq!(store.get("workouts").unwrap().as_deref(), Some("[]"));

        store.set("workouts", "[1]").unwrap();
        assert_eq!(store.get("workouts").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("other").unwrap(), None);

        store.remove("workouts").unwrap();
        assert_eq!(store.get("workouts").unwrap(), None);

        // Removing a missing key is fine.
        store.remove("workouts").unwrap();
    }

    #[test]
    fn test_sqlite_store() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        exercise(&mut store);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        exercise(&mut store);
    }

    #[test]
    fn test_sqlite_non_text_values_are_unreadable() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for (sql, found) in [
            ("INSERT INTO kv (key, value) VALUES ('workouts', X'FF00FE')", "blob"),
            (
                "INSERT INTO kv (key, value) VALUES ('workouts', CAST(X'FF00FE' AS TEXT))",
                "invalid UTF-8 text",
            ),
        ] {
            store.conn.execute_batch("DELETE FROM kv").unwrap();
            store.conn.execute_batch(sql).unwrap();
            assert!(matches!(
                store.get(WORKOUTS_KEY),
                Err(Error::UnreadableValue { found: f, .. }) if f == found
            ));
        }

        // A plain write replaces the bad value.
        store.set(WORKOUTS_KEY, "[]").unwrap();
        assert_eq!(store.get(WORKOUTS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapty.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set(WORKOUTS_KEY, "[\"kept\"]").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get(WORKOUTS_KEY).unwrap().as_deref(),
            Some("[\"kept\"]")
        );
    }
}
