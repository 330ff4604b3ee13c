//! Durable key-value text storage.
//!
//! The session persists exactly one string under a fixed key, so the storage
//! contract is deliberately small: [`KeyValueStore`] reads, writes and
//! removes text values inside a namespace owned by the host app.
//!
//! Two backends ship with the crate:
//!
//! - [`SqliteStore`]: a single `kv` table in a SQLite database. Every write
//!   is committed with `synchronous = FULL` before the call returns.
//! - [`MemoryStore`]: a process-local map, for tests and hosts that do not
//!   want persistence.
//!
//! # Schema
//!
//! ```text
//! kv(namespace TEXT, key TEXT, value TEXT, updated_at INTEGER,
//!    PRIMARY KEY(namespace, key))
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, VaultError};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Durable text storage scoped to the host app.
///
/// Implementations must be `Send + Sync`; replies from the provider app can
/// arrive on any thread.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The write must be durable when this returns.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// SQLite-backed [`KeyValueStore`].
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so the connection lives
/// behind a `Mutex` held only for the duration of each statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and scope reads and writes to
    /// `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Database`] if the database cannot be opened,
    /// or [`VaultError::MigrationFailed`] if schema setup fails.
    pub fn open(path: impl AsRef<std::path::Path>, namespace: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening session store");

        let conn = Connection::open(path)?;
        Self::from_connection(conn, namespace.into())
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory(namespace: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, namespace.into())
    }

    /// The namespace this store reads and writes.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn from_connection(conn: Connection, namespace: String) -> Result<Self> {
        Self::configure_connection(&conn)?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            namespace,
        })
    }

    /// Configure SQLite pragmas. Writes must hit disk before returning.
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        tracing::debug!("running session store migrations");

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                namespace  TEXT NOT NULL,
                key        TEXT NOT NULL,
                value      TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (namespace, key)
            );",
        )
        .map_err(|e| VaultError::MigrationFailed {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VaultError::Internal(format!("store lock poisoned: {e}")))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (namespace, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value,
                                                       updated_at = excluded.updated_at",
            params![self.namespace, key, value, Utc::now().timestamp()],
        )?;

        tracing::debug!(namespace = %self.namespace, key = key, "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        let rows = conn.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
        )?;

        tracing::debug!(namespace = %self.namespace, key = key, rows, "removed value");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Process-local [`KeyValueStore`]. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| VaultError::Internal(format!("store lock poisoned: {e}")))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
