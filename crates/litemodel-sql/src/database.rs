//! Physical database handle.
//!
//! A cheap-to-clone handle over one SQLite connection. Clones share the
//! same connection; closing through any clone closes it for all of them.

use crate::query::SqlQuery;
use crate::sql_error;
use litemodel_core::{Error, Result};
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Default busy timeout (5 seconds)
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Database configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file; `None` opens a private in-memory database
    pub path: Option<PathBuf>,
    /// How long a statement waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
    /// Enforce `REFERENCES` constraints. Off by default, as in SQLite;
    /// with it on, `drop table` fails on a parent that rows still reference.
    pub foreign_keys: bool,
    /// Open the file read-only
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: false,
            read_only: false,
        }
    }
}

impl DatabaseConfig {
    /// In-memory database with default settings
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed database at `path`
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the busy timeout
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable or disable foreign key enforcement
    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Open read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Shared handle to a physical SQLite database.
///
/// `Database::default()` is an invalid handle that is never open.
#[derive(Clone, Default)]
pub struct Database {
    inner: Option<Arc<DatabaseInner>>,
}

struct DatabaseInner {
    config: DatabaseConfig,
    conn: Mutex<Option<rusqlite::Connection>>,
}

impl Database {
    /// Opens a database with the given configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use litemodel_sql::{Database, DatabaseConfig};
    ///
    /// let db = Database::open(DatabaseConfig::in_memory())?;
    /// assert!(db.is_open());
    /// # Ok::<(), litemodel_core::Error>(())
    /// ```
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        let conn = match &config.path {
            Some(path) if config.read_only => rusqlite::Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            ),
            Some(path) => rusqlite::Connection::open(path),
            None => rusqlite::Connection::open_in_memory(),
        }
        .map_err(sql_error)?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(sql_error)?;
        if config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(sql_error)?;
        }

        debug!(path = ?config.path, read_only = config.read_only, "database opened");

        Ok(Database {
            inner: Some(Arc::new(DatabaseInner {
                config,
                conn: Mutex::new(Some(conn)),
            })),
        })
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::open(DatabaseConfig::in_memory())
    }

    /// Whether the underlying connection is still open
    pub fn is_open(&self) -> bool {
        match &self.inner {
            Some(inner) => inner
                .conn
                .lock()
                .map(|conn| conn.is_some())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Close the underlying connection for every clone of this handle
    pub fn close(&self) {
        let Some(inner) = &self.inner else {
            return;
        };
        let conn = match inner.conn.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(conn) = conn {
            if let Err((_, e)) = conn.close() {
                debug!(error = %e, "database close reported an error");
            }
        }
    }

    /// Configuration the database was opened with
    pub fn config(&self) -> Option<&DatabaseConfig> {
        self.inner.as_ref().map(|inner| &inner.config)
    }

    /// A fresh query bound to this database
    pub fn query(&self) -> SqlQuery {
        SqlQuery::new(self)
    }

    /// Names of the user tables, sorted
    pub fn tables(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' \
                     AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )
                .map_err(sql_error)?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(sql_error)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(sql_error)?;
            Ok(names)
        })
    }

    /// True when both handles share one physical connection
    pub fn same_database(&self, other: &Database) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> Result<T>,
    ) -> Result<T> {
        let inner = self.inner.as_ref().ok_or(Error::NotOpen)?;
        let guard = inner.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(Error::NotOpen)?;
        f(conn)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config())
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_foreign_keys_are_opt_in() {
        assert!(!DatabaseConfig::default().foreign_keys);
        assert!(DatabaseConfig::in_memory().with_foreign_keys(true).foreign_keys);
    }

    #[test]
    fn test_default_is_never_open() {
        let db = Database::default();
        assert!(!db.is_open());
        assert!(db.config().is_none());
        db.close();
        assert!(matches!(db.tables(), Err(Error::NotOpen)));
    }

    #[test]
    fn test_close_is_shared_by_clones() {
        let db = Database::in_memory().unwrap();
        let other = db.clone();
        assert!(db.same_database(&other));
        other.close();
        assert!(!db.is_open());
    }

    #[test]
    fn test_file_database_tables() {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig::file(dir.path().join("app.db"))
            .with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.busy_timeout_ms, 250);

        let db = Database::open(config).unwrap();
        let mut query = db.query();
        assert!(query.exec_sql("CREATE TABLE Account (id INTEGER PRIMARY KEY);"));
        assert_eq!(db.tables().unwrap(), vec!["Account".to_string()]);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ro.db");
        {
            let db = Database::open(DatabaseConfig::file(&path)).unwrap();
            assert!(db.query().exec_sql("CREATE TABLE t (id INTEGER);"));
            db.close();
        }
        let db = Database::open(DatabaseConfig::file(&path).read_only()).unwrap();
        let mut query = db.query();
        assert!(!query.exec_sql("INSERT INTO t (id) values (1);"));
        assert!(query.last_error().is_some());
    }
}
