//! Shared database connections.
//!
//! A [`Connection`] is a reference-counted handle: clones share one engine,
//! one statement builder and one last-query slot, and compare equal. The
//! default value is a *null* handle that allocates nothing until the first
//! mutating call (`open`, `add_model`, `set_engine`).
//!
//! Engine and last-query access go through a single per-connection mutex,
//! held only while reading or writing that state. Statements run on a
//! snapshot of the statement builder taken under the lock, never while
//! holding it.

use crate::engine::{Engine, SqliteEngine};
use crate::registry::ConnectionRegistry;
use litemodel_core::{Error, IndexSpec, MetaInfo, Result};
use litemodel_sql::{Database, SqlQuery, StatementBuilder};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Shared handle to one logical database connection.
///
/// # Examples
///
/// ```rust
/// use litemodel::{Connection, Database, Field, ModelMetaInfo};
///
/// let person = ModelMetaInfo::builder("Person")
///     .field(Field::text("name"))
///     .build();
///
/// let mut connection = Connection::new();
/// connection.open(&Database::in_memory()?)?;
/// assert!(connection.add_model(&person));
/// assert!(connection.create_tables());
/// assert_eq!(Connection::default_connection(&person), connection);
/// connection.close();
/// # Ok::<(), litemodel::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Connection {
    inner: Option<Arc<ConnectionInner>>,
}

struct ConnectionInner {
    state: Mutex<ConnectionState>,
}

struct ConnectionState {
    engine: Option<Box<dyn Engine>>,
    sql: StatementBuilder,
    last_query: SqlQuery,
}

impl Connection {
    /// A null connection
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach this connection to an open physical database.
    ///
    /// Installs a [`SqliteEngine`] if no engine was set. Fails with
    /// [`Error::InvalidArgument`] when `database` is not open.
    pub fn open(&mut self, database: &Database) -> Result<()> {
        if !database.is_open() {
            return Err(Error::InvalidArgument(
                "Connection::open requires an open database".to_string(),
            ));
        }

        let inner = self.prepare();
        let mut guard = lock(inner);
        let state = &mut *guard;
        let engine = state
            .engine
            .get_or_insert_with(|| Box::new(SqliteEngine::new()));

        state.sql.set_statement(engine.statement());
        state.sql.set_database(Some(database.clone()));
        if !engine.open(database) {
            state.sql.set_database(None);
            return Err(Error::InvalidOperation(format!(
                "engine {} failed to open",
                engine.name()
            )));
        }

        info!(engine = engine.name(), "connection opened");
        Ok(())
    }

    /// Whether the engine is attached to an open database. Safe on a null handle.
    pub fn is_open(&self) -> bool {
        self.state()
            .and_then(|state| state.engine.as_ref().map(|engine| engine.is_open()))
            .unwrap_or(false)
    }

    /// True until the first mutating call allocates shared state
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Detach from the database and drop the default-connection entries of
    /// every model this connection's engine registered.
    ///
    /// Entries are removed even when they point at another connection.
    pub fn close(&self) {
        let models = {
            let Some(mut state) = self.state() else {
                return;
            };
            state.sql.set_database(None);
            match state.engine.as_mut() {
                Some(engine) => {
                    engine.close();
                    engine.model_list()
                }
                None => Vec::new(),
            }
        };

        let registry = ConnectionRegistry::global();
        for meta in &models {
            registry.remove(meta);
        }
        info!(models = models.len(), "connection closed");
    }

    /// Register a model with this connection's engine.
    ///
    /// On success the connection becomes the model's default connection,
    /// unless the model already has one. Empty metadata is rejected.
    pub fn add_model(&mut self, meta: &MetaInfo) -> bool {
        if meta.is_empty() {
            return false;
        }

        let added = {
            let inner = self.prepare();
            let mut state = lock(inner);
            state
                .engine
                .get_or_insert_with(|| Box::new(SqliteEngine::new()))
                .add_model(meta)
        };

        if added && ConnectionRegistry::global().insert_if_absent(meta, self) {
            debug!(model = meta.class_name(), "default connection set");
        }
        added
    }

    /// The default connection of `meta`, or a null connection if the model
    /// was never registered
    pub fn default_connection(meta: &MetaInfo) -> Connection {
        match ConnectionRegistry::global().get(meta) {
            Some(connection) => connection,
            None => {
                warn!(
                    model = meta.class_name(),
                    "model is not added to any connection yet"
                );
                Connection::new()
            }
        }
    }

    /// Make this connection the default for `meta`, replacing any other
    pub fn set_default_connection(&self, meta: &MetaInfo) {
        ConnectionRegistry::global().set(meta, self);
    }

    /// Create the table of every registered model that does not have one.
    ///
    /// Models are processed in registration order. A newly created table is
    /// filled with the model's seed rows; existing tables are left untouched.
    /// Stops at the first failed creation and records it as the last query.
    pub fn create_tables(&self) -> bool {
        let Some((models, mut sql)) = self.snapshot() else {
            return false;
        };

        for meta in &models {
            if sql.exists(meta) {
                continue;
            }

            if !sql.create_table_if_not_exists(meta) {
                warn!(
                    model = meta.class_name(),
                    error = sql.last_query().last_error().unwrap_or_default(),
                    sql = sql.last_query().last_query(),
                    "failed to create table"
                );
                self.set_last_query(sql.last_query().clone());
                return false;
            }

            for record in meta.initial_data() {
                if !sql.save(meta, record) {
                    warn!(
                        model = meta.class_name(),
                        error = sql.last_query().last_error().unwrap_or_default(),
                        "failed to insert initial data"
                    );
                    self.set_last_query(sql.last_query().clone());
                }
            }
        }

        true
    }

    /// Drop the table of every registered model that has one.
    ///
    /// Stops at the first failure and records it as the last query.
    pub fn drop_tables(&self) -> bool {
        let Some((models, mut sql)) = self.snapshot() else {
            return false;
        };

        for meta in &models {
            if !sql.exists(meta) {
                continue;
            }

            if !sql.drop_table(meta) {
                warn!(
                    model = meta.class_name(),
                    error = sql.last_query().last_error().unwrap_or_default(),
                    "failed to drop table"
                );
                self.set_last_query(sql.last_query().clone());
                return false;
            }
        }

        true
    }

    /// Create `index` unless it already exists
    pub fn create_index(&self, index: &IndexSpec) -> bool {
        self.run(|sql| sql.create_index_if_not_exists(index))
    }

    /// Drop the index called `name` if it exists
    pub fn drop_index(&self, name: &str) -> bool {
        self.run(|sql| sql.drop_index_if_exists(name))
    }

    /// A snapshot of the statement builder bound to this connection's
    /// database, for row-level operations. `None` on a null handle.
    pub fn statement_builder(&self) -> Option<StatementBuilder> {
        self.state().map(|state| state.sql.clone())
    }

    /// A fresh query on the current database; invalid if not open
    pub fn query(&self) -> SqlQuery {
        if !self.is_open() {
            return SqlQuery::default();
        }
        self.state()
            .map(|state| state.sql.query())
            .unwrap_or_default()
    }

    /// Record `query` as the last query. Ignored when not open.
    ///
    /// The slot is per connection, not per thread: with concurrent callers
    /// the last writer wins. Use it for diagnostics only.
    pub fn set_last_query(&self, query: SqlQuery) {
        if !self.is_open() {
            return;
        }
        if let Some(mut state) = self.state() {
            state.last_query = query;
        }
    }

    /// The last recorded query; an empty query when not open
    pub fn last_query(&self) -> SqlQuery {
        if !self.is_open() {
            return SqlQuery::default();
        }
        self.state()
            .map(|state| state.last_query.clone())
            .unwrap_or_default()
    }

    /// Replace the engine. Fails while the connection is open.
    ///
    /// The connection takes ownership of `engine`; the previous engine is
    /// dropped.
    pub fn set_engine(&mut self, engine: Box<dyn Engine>) -> bool {
        if self.is_open() {
            return false;
        }
        let inner = self.prepare();
        let mut state = lock(inner);
        debug!(engine = engine.name(), "engine set");
        state.engine = Some(engine);
        true
    }

    /// Run `f` against the current engine, under the connection lock
    pub fn with_engine<R>(&self, f: impl FnOnce(&dyn Engine) -> R) -> Option<R> {
        let state = self.state()?;
        state.engine.as_deref().map(f)
    }

    /// Name of the current engine
    pub fn engine_name(&self) -> Option<&'static str> {
        self.with_engine(|engine| engine.name())
    }

    /// Models registered with the current engine, in registration order
    pub fn models(&self) -> Vec<MetaInfo> {
        self.with_engine(|engine| engine.model_list())
            .unwrap_or_default()
    }

    fn prepare(&mut self) -> &Arc<ConnectionInner> {
        self.inner.get_or_insert_with(|| {
            Arc::new(ConnectionInner {
                state: Mutex::new(ConnectionState {
                    engine: None,
                    sql: StatementBuilder::default(),
                    last_query: SqlQuery::default(),
                }),
            })
        })
    }

    fn state(&self) -> Option<MutexGuard<'_, ConnectionState>> {
        self.inner.as_deref().map(lock)
    }

    // Registered models and a builder snapshot, if open
    fn snapshot(&self) -> Option<(Vec<MetaInfo>, StatementBuilder)> {
        if !self.is_open() {
            return None;
        }
        let state = self.state()?;
        let models = state
            .engine
            .as_ref()
            .map(|engine| engine.model_list())
            .unwrap_or_default();
        Some((models, state.sql.clone()))
    }

    fn run(&self, f: impl FnOnce(&mut StatementBuilder) -> bool) -> bool {
        let Some((_, mut sql)) = self.snapshot() else {
            return false;
        };
        let ok = f(&mut sql);
        if !ok {
            self.set_last_query(sql.last_query().clone());
        }
        ok
    }
}

fn lock(inner: &ConnectionInner) -> MutexGuard<'_, ConnectionState> {
    inner
        .state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Connection {}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            None => f.write_str("Connection(null)"),
            Some(inner) => f
                .debug_struct("Connection")
                .field("id", &Arc::as_ptr(inner))
                .finish(),
        }
    }
}
