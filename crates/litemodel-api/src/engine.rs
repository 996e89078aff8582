//! Database engines.
//!
//! An engine is the backend behind a [`Connection`](crate::Connection): it
//! attaches to a physical database, keeps the list of registered models and
//! chooses the SQL dialect.

use litemodel_core::{MetaInfo, ModelKey};
use litemodel_sql::{Database, SqlStatement, SqliteStatement};
use std::sync::Arc;

/// Backend-specific connection behavior
pub trait Engine: Send {
    /// Engine name, for diagnostics
    fn name(&self) -> &'static str;

    /// Attach to an open physical database
    fn open(&mut self, database: &Database) -> bool;

    /// Detach from the physical database
    fn close(&mut self);

    /// Whether attached to an open database
    fn is_open(&self) -> bool;

    /// Register a model. Registering the same model twice is a no-op that succeeds.
    fn add_model(&mut self, meta: &MetaInfo) -> bool;

    /// Registered models in registration order.
    ///
    /// Tables are created and dropped in this order, so models referencing
    /// others by foreign key must be registered after their targets.
    fn model_list(&self) -> Vec<MetaInfo>;

    /// SQL dialect spoken by this engine
    fn statement(&self) -> Arc<dyn SqlStatement>;
}

/// Engine for SQLite databases
#[derive(Debug, Default)]
pub struct SqliteEngine {
    database: Option<Database>,
    models: Vec<MetaInfo>,
}

impl SqliteEngine {
    /// A detached engine with no models
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn open(&mut self, database: &Database) -> bool {
        if !database.is_open() {
            return false;
        }
        self.database = Some(database.clone());
        true
    }

    // The physical database belongs to the caller and stays open.
    fn close(&mut self) {
        self.database = None;
    }

    fn is_open(&self) -> bool {
        self.database.as_ref().map_or(false, Database::is_open)
    }

    fn add_model(&mut self, meta: &MetaInfo) -> bool {
        let key = ModelKey::of(meta);
        if !self.models.iter().any(|m| ModelKey::of(m) == key) {
            self.models.push(meta.clone());
        }
        true
    }

    fn model_list(&self) -> Vec<MetaInfo> {
        self.models.clone()
    }

    fn statement(&self) -> Arc<dyn SqlStatement> {
        Arc::new(SqliteStatement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litemodel_core::{Field, ModelMetaInfo};

    #[test]
    fn test_open_requires_open_database() {
        let mut engine = SqliteEngine::new();
        assert!(!engine.open(&Database::default()));
        assert!(!engine.is_open());

        let db = Database::in_memory().unwrap();
        assert!(engine.open(&db));
        assert!(engine.is_open());
        engine.close();
        assert!(!engine.is_open());
        assert!(db.is_open());
    }

    #[test]
    fn test_model_list_keeps_registration_order() {
        let person = ModelMetaInfo::builder("Person").build();
        let pet = ModelMetaInfo::builder("Pet")
            .field(Field::foreign_key("owner", "Person"))
            .build();
        let mut engine = SqliteEngine::new();
        assert!(engine.add_model(&person));
        assert!(engine.add_model(&pet));
        assert!(engine.add_model(&person));

        let names: Vec<String> = engine
            .model_list()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["Person", "Pet"]);
        assert_eq!(engine.statement().name(), "sqlite");
    }
}
