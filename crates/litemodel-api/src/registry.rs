//! Default-connection registry.
//!
//! Maps each registered model to the connection used when a caller does not
//! name one. The process-wide instance is [`ConnectionRegistry::global`]:
//!
//! - created on first use and kept for the life of the process
//! - written by [`Connection::add_model`] (first registration wins) and
//!   [`Connection::set_default_connection`] (always overwrites)
//! - entries removed by [`Connection::close`] for every model that
//!   connection's engine registered
//! - [`ConnectionRegistry::clear`] drops everything, for teardown
//!
//! The registry has its own lock. Connections never hold their own lock
//! while calling into the registry.

use crate::connection::Connection;
use litemodel_core::{MetaInfo, ModelKey};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Model identity to default connection
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<ModelKey, RegistryEntry>>,
}

struct RegistryEntry {
    // Keeps the metadata allocation alive so its key cannot be reused.
    _meta: MetaInfo,
    connection: Connection,
}

static GLOBAL: OnceLock<ConnectionRegistry> = OnceLock::new();

impl ConnectionRegistry {
    /// An empty registry, separate from the global one
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static ConnectionRegistry {
        GLOBAL.get_or_init(ConnectionRegistry::new)
    }

    /// Default connection of `meta`, if registered
    pub fn get(&self, meta: &MetaInfo) -> Option<Connection> {
        self.read()
            .get(&ModelKey::of(meta))
            .map(|entry| entry.connection.clone())
    }

    /// Whether `meta` has a default connection
    pub fn contains(&self, meta: &MetaInfo) -> bool {
        self.read().contains_key(&ModelKey::of(meta))
    }

    /// Register `connection` for `meta` unless an entry exists. Returns true if inserted.
    pub fn insert_if_absent(&self, meta: &MetaInfo, connection: &Connection) -> bool {
        let mut entries = self.write();
        let key = ModelKey::of(meta);
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, RegistryEntry::new(meta, connection));
        true
    }

    /// Register `connection` for `meta`, replacing any existing entry
    pub fn set(&self, meta: &MetaInfo, connection: &Connection) {
        self.write()
            .insert(ModelKey::of(meta), RegistryEntry::new(meta, connection));
    }

    /// Remove the entry for `meta`, returning its connection
    pub fn remove(&self, meta: &MetaInfo) -> Option<Connection> {
        self.write()
            .remove(&ModelKey::of(meta))
            .map(|entry| entry.connection)
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no model is registered
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let removed: Vec<RegistryEntry> = self.write().drain().map(|(_, e)| e).collect();
        // Connections dropped outside the lock
        drop(removed);
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ModelKey, RegistryEntry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ModelKey, RegistryEntry>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RegistryEntry {
    fn new(meta: &MetaInfo, connection: &Connection) -> Self {
        Self {
            _meta: meta.clone(),
            connection: connection.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litemodel_core::ModelMetaInfo;
    use litemodel_sql::Database;

    fn open_connection() -> Connection {
        let mut connection = Connection::new();
        connection.open(&Database::in_memory().unwrap()).unwrap();
        connection
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let registry = ConnectionRegistry::new();
        let meta = ModelMetaInfo::builder("Person").build();
        let a = open_connection();
        let b = open_connection();

        assert!(registry.insert_if_absent(&meta, &a));
        assert!(!registry.insert_if_absent(&meta, &b));
        assert_eq!(registry.get(&meta), Some(a));
    }

    #[test]
    fn test_set_overwrites() {
        let registry = ConnectionRegistry::new();
        let meta = ModelMetaInfo::builder("Person").build();
        let a = open_connection();
        let b = open_connection();

        registry.set(&meta, &a);
        registry.set(&meta, &b);
        assert_eq!(registry.get(&meta), Some(b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_keys_are_identity_not_name() {
        let registry = ConnectionRegistry::new();
        let first = ModelMetaInfo::builder("Person").build();
        let second = ModelMetaInfo::builder("Person").build();
        registry.set(&first, &open_connection());
        assert!(registry.contains(&first));
        assert!(!registry.contains(&second));
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = ConnectionRegistry::new();
        let person = ModelMetaInfo::builder("Person").build();
        let pet = ModelMetaInfo::builder("Pet").build();
        let connection = open_connection();
        registry.set(&person, &connection);
        registry.set(&pet, &connection);

        assert_eq!(registry.remove(&person), Some(connection));
        assert!(registry.remove(&person).is_none());
        registry.clear();
        assert!(registry.is_empty());
    }
}
