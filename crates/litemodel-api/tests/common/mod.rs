// Common test utilities for litemodel integration tests

use litemodel::{Connection, Database, DatabaseConfig, Field, MetaInfo, ModelMetaInfo, Record};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that owns a temporary directory for a file-backed database
pub struct DbTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl DbTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("litemodel.db");
        Self { temp_dir, db_path }
    }

    /// Open (or reopen) the fixture's database file
    pub fn database(&self) -> Database {
        Database::open(DatabaseConfig::file(&self.db_path)).expect("Failed to open database")
    }

    /// Open the fixture's database with `REFERENCES` enforced
    #[allow(dead_code)]
    pub fn database_with_foreign_keys(&self) -> Database {
        Database::open(DatabaseConfig::file(&self.db_path).with_foreign_keys(true))
            .expect("Failed to open database")
    }

    /// A connection attached to the fixture's database
    #[allow(dead_code)]
    pub fn connection(&self) -> Connection {
        let mut connection = Connection::new();
        connection
            .open(&self.database())
            .expect("Failed to open connection");
        connection
    }
}

impl Default for DbTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A connection on a private in-memory database
#[allow(dead_code)]
pub fn memory_connection() -> Connection {
    let mut connection = Connection::new();
    connection
        .open(&Database::in_memory().expect("Failed to open database"))
        .expect("Failed to open connection");
    connection
}

/// `Person(id, name, age)` with two seed rows
#[allow(dead_code)]
pub fn person_model() -> MetaInfo {
    ModelMetaInfo::builder("Person")
        .field(Field::text("name").not_null())
        .field(Field::integer("age"))
        .seed(Record::new().with("name", "Alice").with("age", 30))
        .seed(Record::new().with("id", 7).with("name", "Bob").with("age", 45))
        .build()
}

/// `Pet(id, name, owner -> Person)`
#[allow(dead_code)]
pub fn pet_model() -> MetaInfo {
    ModelMetaInfo::builder("Pet")
        .field(Field::text("name"))
        .field(Field::foreign_key("owner", "Person"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_opens_file_database() {
        let fixture = DbTestFixture::new();
        let database = fixture.database();
        assert!(database.is_open());
        assert!(fixture.db_path.exists());
    }
}
