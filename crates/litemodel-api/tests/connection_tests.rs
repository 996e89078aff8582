// Integration tests for connection sharing and the default-connection registry

mod common;

use common::{memory_connection, person_model, pet_model, DbTestFixture};
use litemodel::{
    Connection, Database, Engine, Field, IndexSpec, ModelMetaInfo, ModelQuery, SqlQuery,
    SqliteEngine,
};
use std::sync::Arc;
use std::thread;

#[test]
fn test_first_registration_sets_default() {
    let person = person_model();
    let mut first = memory_connection();
    let mut second = memory_connection();

    assert!(first.add_model(&person));
    assert!(second.add_model(&person));
    assert_eq!(Connection::default_connection(&person), first);

    second.set_default_connection(&person);
    assert_eq!(Connection::default_connection(&person), second);

    first.close();
    second.close();
}

#[test]
fn test_unregistered_model_resolves_to_null() {
    let orphan = ModelMetaInfo::builder("Orphan").build();
    let connection = Connection::default_connection(&orphan);
    assert!(connection.is_null());
    assert!(!connection.is_open());
}

#[test]
fn test_close_removes_only_own_models() {
    let person = person_model();
    let pet = pet_model();
    let other = ModelMetaInfo::builder("Other").build();

    let mut owner = memory_connection();
    let mut bystander = memory_connection();
    assert!(owner.add_model(&person));
    assert!(owner.add_model(&pet));
    assert!(bystander.add_model(&other));

    // Overwritten entries still belong to the closing engine's model list
    bystander.set_default_connection(&pet);

    owner.close();
    assert!(!owner.is_open());
    assert!(Connection::default_connection(&person).is_null());
    assert!(Connection::default_connection(&pet).is_null());
    assert_eq!(Connection::default_connection(&other), bystander);

    bystander.close();
    assert!(Connection::default_connection(&other).is_null());
}

#[test]
fn test_close_leaves_database_open() {
    let database = Database::in_memory().unwrap();
    let mut connection = Connection::new();
    connection.open(&database).unwrap();
    connection.close();
    assert!(!connection.is_open());
    assert!(database.is_open());

    connection.open(&database).unwrap();
    assert!(connection.is_open());
    connection.close();
}

#[test]
fn test_set_engine_only_while_closed() {
    let mut connection = Connection::new();
    assert!(connection.set_engine(Box::new(SqliteEngine::new())));
    connection.open(&Database::in_memory().unwrap()).unwrap();

    assert!(!connection.set_engine(Box::new(SqliteEngine::new())));
    assert!(connection.is_open());

    connection.close();
    assert!(connection.set_engine(Box::new(SqliteEngine::new())));
    assert!(connection.models().is_empty());
}

#[test]
fn test_engine_tracks_models_in_order() {
    let person = person_model();
    let pet = pet_model();
    let mut connection = memory_connection();
    connection.add_model(&person);
    connection.add_model(&pet);
    connection.add_model(&person);

    let names = connection
        .with_engine(|engine| {
            engine
                .model_list()
                .iter()
                .map(|m| m.name().to_string())
                .collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(names, vec!["Person", "Pet"]);
    assert_eq!(connection.engine_name(), Some("sqlite"));
    connection.close();
}

#[test]
fn test_create_tables_is_idempotent() {
    let fixture = DbTestFixture::new();
    let person = person_model();
    let pet = pet_model();

    let mut connection = fixture.connection();
    connection.add_model(&person);
    connection.add_model(&pet);
    assert!(connection.create_tables());
    assert!(connection.create_tables());

    let query = ModelQuery::with_connection(&person, connection.clone());
    assert_eq!(query.count(), Some(2));
    let bob = query
        .clone()
        .filter(litemodel::Expression::col("id").eq(7))
        .select(["name"])
        .exec();
    assert_eq!(bob.value(0, "name").and_then(|v| v.as_str()), Some("Bob"));
    connection.close();

    // Existing tables are not seeded again after reopening
    let mut reopened = fixture.connection();
    reopened.add_model(&person);
    assert!(reopened.create_tables());
    assert_eq!(
        ModelQuery::with_connection(&person, reopened.clone()).count(),
        Some(2)
    );
    reopened.close();
}

#[test]
fn test_drop_tables_skips_missing() {
    let person = person_model();
    let pet = pet_model();
    let database = Database::in_memory().unwrap();
    let mut connection = Connection::new();
    connection.open(&database).unwrap();
    connection.add_model(&person);
    assert!(connection.create_tables());

    connection.add_model(&pet);
    assert!(connection.drop_tables());
    assert!(database.tables().unwrap().is_empty());
    assert!(connection.drop_tables());
    connection.close();
}

#[test]
fn test_drop_tables_with_referencing_rows() {
    let person = person_model();
    let pet = pet_model();
    let database = Database::in_memory().unwrap();
    let mut connection = Connection::new();
    connection.open(&database).unwrap();
    connection.add_model(&person);
    connection.add_model(&pet);
    assert!(connection.create_tables());

    let mut sql = connection.statement_builder().unwrap();
    assert!(sql.save(&pet, &litemodel::Record::new().with("name", "Rex").with("owner", 7)));

    assert!(connection.drop_tables());
    assert!(database.tables().unwrap().is_empty());
    assert!(connection.last_query().last_error().is_none());
    connection.close();
}

#[test]
fn test_index_lifecycle() {
    let person = person_model();
    let mut connection = memory_connection();
    connection.add_model(&person);
    assert!(connection.create_tables());

    let index = IndexSpec::new("person_name_age", person.clone())
        .asc("name")
        .desc("age");
    assert!(connection.create_index(&index));
    assert!(connection.create_index(&index));
    assert!(connection.drop_index("person_name_age"));

    let broken = IndexSpec::new("broken", person).asc("no_such_column");
    assert!(!connection.create_index(&broken));
    assert_eq!(
        connection.last_query().last_query(),
        "CREATE INDEX IF NOT EXISTS broken ON Person (no_such_column ASC);"
    );
    connection.close();
}

#[test]
fn test_create_tables_reports_first_failure() {
    let good = ModelMetaInfo::builder("Good").build();
    let bad = ModelMetaInfo::builder("Bad")
        .field(Field::text("id"))
        .build();
    let never = ModelMetaInfo::builder("Never").build();

    let database = Database::in_memory().unwrap();
    let mut connection = Connection::new();
    connection.open(&database).unwrap();
    connection.add_model(&good);
    connection.add_model(&bad);
    connection.add_model(&never);

    assert!(!connection.create_tables());
    assert!(connection.last_query().last_error().is_some());
    assert_eq!(database.tables().unwrap(), vec!["Good".to_string()]);
    connection.close();
}

#[test]
fn test_last_query_shared_across_threads() {
    let connection = memory_connection();
    let statements: Arc<Vec<String>> =
        Arc::new((0..8).map(|i| format!("SELECT {};", i)).collect());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let connection = connection.clone();
            let statements = Arc::clone(&statements);
            thread::spawn(move || {
                for _ in 0..50 {
                    let mut query = connection.query();
                    query.prepare(statements[i].clone());
                    connection.set_last_query(query);
                    let seen = connection.last_query();
                    assert!(statements.iter().any(|s| s == seen.last_query()));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(statements
        .iter()
        .any(|s| s == connection.last_query().last_query()));
    connection.close();
}

#[test]
fn test_connection_outlives_original_handle() {
    let person = person_model();
    let copy = {
        let mut connection = memory_connection();
        connection.add_model(&person);
        connection.clone()
    };
    assert!(copy.is_open());
    assert_eq!(Connection::default_connection(&person), copy);

    copy.set_last_query(SqlQuery::default());
    copy.close();
    assert!(Connection::default_connection(&person).is_null());
}
