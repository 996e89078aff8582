//! # litemodel
//!
//! The connection and statement core of a lightweight object-relational
//! mapping layer on SQLite.
//!
//! ## Quick Start
//!
//! ```rust
//! use litemodel::{Connection, Database, Expression, Field, ModelMetaInfo, ModelQuery, Record};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Describe a model
//!     let person = ModelMetaInfo::builder("Person")
//!         .field(Field::text("name").not_null())
//!         .field(Field::integer("age"))
//!         .seed(Record::new().with("name", "Alice").with("age", 30))
//!         .build();
//!
//!     // Attach a connection to a database and register the model
//!     let mut connection = Connection::new();
//!     connection.open(&Database::in_memory()?)?;
//!     connection.add_model(&person);
//!
//!     // Create missing tables; new tables receive their seed rows
//!     assert!(connection.create_tables());
//!
//!     // Write a row through the statement builder
//!     let mut sql = connection.statement_builder().ok_or("not open")?;
//!     sql.save(&person, &Record::new().with("name", "Bob").with("age", 41));
//!
//!     // Query on the model's default connection
//!     let names = ModelQuery::new(&person)
//!         .filter(Expression::col("age").gt(35))
//!         .select(["name"])
//!         .exec();
//!     assert_eq!(names.rows().len(), 1);
//!
//!     connection.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Connections
//!
//! [`Connection`] is a shared handle: clones refer to the same engine and
//! compare equal. Each registered model has a *default connection*, set by
//! the first [`Connection::add_model`] that registers it and replaced by
//! [`Connection::set_default_connection`]. [`Connection::close`] removes the
//! default-connection entries of every model its engine registered.
//!
//! ## Statements
//!
//! [`SqlStatement`] renders SQL text for one dialect; [`SqliteStatement`] is
//! the SQLite one. [`StatementBuilder`] binds a dialect to a [`Database`]
//! and executes what it renders. Filter values never appear in the SQL
//! text: [`Expression`] literals become named placeholders bound at
//! execution.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod engine;
pub mod logging;
pub mod model_query;
pub mod registry;

// Re-export core types
pub use litemodel_core::{
    BinaryOperator, Error, Expression, Field, FieldType, IndexSpec, LogicalOperator, MetaInfo,
    ModelKey, ModelMetaBuilder, ModelMetaInfo, QueryRules, Record, Result, SortOrder, Value,
    ID_FIELD,
};

// SQL components
pub use litemodel_sql::{
    insert_fields, Database, DatabaseConfig, SqlQuery, SqlStatement, SqliteStatement,
    StatementBuilder,
};

pub use connection::Connection;
pub use engine::{Engine, SqliteEngine};
pub use model_query::ModelQuery;
pub use registry::ConnectionRegistry;

// Version information
/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
