//! # litemodel SQL
//!
//! Statement rendering and SQLite transport for litemodel.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of litemodel.**
//!
//! Users should depend on the main `litemodel` crate instead, which
//! re-exports the types below.
//!
//! ---
//!
//! - [`SqlStatement`]: dialect trait rendering DDL, DML and queries to text
//! - [`SqliteStatement`]: the SQLite dialect
//! - [`StatementBuilder`]: renders, binds and executes against a [`Database`]
//! - [`SqlQuery`]: an executable query and the outcome of running it

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod database;
/// Executable query object
pub mod query;
pub mod sqlite;
pub mod statement;

pub use builder::StatementBuilder;
pub use database::{Database, DatabaseConfig};
pub use query::SqlQuery;
pub use sqlite::SqliteStatement;
pub use statement::{insert_fields, SqlStatement};

/// Map a driver error into the crate error type
pub(crate) fn sql_error(err: rusqlite::Error) -> litemodel_core::Error {
    litemodel_core::Error::Sql(err.to_string())
}
