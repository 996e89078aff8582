//! Statement builder.
//!
//! Pairs a [`SqlStatement`] dialect with the physical database it executes
//! against. Every execution helper renders, binds, runs, and keeps the
//! executed [`SqlQuery`] as its last query.

use crate::database::Database;
use crate::query::SqlQuery;
use crate::sqlite::SqliteStatement;
use crate::statement::{insert_fields, SqlStatement};
use litemodel_core::{IndexSpec, ModelMetaInfo, QueryRules, Record, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Renders statements and runs them on the bound database
#[derive(Clone)]
pub struct StatementBuilder {
    statement: Arc<dyn SqlStatement>,
    database: Option<Database>,
    last_query: SqlQuery,
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self::new(Arc::new(SqliteStatement))
    }
}

impl StatementBuilder {
    /// Create a builder for `statement` with no database bound
    pub fn new(statement: Arc<dyn SqlStatement>) -> Self {
        Self {
            statement,
            database: None,
            last_query: SqlQuery::default(),
        }
    }

    /// Switch the rendering dialect
    pub fn set_statement(&mut self, statement: Arc<dyn SqlStatement>) {
        self.statement = statement;
    }

    /// The dialect used for rendering
    pub fn statement(&self) -> &dyn SqlStatement {
        self.statement.as_ref()
    }

    /// Bind or detach the physical database
    pub fn set_database(&mut self, database: Option<Database>) {
        self.database = database;
    }

    /// The bound database, if any
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// A fresh query on the bound database; invalid when none is bound
    pub fn query(&self) -> SqlQuery {
        match &self.database {
            Some(database) => SqlQuery::new(database),
            None => SqlQuery::default(),
        }
    }

    /// The query run by the last execution helper
    pub fn last_query(&self) -> &SqlQuery {
        &self.last_query
    }

    /// Whether `info`'s table exists
    pub fn exists(&mut self, info: &ModelMetaInfo) -> bool {
        let sql = self.statement.table_exists(info);
        let bindings = vec![(":name".to_string(), Value::from(info.name()))];
        self.exec(sql, bindings) && !self.last_query.rows().is_empty()
    }

    /// Create `info`'s table unless it exists
    pub fn create_table_if_not_exists(&mut self, info: &ModelMetaInfo) -> bool {
        let sql = self.statement.create_table_if_not_exists(info);
        self.exec(sql, Vec::new())
    }

    /// Drop `info`'s table; fails if it does not exist
    pub fn drop_table(&mut self, info: &ModelMetaInfo) -> bool {
        let sql = self.statement.drop_table(info);
        self.exec(sql, Vec::new())
    }

    /// Create `index` unless it exists
    pub fn create_index_if_not_exists(&mut self, index: &IndexSpec) -> bool {
        let sql = self.statement.create_index_if_not_exists(index);
        self.exec(sql, Vec::new())
    }

    /// Drop the index called `name` if it exists
    pub fn drop_index_if_exists(&mut self, name: &str) -> bool {
        let sql = self.statement.drop_index_if_exists(name);
        self.exec(sql, Vec::new())
    }

    /// Write `record` as a row of `info`.
    ///
    /// A record with a non-null `id` replaces the row with that id; any other
    /// record is inserted and gets a fresh id. Fields missing from the record
    /// are bound as NULL.
    pub fn save(&mut self, info: &ModelMetaInfo, record: &Record) -> bool {
        let with_id = record.has_id();
        let sql = if with_id {
            self.statement.replace_into(info, true)
        } else {
            self.statement.insert_into(info, false)
        };
        let bindings = insert_fields(info, with_id)
            .into_iter()
            .map(|field| {
                let value = record.get(&field).cloned().unwrap_or(Value::Null);
                (format!(":{}", field), value)
            })
            .collect();
        self.exec(sql, bindings)
    }

    /// Run the SELECT described by `rules`; rows land in the last query
    pub fn select(&mut self, rules: &QueryRules) -> bool {
        let sql = self.statement.select(rules);
        self.exec(sql, rules.expression().bindings())
    }

    /// Run the DELETE described by `rules`
    pub fn delete_from(&mut self, rules: &QueryRules) -> bool {
        let sql = self.statement.delete_from(rules);
        self.exec(sql, rules.expression().bindings())
    }

    fn exec(&mut self, sql: String, bindings: Vec<(String, Value)>) -> bool {
        let mut query = self.query();
        query.prepare(sql);
        for (name, value) in bindings {
            query.bind_value(name, value);
        }
        let ok = query.exec();
        if !ok {
            debug!(
                dialect = self.statement.name(),
                sql = query.last_query(),
                error = ?query.last_error(),
                "statement failed"
            );
        }
        self.last_query = query;
        ok
    }
}

impl fmt::Debug for StatementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementBuilder")
            .field("dialect", &self.statement.name())
            .field("database", &self.database)
            .finish()
    }
}
