//! Fluent queries over one model.
//!
//! A [`ModelQuery`] collects a filter, a projection, an aggregate function
//! and a limit/offset window, then runs against its connection: the one
//! given explicitly or the model's default connection.
//!
//! ```rust
//! use litemodel::{Connection, Database, Expression, Field, ModelMetaInfo, ModelQuery, Record};
//!
//! let person = ModelMetaInfo::builder("QueryDocPerson")
//!     .field(Field::text("name"))
//!     .field(Field::integer("age"))
//!     .seed(Record::new().with("name", "Alice").with("age", 30))
//!     .seed(Record::new().with("name", "Bob").with("age", 12))
//!     .build();
//!
//! let mut connection = Connection::new();
//! connection.open(&Database::in_memory()?)?;
//! connection.add_model(&person);
//! connection.create_tables();
//!
//! let adults = ModelQuery::new(&person)
//!     .filter(Expression::col("age").ge(18))
//!     .select(["name"])
//!     .exec();
//! assert_eq!(adults.rows().len(), 1);
//! assert_eq!(ModelQuery::new(&person).count(), Some(2));
//! connection.close();
//! # Ok::<(), litemodel::Error>(())
//! ```

use crate::connection::Connection;
use litemodel_core::{Expression, MetaInfo, QueryRules};
use litemodel_sql::SqlQuery;

/// A query over the rows of one model
#[derive(Debug, Clone)]
pub struct ModelQuery {
    meta: MetaInfo,
    connection: Connection,
    expression: Expression,
    fields: Vec<String>,
    func: String,
    limit: usize,
    offset: usize,
}

impl ModelQuery {
    /// Query `meta` on its default connection
    pub fn new(meta: &MetaInfo) -> Self {
        Self::with_connection(meta, Connection::default_connection(meta))
    }

    /// Query `meta` on `connection`
    pub fn with_connection(meta: &MetaInfo, connection: Connection) -> Self {
        Self {
            meta: meta.clone(),
            connection,
            expression: Expression::Null,
            fields: Vec::new(),
            func: String::new(),
            limit: 0,
            offset: 0,
        }
    }

    /// AND `expression` into the filter
    pub fn filter(mut self, expression: Expression) -> Self {
        let current = std::mem::take(&mut self.expression);
        self.expression = current.and(expression);
        self
    }

    /// Restrict the projection to `fields`
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Wrap the projection in the aggregate `func`, e.g. `max`
    pub fn call(mut self, func: impl Into<String>) -> Self {
        self.func = func.into();
        self
    }

    /// Return at most `limit` rows; 0 means unlimited
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Skip the first `offset` rows. Only rendered with a limit.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The connection this query runs on
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// The rules this query renders from
    pub fn rules(&self) -> QueryRules {
        QueryRules::new(self.meta.clone())
            .with_expression(self.expression.clone())
            .with_fields(self.fields.iter().cloned())
            .with_func(self.func.clone())
            .with_limit(self.limit)
            .with_offset(self.offset)
    }

    /// Run the SELECT; the returned query holds the rows or the error
    pub fn exec(&self) -> SqlQuery {
        let rules = self.rules();
        self.run(|sql| sql.select(&rules))
    }

    /// Number of rows matching the filter, ignoring projection and window.
    /// `None` if the query fails.
    pub fn count(&self) -> Option<i64> {
        let rules = QueryRules::new(self.meta.clone())
            .with_expression(self.expression.clone())
            .with_func("count");
        let query = self.run(|sql| sql.select(&rules));
        query.rows().first()?.first()?.as_i64()
    }

    /// Delete the matching rows
    pub fn remove(&self) -> bool {
        let rules = self.rules();
        self.run(|sql| sql.delete_from(&rules)).is_ok()
    }

    fn run(&self, f: impl FnOnce(&mut litemodel_sql::StatementBuilder) -> bool) -> SqlQuery {
        let Some(mut sql) = self.connection.statement_builder() else {
            return SqlQuery::default();
        };
        if !f(&mut sql) {
            self.connection.set_last_query(sql.last_query().clone());
        }
        sql.last_query().clone()
    }
}
