/// Executable query object
///
/// Carries SQL text and named bindings to the database and keeps the outcome:
/// result rows, affected row count and the driver's error text.
use crate::database::Database;
use crate::sql_error;
use litemodel_core::{Result, Value};
use rusqlite::types::{ToSql, ValueRef};
use tracing::debug;

/// A prepared or executed statement
#[derive(Debug, Clone, Default)]
pub struct SqlQuery {
    database: Option<Database>,
    sql: String,
    bindings: Vec<(String, Value)>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    rows_affected: u64,
    error: Option<String>,
    executed: bool,
}

struct Outcome {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    rows_affected: u64,
}

impl SqlQuery {
    /// Create a query bound to `database`
    pub fn new(database: &Database) -> Self {
        Self {
            database: Some(database.clone()),
            ..Default::default()
        }
    }

    /// True when bound to an open database
    pub fn is_valid(&self) -> bool {
        self.database.as_ref().map_or(false, Database::is_open)
    }

    /// Set the SQL text, clearing bindings and any previous result
    pub fn prepare(&mut self, sql: impl Into<String>) {
        self.sql = sql.into();
        self.bindings.clear();
        self.reset_result();
        self.executed = false;
    }

    /// Bind a value to a named placeholder. The leading `:` is optional.
    pub fn bind_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let mut name = name.into();
        if !name.starts_with(':') {
            name.insert(0, ':');
        }
        let value = value.into();
        match self.bindings.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.bindings.push((name, value)),
        }
    }

    /// Execute the prepared statement
    pub fn exec(&mut self) -> bool {
        self.reset_result();
        self.executed = true;

        let outcome = match &self.database {
            Some(database) => database.with_conn(|conn| run(conn, &self.sql, &self.bindings)),
            None => Err(litemodel_core::Error::NotOpen),
        };

        match outcome {
            Ok(outcome) => {
                self.columns = outcome.columns;
                self.rows = outcome.rows;
                self.rows_affected = outcome.rows_affected;
                true
            }
            Err(e) => {
                debug!(sql = %self.sql, error = %e, "query failed");
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Prepare and execute `sql` without bindings
    pub fn exec_sql(&mut self, sql: impl Into<String>) -> bool {
        self.prepare(sql);
        self.exec()
    }

    /// The SQL text last prepared or run
    pub fn last_query(&self) -> &str {
        &self.sql
    }

    /// Error text of the last execution, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when executed without error
    pub fn is_ok(&self) -> bool {
        self.executed && self.error.is_none()
    }

    /// True once `exec` has run, whatever the outcome
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Named bindings in bind order
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }

    /// Result column names of the last execution
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Result rows of the last execution
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Value at `row`, column named `column`
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index)
    }

    /// Rows changed by the last data-modifying statement
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// The database this query runs on
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    fn reset_result(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.rows_affected = 0;
        self.error = None;
    }
}

fn run(conn: &rusqlite::Connection, sql: &str, bindings: &[(String, Value)]) -> Result<Outcome> {
    let mut stmt = conn.prepare(sql).map_err(sql_error)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let values: Vec<rusqlite::types::Value> = bindings.iter().map(|(_, v)| to_sql(v)).collect();
    let params: Vec<(&str, &dyn ToSql)> = bindings
        .iter()
        .zip(&values)
        .map(|((name, _), value)| (name.as_str(), value as &dyn ToSql))
        .collect();

    // changes() keeps the count of the last DML across DDL, so diff the totals
    let changes_before = if columns.is_empty() {
        Some(total_changes(conn)?)
    } else {
        None
    };

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params.as_slice()).map_err(sql_error)?;
    while let Some(row) = cursor.next().map_err(sql_error)? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(from_sql(row.get_ref(i).map_err(sql_error)?));
        }
        rows.push(values);
    }
    drop(cursor);

    let rows_affected = match changes_before {
        Some(before) => total_changes(conn)?.saturating_sub(before),
        None => 0,
    };

    Ok(Outcome {
        columns,
        rows,
        rows_affected,
    })
}

fn total_changes(conn: &rusqlite::Connection) -> Result<u64> {
    conn.query_row("SELECT total_changes();", [], |row| row.get::<_, i64>(0))
        .map(|n| n.max(0) as u64)
        .map_err(sql_error)
}

fn to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Integer(i) => Sql::Integer(*i),
        Value::Float(f) => Sql::Real(*f),
        Value::String(s) => Sql::Text(s.clone()),
        Value::Boolean(b) => Sql::Integer(i64::from(*b)),
        Value::Blob(bytes) => Sql::Blob(bytes.clone()),
        Value::Null => Sql::Null,
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Database {
        let db = Database::in_memory().unwrap();
        let mut query = db.query();
        assert!(query.exec_sql(
            "CREATE TABLE Person (id INTEGER PRIMARY KEY, name TEXT, age INTEGER);"
        ));
        db
    }

    #[test]
    fn test_default_query_fails_cleanly() {
        let mut query = SqlQuery::default();
        assert!(!query.is_valid());
        assert!(!query.exec_sql("SELECT 1;"));
        assert_eq!(query.last_error(), Some("Not open"));
        assert_eq!(query.last_query(), "SELECT 1;");
        assert!(!query.is_ok());
    }

    #[test]
    fn test_named_bindings() {
        let db = people();
        let mut insert = db.query();
        insert.prepare("INSERT INTO Person (name,age) values (:name,:age);");
        insert.bind_value("name", "Alice");
        insert.bind_value(":age", 30);
        assert!(insert.exec());
        assert_eq!(insert.rows_affected(), 1);

        let mut select = db.query();
        select.prepare("SELECT name, age FROM Person WHERE age > :min;");
        select.bind_value("min", 18);
        assert!(select.exec());
        assert_eq!(select.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(select.value(0, "name"), Some(&Value::String("Alice".into())));
        assert_eq!(select.value(0, "age"), Some(&Value::Integer(30)));
    }

    #[test]
    fn test_rebinding_replaces_value() {
        let mut query = SqlQuery::default();
        query.bind_value("x", 1);
        query.bind_value(":x", 2);
        assert_eq!(query.bindings(), &[(":x".to_string(), Value::Integer(2))]);
    }

    #[test]
    fn test_error_is_recorded() {
        let db = people();
        let mut query = db.query();
        assert!(!query.exec_sql("SELECT * FROM Missing;"));
        assert!(query.last_error().unwrap().contains("no such table"));
        assert!(query.is_executed());
    }

    #[test]
    fn test_rows_affected_is_per_statement() {
        let db = people();
        let mut query = db.query();
        assert!(query.exec_sql("INSERT INTO Person (name) values ('a'), ('b');"));
        assert_eq!(query.rows_affected(), 2);

        assert!(query.exec_sql("CREATE INDEX person_name ON Person (name);"));
        assert_eq!(query.rows_affected(), 0);
        assert!(query.exec_sql("DROP INDEX person_name;"));
        assert_eq!(query.rows_affected(), 0);

        assert!(query.exec_sql("SELECT * FROM Person;"));
        assert_eq!(query.rows_affected(), 0);
        assert!(query.exec_sql("DELETE FROM Person WHERE name = 'a';"));
        assert_eq!(query.rows_affected(), 1);
    }

    #[test]
    fn test_booleans_and_blobs() {
        let db = Database::in_memory().unwrap();
        let mut query = db.query();
        assert!(query.exec_sql("CREATE TABLE Flag (on_off INTEGER, data BLOB);"));
        query.prepare("INSERT INTO Flag (on_off,data) values (:on_off,:data);");
        query.bind_value("on_off", true);
        query.bind_value("data", vec![1u8, 2, 3]);
        assert!(query.exec());

        assert!(query.exec_sql("SELECT on_off, data FROM Flag;"));
        assert_eq!(query.value(0, "on_off").and_then(Value::as_i64), Some(1));
        assert_eq!(query.value(0, "data"), Some(&Value::Blob(vec![1, 2, 3])));
    }
}
