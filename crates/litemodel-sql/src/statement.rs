//! SQL statement rendering.
//!
//! [`SqlStatement`] turns model metadata and query rules into SQL text. The
//! provided methods render the statements every dialect shares; a dialect
//! supplies table DDL, index DDL and the table-existence probe.
//!
//! Rendering is pure: the same inputs always produce byte-identical SQL.
//! Metadata is not validated here, an empty table name renders as-is.

use litemodel_core::{Expression, IndexSpec, ModelMetaInfo, QueryRules, ID_FIELD};

/// Dialect-specific SQL rendering
pub trait SqlStatement: Send + Sync {
    /// Dialect name, for diagnostics
    fn name(&self) -> &'static str;

    /// `CREATE TABLE` for `info`, skipped by the database if the table exists
    fn create_table_if_not_exists(&self, info: &ModelMetaInfo) -> String;

    /// `CREATE INDEX` for `index`, skipped by the database if the index exists
    fn create_index_if_not_exists(&self, index: &IndexSpec) -> String;

    /// Query returning at least one row iff `info`'s table exists.
    ///
    /// The table name is bound to the `:name` placeholder.
    fn table_exists(&self, info: &ModelMetaInfo) -> String;

    /// `drop table <name>;`
    fn drop_table(&self, info: &ModelMetaInfo) -> String {
        format!("drop table {};", info.name())
    }

    /// `DROP INDEX IF EXISTS <name>;`
    fn drop_index_if_exists(&self, name: &str) -> String {
        format!("DROP INDEX IF EXISTS {};", name)
    }

    /// `INSERT INTO <name> (<fields>) values (<:fields>);`
    fn insert_into(&self, info: &ModelMetaInfo, with_id: bool) -> String {
        render_insert(info, "INSERT", &insert_fields(info, with_id))
    }

    /// `REPLACE INTO <name> (<fields>) values (<:fields>);`
    fn replace_into(&self, info: &ModelMetaInfo, with_id: bool) -> String {
        render_insert(info, "REPLACE", &insert_fields(info, with_id))
    }

    /// `SELECT ALL <projection> FROM <table> [WHERE ..] [LIMIT ..];`
    fn select(&self, rules: &QueryRules) -> String {
        let mut sql = self.select_core(rules);
        if rules.limit() > 0 {
            sql.push(' ');
            sql.push_str(&self.limit_and_offset(rules.limit(), rules.offset()));
        }
        sql.push(';');
        sql
    }

    /// `DELETE FROM <table> [WHERE ..] [LIMIT ..];`
    ///
    /// ORDER BY is not rendered, so a limited delete removes rows in
    /// whatever order the database visits them.
    fn delete_from(&self, rules: &QueryRules) -> String {
        let mut sql = format!("DELETE FROM {}", rules.meta_info().name());
        push_where(&mut sql, rules.expression());
        if rules.limit() > 0 {
            sql.push(' ');
            sql.push_str(&self.limit_and_offset(rules.limit(), rules.offset()));
        }
        sql.push(';');
        sql
    }

    /// `SELECT ALL <projection> FROM <table> [WHERE <expr>]`
    fn select_core(&self, rules: &QueryRules) -> String {
        let mut sql = format!(
            "SELECT ALL {} FROM {}",
            self.select_result_column(rules),
            rules.meta_info().name()
        );
        push_where(&mut sql, rules.expression());
        sql
    }

    /// `*`, a comma-joined field list, or either wrapped in the aggregate
    fn select_result_column(&self, rules: &QueryRules) -> String {
        let columns = if rules.fields().is_empty() {
            "*".to_string()
        } else {
            rules.fields().join(",")
        };
        match rules.func() {
            Some(func) => format!("{}({})", func, columns),
            None => columns,
        }
    }

    /// `LIMIT <limit>[ OFFSET <offset>]`
    fn limit_and_offset(&self, limit: usize, offset: usize) -> String {
        if offset > 0 {
            format!("LIMIT {} OFFSET {}", limit, offset)
        } else {
            format!("LIMIT {}", limit)
        }
    }
}

/// Fields written by an insert, in declaration order.
///
/// Without `with_id` the first field named `id` is left out.
pub fn insert_fields(info: &ModelMetaInfo, with_id: bool) -> Vec<String> {
    let mut fields = info.field_name_list();
    if !with_id {
        if let Some(idx) = fields.iter().position(|f| f == ID_FIELD) {
            fields.remove(idx);
        }
    }
    fields
}

fn render_insert(info: &ModelMetaInfo, kind: &str, fields: &[String]) -> String {
    let values: Vec<String> = fields.iter().map(|f| format!(":{}", f)).collect();
    format!(
        "{} INTO {} ({}) values ({});",
        kind,
        info.name(),
        fields.join(","),
        values.join(",")
    )
}

fn push_where(sql: &mut String, expression: &Expression) {
    if !expression.is_null() {
        sql.push_str(" WHERE ");
        sql.push_str(&expression.render());
    }
}
