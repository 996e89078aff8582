#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use litemodel_core::{Expression, Field, ModelMetaInfo, QueryRules, Value, ID_FIELD};
use litemodel_sql::{insert_fields, SqlStatement, SqliteStatement};

#[derive(Arbitrary, Debug)]
enum Term {
    Eq(String, i64),
    Like(String, String),
    IsNull(String),
    Between(String, f64, f64),
    In(String, Vec<i64>),
    Not(Box<Term>),
    And(Box<Term>, Box<Term>),
    Or(Box<Term>, Box<Term>),
}

#[derive(Arbitrary, Debug)]
struct Input {
    table: String,
    fields: Vec<String>,
    projection: Vec<String>,
    func: String,
    filter: Option<Term>,
    limit: u16,
    offset: u16,
}

fn expression(term: &Term, depth: usize) -> Expression {
    if depth > 16 {
        return Expression::Null;
    }
    match term {
        Term::Eq(c, v) => Expression::col(c.as_str()).eq(*v),
        Term::Like(c, p) => Expression::col(c.as_str()).like(p.as_str()),
        Term::IsNull(c) => Expression::col(c.as_str()).eq(Value::Null),
        Term::Between(c, lo, hi) => Expression::col(c.as_str()).between(*lo, *hi),
        Term::In(c, values) => Expression::col(c.as_str()).in_list(values.iter().copied()),
        Term::Not(t) => expression(t, depth + 1).not(),
        Term::And(a, b) => expression(a, depth + 1).and(expression(b, depth + 1)),
        Term::Or(a, b) => expression(a, depth + 1).or(expression(b, depth + 1)),
    }
}

fuzz_target!(|input: Input| {
    let meta = input
        .fields
        .iter()
        .take(32)
        .filter(|name| name.as_str() != ID_FIELD)
        .fold(ModelMetaInfo::builder(input.table.as_str()), |builder, name| {
            builder.field(Field::text(name.as_str()))
        })
        .build();

    let dialect = SqliteStatement;
    let _ = dialect.create_table_if_not_exists(&meta);
    let _ = dialect.replace_into(&meta, true);

    // Without an id, the insert must not name the id column
    assert!(!insert_fields(&meta, false).iter().any(|f| f == ID_FIELD));
    let _ = dialect.insert_into(&meta, false);

    let filter = input
        .filter
        .as_ref()
        .map(|t| expression(t, 0))
        .unwrap_or_default();
    let (sql, bindings) = filter.compile();
    for (name, _) in &bindings {
        assert!(sql.contains(name.as_str()));
    }

    let rules = QueryRules::new(meta)
        .with_expression(filter)
        .with_fields(input.projection.iter().take(16).map(String::as_str))
        .with_func(input.func.as_str())
        .with_limit(input.limit as usize)
        .with_offset(input.offset as usize);
    let select = dialect.select(&rules);
    assert!(select.starts_with("SELECT ALL ") && select.ends_with(';'));
    assert!(dialect.delete_from(&rules).starts_with("DELETE FROM "));
});
