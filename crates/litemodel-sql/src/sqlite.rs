//! SQLite dialect.

use crate::statement::SqlStatement;
use litemodel_core::{Field, FieldType, IndexSpec, ModelMetaInfo};

/// Statement rendering for SQLite
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteStatement;

impl SqliteStatement {
    fn column_type(field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Integer | FieldType::Boolean => "INTEGER",
            FieldType::Real => "REAL",
            FieldType::Text => "TEXT",
            FieldType::Blob => "BLOB",
        }
    }

    fn column_def(field: &Field) -> String {
        let mut def = format!("{} {}", field.name, Self::column_type(field.field_type));
        if field.primary_key {
            def.push_str(" PRIMARY KEY AUTOINCREMENT");
        }
        if field.not_null {
            def.push_str(" NOT NULL");
        }
        if field.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(table) = &field.references {
            def.push_str(&format!(" REFERENCES {}(id)", table));
        }
        def
    }
}

impl SqlStatement for SqliteStatement {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn create_table_if_not_exists(&self, info: &ModelMetaInfo) -> String {
        let columns: Vec<String> = info.fields().iter().map(Self::column_def).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            info.name(),
            columns.join(",")
        )
    }

    fn create_index_if_not_exists(&self, index: &IndexSpec) -> String {
        let columns: Vec<String> = index
            .columns()
            .iter()
            .map(|(column, order)| format!("{} {}", column, order))
            .collect();
        format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({});",
            if index.is_unique() { "UNIQUE " } else { "" },
            index.name(),
            index.meta_info().name(),
            columns.join(",")
        )
    }

    fn table_exists(&self, _info: &ModelMetaInfo) -> String {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = :name;".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litemodel_core::{MetaInfo, ModelMetaInfo};

    fn pet() -> MetaInfo {
        ModelMetaInfo::builder("Pet")
            .field(Field::text("name").not_null().unique())
            .field(Field::real("weight"))
            .field(Field::boolean("vaccinated"))
            .field(Field::blob("photo"))
            .field(Field::foreign_key("owner", "Person"))
            .build()
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            SqliteStatement.create_table_if_not_exists(&pet()),
            "CREATE TABLE IF NOT EXISTS Pet (id INTEGER PRIMARY KEY AUTOINCREMENT,\
             name TEXT NOT NULL UNIQUE,weight REAL,vaccinated INTEGER,photo BLOB,\
             owner INTEGER REFERENCES Person(id));"
        );
    }

    #[test]
    fn test_create_index() {
        let index = IndexSpec::new("pet_name", pet()).asc("name").desc("weight");
        assert_eq!(
            SqliteStatement.create_index_if_not_exists(&index),
            "CREATE INDEX IF NOT EXISTS pet_name ON Pet (name ASC,weight DESC);"
        );
        let unique = IndexSpec::new("pet_owner", pet()).asc("owner").unique();
        assert_eq!(
            SqliteStatement.create_index_if_not_exists(&unique),
            "CREATE UNIQUE INDEX IF NOT EXISTS pet_owner ON Pet (owner ASC);"
        );
    }

    #[test]
    fn test_drop_index() {
        assert_eq!(
            SqliteStatement.drop_index_if_exists("pet_name"),
            "DROP INDEX IF EXISTS pet_name;"
        );
    }
}
