//! Model metadata.
//!
//! Describes one mapped entity: its table name, ordered fields and the seed
//! rows written when its table is first created. Metadata is shared as
//! [`MetaInfo`] and identified by pointer, never by table name.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a model's metadata
pub type MetaInfo = Arc<ModelMetaInfo>;

/// Name of the primary key field every model starts with
pub const ID_FIELD: &str = "id";

/// Storage class of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// 64-bit signed integer
    Integer,
    /// Floating point
    Real,
    /// UTF-8 text
    Text,
    /// Raw bytes
    Blob,
    /// Boolean, stored as an integer
    Boolean,
}

/// A single model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: String,
    /// Storage class
    pub field_type: FieldType,
    /// Auto-increment primary key
    pub primary_key: bool,
    /// NOT NULL constraint
    pub not_null: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// Table whose `id` this field references
    pub references: Option<String>,
}

impl Field {
    /// Create a nullable field of the given type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            primary_key: false,
            not_null: false,
            unique: false,
            references: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Real)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Blob)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Auto-increment integer primary key
    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            primary_key: true,
            ..Self::integer(name)
        }
    }

    /// Integer field referencing another table's `id`
    pub fn foreign_key(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            references: Some(table.into()),
            ..Self::integer(name)
        }
    }

    /// Add a NOT NULL constraint
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Add a UNIQUE constraint
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// An ordered list of named values, one row of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a value, replacing any previous value for the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// True when the record carries a non-null `id`
    pub fn has_id(&self) -> bool {
        self.get(ID_FIELD).map_or(false, |v| !v.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Metadata for one mapped model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetaInfo {
    name: String,
    class_name: String,
    fields: Vec<Field>,
    initial_data: Vec<Record>,
}

impl ModelMetaInfo {
    /// Start building metadata for table `name`.
    ///
    /// The builder starts with an auto-increment `id` primary key.
    pub fn builder(name: impl Into<String>) -> ModelMetaBuilder {
        let name = name.into();
        ModelMetaBuilder {
            class_name: name.clone(),
            name,
            fields: vec![Field::primary_key(ID_FIELD)],
            initial_data: Vec::new(),
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name used in diagnostics
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn field_name_list(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Rows written right after the table is created
    pub fn initial_data(&self) -> &[Record] {
        &self.initial_data
    }

    /// Metadata without a table name or without fields cannot be registered
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() || self.fields.is_empty()
    }
}

/// Builder for [`ModelMetaInfo`]
#[derive(Debug, Clone)]
pub struct ModelMetaBuilder {
    name: String,
    class_name: String,
    fields: Vec<Field>,
    initial_data: Vec<Record>,
}

impl ModelMetaBuilder {
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Drop every field, including the implicit `id`
    pub fn clear_fields(mut self) -> Self {
        self.fields.clear();
        self
    }

    /// Add a seed row
    pub fn seed(mut self, record: Record) -> Self {
        self.initial_data.push(record);
        self
    }

    pub fn build(self) -> MetaInfo {
        Arc::new(ModelMetaInfo {
            name: self.name,
            class_name: self.class_name,
            fields: self.fields,
            initial_data: self.initial_data,
        })
    }
}

/// Identity of a registered model.
///
/// Derived from the address of the shared metadata, so it stays unique only
/// while some [`MetaInfo`] clone keeps that allocation alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey(usize);

impl ModelKey {
    pub fn of(meta: &MetaInfo) -> Self {
        ModelKey(Arc::as_ptr(meta) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> MetaInfo {
        ModelMetaInfo::builder("Person")
            .field(Field::text("name").not_null())
            .field(Field::integer("age"))
            .build()
    }

    #[test]
    fn test_builder_starts_with_id() {
        let meta = person();
        assert_eq!(meta.field_name_list(), vec!["id", "name", "age"]);
        assert!(meta.field("id").unwrap().primary_key);
        assert_eq!(meta.class_name(), "Person");
    }

    #[test]
    fn test_empty_meta() {
        assert!(ModelMetaInfo::builder("").build().is_empty());
        assert!(ModelMetaInfo::builder("T").clear_fields().build().is_empty());
        assert!(!person().is_empty());
    }

    #[test]
    fn test_model_key_is_identity() {
        let a = person();
        let b = person();
        assert_eq!(ModelKey::of(&a), ModelKey::of(&a.clone()));
        assert_ne!(ModelKey::of(&a), ModelKey::of(&b));
    }

    #[test]
    fn test_record_set_replaces() {
        let mut record = Record::new().with("name", "Alice").with("age", 30);
        record.set("age", 31);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("age"), Some(&Value::Integer(31)));
        assert!(!record.has_id());
        assert!(record.with("id", 4).has_id());
    }
}
