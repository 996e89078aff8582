//! Index specifications.
//!
//! Describes a secondary index on one model's table. Rendering to DDL is
//! dialect specific and lives with the statement builders.

use crate::meta::MetaInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction of an indexed column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending (default)
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// An index on a model's table
#[derive(Debug, Clone)]
pub struct IndexSpec {
    name: String,
    meta_info: MetaInfo,
    columns: Vec<(String, SortOrder)>,
    unique: bool,
}

impl IndexSpec {
    /// Create an index named `name` on `meta_info`'s table
    pub fn new(name: impl Into<String>, meta_info: MetaInfo) -> Self {
        Self {
            name: name.into(),
            meta_info,
            columns: Vec::new(),
            unique: false,
        }
    }

    /// Append an ascending column
    pub fn asc(self, column: impl Into<String>) -> Self {
        self.column(column, SortOrder::Asc)
    }

    /// Append a descending column
    pub fn desc(self, column: impl Into<String>) -> Self {
        self.column(column, SortOrder::Desc)
    }

    pub fn column(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.columns.push((column.into(), order));
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta_info(&self) -> &MetaInfo {
        &self.meta_info
    }

    pub fn columns(&self) -> &[(String, SortOrder)] {
        &self.columns
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }
}
