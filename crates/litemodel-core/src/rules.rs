//! Query rules.
//!
//! The resolved, structural description of one SELECT or DELETE: target
//! model, filter, projection, aggregate function, limit and offset.

use crate::expression::Expression;
use crate::meta::MetaInfo;

/// Structural description of a select/delete operation
#[derive(Debug, Clone)]
pub struct QueryRules {
    meta_info: MetaInfo,
    expression: Expression,
    fields: Vec<String>,
    func: Option<String>,
    limit: usize,
    offset: usize,
}

impl QueryRules {
    /// Rules selecting every row and column of `meta_info`
    pub fn new(meta_info: MetaInfo) -> Self {
        Self {
            meta_info,
            expression: Expression::Null,
            fields: Vec::new(),
            func: None,
            limit: 0,
            offset: 0,
        }
    }

    /// Set the filter
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = expression;
        self
    }

    /// Set the projection. An empty list means all columns.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Wrap the projection in an aggregate function. An empty name clears it.
    pub fn with_func(mut self, func: impl Into<String>) -> Self {
        let func = func.into();
        self.func = if func.is_empty() { None } else { Some(func) };
        self
    }

    /// Maximum number of rows; 0 means unlimited
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn meta_info(&self) -> &MetaInfo {
        &self.meta_info
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn func(&self) -> Option<&str> {
        self.func.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::ModelMetaInfo;

    #[test]
    fn test_defaults() {
        let rules = QueryRules::new(ModelMetaInfo::builder("Person").build());
        assert!(rules.expression().is_null());
        assert!(rules.fields().is_empty());
        assert_eq!(rules.func(), None);
        assert_eq!((rules.limit(), rules.offset()), (0, 0));
        assert_eq!(rules.meta_info().name(), "Person");
    }

    #[test]
    fn test_empty_func_clears() {
        let rules = QueryRules::new(ModelMetaInfo::builder("Person").build())
            .with_func("count")
            .with_func("");
        assert_eq!(rules.func(), None);
    }
}
