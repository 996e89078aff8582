//! # litemodel Core
//!
//! Core types for the litemodel object-relational mapping layer.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of litemodel.**
//!
//! Users should depend on the main `litemodel` crate instead, which
//! re-exports everything needed from here.
//!
//! Nothing in this crate performs I/O: it holds model metadata, filter
//! expressions, query rules and index specifications, which the SQL crate
//! renders into statements.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
/// Filter expressions
#[allow(missing_docs)]
pub mod expression;
pub mod index;
#[allow(missing_docs)]
pub mod meta;
#[allow(missing_docs)]
pub mod rules;
/// Column values
#[allow(missing_docs)]
pub mod value;

pub use error::{Error, Result};
pub use expression::{BinaryOperator, Expression, LogicalOperator};
pub use index::{IndexSpec, SortOrder};
pub use meta::{
    Field, FieldType, MetaInfo, ModelKey, ModelMetaBuilder, ModelMetaInfo, Record, ID_FIELD,
};
pub use rules::QueryRules;
pub use value::Value;
