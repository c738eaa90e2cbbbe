//! Field schemas: what can be filtered, sorted and how values convert.
//!
//! A schema is a set of [`FieldDescriptor`]s keyed by public field name.
//! Build one in code with [`Schema::builder`] or load it from a
//! [`SchemaConfig`] (TOML or JSON via serde). Parsing against a schema is
//! optional; without one the binder passes selectors and values through
//! untouched.
//!
//! # Example
//!
//! ```
//! use rsql::filter::Operator;
//! use rsql::schema::{DataType, FieldDescriptor, IntWidth, Schema, SchemaProvider};
//!
//! let schema = Schema::builder()
//!     .field(FieldDescriptor::new("status", DataType::String).sortable(true))
//!     .field(
//!         FieldDescriptor::new("no", DataType::Int(IntWidth::W32))
//!             .column("No2")
//!             .allow([Operator::Equal, Operator::GreaterThan, Operator::GreaterOrEqual]),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let no = schema.lookup("no").unwrap();
//! assert_eq!(no.column_name(), "No2");
//! assert!(!no.allowed_operators().contains(Operator::Like));
//! ```

mod config;
mod scanner;
mod types;

use std::collections::HashMap;

use thiserror::Error;

use crate::filter::{Operator, OperatorSet};

pub use config::{FieldConfig, SchemaConfig};
pub use scanner::{ScanSource, Scanner, SqlNull};
pub use types::{DataType, FloatWidth, IntWidth};

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two fields share a public name.
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    /// A field has an empty public name.
    #[error("field name cannot be empty")]
    EmptyName,

    /// An allow-list entry is not an operator name.
    #[error("field '{field}': {reason}")]
    InvalidAllowList {
        /// The field name.
        field: String,
        /// The parse failure.
        reason: String,
    },
}

/// Describes one queryable field.
///
/// Descriptors are immutable once added to a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    column: String,
    data_type: DataType,
    filterable: bool,
    sortable: bool,
    allowed: Option<OperatorSet>,
}

impl FieldDescriptor {
    /// Creates a filterable, non-sortable field whose column name equals its
    /// public name and whose operators default from its type.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            data_type,
            filterable: true,
            sortable: false,
            allowed: None,
        }
    }

    /// Sets the backing column name.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Sets whether the field may appear in a filter.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets whether the field may appear in a sort key.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Restricts the field to the given operators, replacing the type's defaults.
    pub fn allow(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.allowed = Some(operators.into_iter().collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// The explicitly declared allow-list, if any.
    pub fn declared_operators(&self) -> Option<OperatorSet> {
        self.allowed
    }

    /// The operators a comparison on this field may use: the declared
    /// allow-list when present, otherwise the type's defaults.
    pub fn allowed_operators(&self) -> OperatorSet {
        self.allowed
            .unwrap_or_else(|| self.data_type.default_operators())
    }
}

/// Resolves public field names to descriptors.
///
/// Implementations are shared between threads and must answer lookups
/// without mutation.
pub trait SchemaProvider: Send + Sync {
    /// Returns the descriptor for `name`, if declared.
    fn lookup(&self, name: &str) -> Option<&FieldDescriptor>;

    /// All declared field names, used for "did you mean" suggestions.
    fn field_names(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// An in-memory schema keyed by public field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Starts building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Creates a schema from a list of descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or declared twice.
    pub fn new(fields: impl IntoIterator<Item = FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut schema = Schema::default();
        for field in fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if schema.index.contains_key(&field.name) {
                return Err(SchemaError::DuplicateField(field.name));
            }
            schema.index.insert(field.name.clone(), schema.fields.len());
            schema.fields.push(field);
        }
        Ok(schema)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SchemaProvider for Schema {
    fn lookup(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Adds a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or declared twice.
    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::new(self.fields)
    }
}
