//! Binding of a filter syntax tree to a schema.
//!
//! The [`Binder`] walks a [`Node`] tree, resolves each selector through a
//! [`SchemaProvider`], checks the operator against the field's allow-list,
//! and converts every argument to the field's declared type. The result is
//! a [`TypedNode`] tree with the same shape as the input.
//!
//! Without a schema the binder accepts every selector and operator and
//! keeps arguments as strings.

mod convert;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{find_similar_name, ConversionError, Error, Result};
use crate::filter::{Comparison, Logic, Node, Operator};
use crate::schema::{DataType, FieldDescriptor, SchemaProvider};
use crate::value::Value;

pub(crate) use convert::convert_value;
pub use convert::parse_time;

/// A comparison whose field is resolved and whose values are typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedComparison {
    /// Public field name.
    pub field: String,
    /// Backing column name.
    pub column: String,
    pub operator: Operator,
    /// One value per argument, in source order.
    pub values: Vec<Value>,
}

impl TypedComparison {
    /// The comparison's value: a single value for single-valued operators,
    /// a [`Value::List`] for `=in=` and `=out=`.
    pub fn value(&self) -> Value {
        match self.values.as_slice() {
            [single] if !self.operator.is_multi_valued() => single.clone(),
            values => Value::List(values.to_vec()),
        }
    }
}

/// A node of the typed filter tree. Mirrors [`Node`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypedNode {
    Group(Vec<TypedNode>),
    Comparison(TypedComparison),
    Logical(Logic),
}

/// One entry of the flat filter view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatFilter {
    /// Column name (the public name when parsing without a schema).
    pub name: String,
    pub operator: Operator,
    pub value: Value,
}

impl TypedNode {
    /// Returns true for an empty group.
    pub fn is_empty(&self) -> bool {
        matches!(self, TypedNode::Group(children) if children.is_empty())
    }

    /// Returns the comparisons in depth-first, left-to-right order.
    pub fn comparisons(&self) -> Vec<&TypedComparison> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a TypedComparison>) {
        match self {
            TypedNode::Group(children) => children.iter().for_each(|c| c.collect(out)),
            TypedNode::Comparison(comparison) => out.push(comparison),
            TypedNode::Logical(_) => {}
        }
    }

    /// Flattens the tree into a list of column/operator/value triples.
    ///
    /// Grouping and connectives are discarded, so this view is only exact
    /// for pure conjunctions.
    pub fn flatten(&self) -> Vec<FlatFilter> {
        self.comparisons()
            .into_iter()
            .map(|c| FlatFilter {
                name: c.column.clone(),
                operator: c.operator,
                value: c.value(),
            })
            .collect()
    }
}

/// Converts untyped trees into typed trees against an optional schema.
///
/// A binder borrows its schema and holds no other state, so one schema can
/// back any number of concurrent binders.
#[derive(Clone, Copy)]
pub struct Binder<'s> {
    schema: Option<&'s dyn SchemaProvider>,
}

impl<'s> Binder<'s> {
    /// Creates a binder validating against `schema`.
    pub fn new(schema: &'s dyn SchemaProvider) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Creates a binder that accepts every selector and keeps values as strings.
    pub fn untyped() -> Self {
        Self { schema: None }
    }

    /// Creates a binder from an optional schema.
    pub fn with_schema(schema: Option<&'s dyn SchemaProvider>) -> Self {
        Self { schema }
    }

    /// Binds a whole tree.
    ///
    /// # Errors
    ///
    /// Stops at the first comparison that names an unknown or unfilterable
    /// field, uses a disallowed operator, or carries a value that does not
    /// convert to the field's type.
    pub fn bind(&self, node: &Node) -> Result<TypedNode> {
        match node {
            Node::Group(children) => children
                .iter()
                .map(|child| self.bind(child))
                .collect::<Result<Vec<_>>>()
                .map(TypedNode::Group),
            Node::Comparison(comparison) => self.bind_comparison(comparison).map(TypedNode::Comparison),
            Node::Logical(logic) => Ok(TypedNode::Logical(*logic)),
        }
    }

    /// Binds a single comparison.
    pub fn bind_comparison(&self, comparison: &Comparison) -> Result<TypedComparison> {
        let Some(schema) = self.schema else {
            return Ok(TypedComparison {
                field: comparison.selector.clone(),
                column: comparison.selector.clone(),
                operator: comparison.operator,
                values: comparison
                    .arguments
                    .iter()
                    .map(|a| Value::String(a.clone()))
                    .collect(),
            });
        };

        let field = resolve(schema, &comparison.selector)?;
        if !field.is_filterable() {
            return Err(Error::NotFilterable {
                field: field.name().to_string(),
            });
        }

        let allowed = field.allowed_operators();
        if !allowed.contains(comparison.operator) {
            debug!(
                field = field.name(),
                operator = comparison.operator.name(),
                "operator not allowed"
            );
            return Err(Error::OperatorNotAllowed {
                field: field.name().to_string(),
                operator: comparison.operator,
                allowed,
            });
        }

        let boolean = DataType::Bool;
        let target = if comparison.operator == Operator::IsNull {
            &boolean
        } else {
            field.data_type()
        };
        let values = comparison
            .arguments
            .iter()
            .map(|raw| convert_value(target, raw).map_err(|e| conversion_error(field, raw, e)))
            .collect::<Result<Vec<_>>>()?;

        trace!(
            field = field.name(),
            column = field.column_name(),
            values = values.len(),
            "bound comparison"
        );
        Ok(TypedComparison {
            field: field.name().to_string(),
            column: field.column_name().to_string(),
            operator: comparison.operator,
            values,
        })
    }
}

/// Looks up `name`, producing an unknown-field error with a suggestion.
pub(crate) fn resolve<'a>(schema: &'a dyn SchemaProvider, name: &str) -> Result<&'a FieldDescriptor> {
    schema.lookup(name).ok_or_else(|| Error::UnknownField {
        field: name.to_string(),
        suggestion: find_similar_name(name, schema.field_names().into_iter()),
    })
}

fn conversion_error(field: &FieldDescriptor, raw: &str, source: ConversionError) -> Error {
    match source {
        ConversionError::Unsupported { type_name } => Error::UnsupportedType {
            field: field.name().to_string(),
            type_name,
        },
        source => Error::Conversion {
            field: field.name().to_string(),
            value: raw.to_string(),
            source,
        },
    }
}
