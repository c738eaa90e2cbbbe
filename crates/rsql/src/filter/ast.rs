//! Abstract Syntax Tree (AST) for filter expressions.

use std::fmt;

use serde::Serialize;

use super::operator::Operator;

/// A logical connective between two siblings of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    /// Conjunction (`;` or `and`).
    And,
    /// Disjunction (`,` or `or`).
    Or,
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::And => f.write_str(";"),
            Logic::Or => f.write_str(","),
        }
    }
}

/// A single comparison: `selector operator arguments`.
///
/// Arguments are the raw, unescaped value strings. Only multi-valued
/// operators (`=in=`, `=out=`) carry more than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// The field name as written in the expression.
    pub selector: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The raw value arguments.
    pub arguments: Vec<String>,
}

impl Comparison {
    /// Creates a comparison.
    pub fn new(
        selector: impl Into<String>,
        operator: Operator,
        arguments: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            selector: selector.into(),
            operator,
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.selector, self.operator)?;
        if self.arguments.len() == 1 && !self.operator.is_multi_valued() {
            return write_quoted(f, &self.arguments[0]);
        }
        f.write_str("(")?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write_quoted(f, argument)?;
        }
        f.write_str(")")
    }
}

/// Writes `value` single-quoted, escaping `'` and `\`.
fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("'")
}

/// A node of the filter AST.
///
/// A group's children always follow the shape
/// `operand (logical operand)*`, where an operand is a comparison or a
/// nested group. The parser never builds any other sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    /// A parenthesized sub-expression, or the implicit top-level expression.
    Group(Vec<Node>),
    /// A comparison leaf.
    Comparison(Comparison),
    /// A connective between the surrounding siblings.
    Logical(Logic),
}

impl Node {
    /// Returns true for an empty group (the result of an empty expression).
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Group(children) if children.is_empty())
    }

    /// Returns the comparisons of the tree in depth-first, left-to-right order.
    ///
    /// This discards grouping and connectives; callers that generate queries
    /// must walk the tree instead.
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Node::Group(children) => {
                for child in children {
                    child.collect_comparisons(out);
                }
            }
            Node::Comparison(comparison) => out.push(comparison),
            Node::Logical(_) => {}
        }
    }
}

impl fmt::Display for Node {
    /// Renders the canonical text form. The top-level group is written
    /// without parentheses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Group(children) => {
                for child in children {
                    match child {
                        Node::Group(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Node::Comparison(comparison) => write!(f, "{comparison}"),
            Node::Logical(logic) => write!(f, "{logic}"),
        }
    }
}
