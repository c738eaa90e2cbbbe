//! Filter expression lexer and parser for RSQL-style syntax.
//!
//! This module turns a filter expression into an untyped syntax tree. It
//! knows nothing about schemas; see [`crate::bind`] for typing and
//! validation.
//!
//! # Supported Syntax
//!
//! ## Comparisons
//! - `name==value`, `name=eq=value` - equal
//! - `name!=value`, `name=ne=value` - not equal
//! - `name>value`, `name=gt=value` - greater than
//! - `name>=value`, `name=ge=value` - greater or equal
//! - `name<value`, `name=lt=value` - less than
//! - `name<=value`, `name=le=value` - less or equal
//! - `name=like=value` - pattern match
//! - `name=in=(a,b)`, `name=out=(a,b)` - membership
//! - `name=isnull=true` - null check
//!
//! ## Values
//! - bare: `2003`, `sci-fi`, `*Bale` (ends at whitespace or `"'();,=!~<>`)
//! - quoted: `'Kill Bill'`, `"Kill Bill"`, with `\` escaping the next character
//!
//! ## Boolean Operators
//! - `;` or `and` - AND
//! - `,` or `or` - OR
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use rsql::filter::{FilterParser, Operator};
//!
//! let tree = FilterParser::parse("genres=in=(sci-fi,action);year=ge=2000").unwrap();
//! let comparisons = tree.comparisons();
//! assert_eq!(comparisons[0].operator, Operator::In);
//! assert_eq!(comparisons[0].arguments, vec!["sci-fi", "action"]);
//! ```

mod ast;
mod error;
mod lexer;
mod operator;
mod parser;

pub use ast::{Comparison, Logic, Node};
pub use error::{FilterError, FilterResult};
pub use lexer::{Lexer, Token, TokenKind};
pub use operator::{Operator, OperatorSet, TypeCategory};
pub use parser::{FilterParser, MAX_GROUP_DEPTH};

#[cfg(test)]
mod tests;
