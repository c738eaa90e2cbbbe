//! RSQL-style query parsing with schema-typed binding.
//!
//! This crate turns a URL query string such as
//! `filter=genres=in=(sci-fi,action);year=ge=2000&sort=-year&limit=10&page=2`
//! into typed [`Params`]: a filter tree whose values are converted to each
//! field's declared type, sort directives, selected columns, and
//! limit/offset paging.
//!
//! The pipeline has three stages:
//!
//! - [`filter`] lexes and parses the filter expression into an untyped
//!   [`filter::Node`] tree.
//! - [`bind`] resolves selectors through a [`schema::SchemaProvider`],
//!   checks operators against each field's allow-list and converts values.
//! - [`query`] handles the surrounding query-string keys.
//!
//! # Example
//!
//! ```
//! use rsql::schema::{DataType, FieldDescriptor, IntWidth, Schema};
//! use rsql::{ErrorKind, QueryParser, Value};
//!
//! let schema = Schema::builder()
//!     .field(FieldDescriptor::new("status", DataType::String).sortable(true))
//!     .field(FieldDescriptor::new("year", DataType::Int(IntWidth::W32)).column("release_year"))
//!     .build()
//!     .unwrap();
//! let parser = QueryParser::new(schema);
//!
//! let params = parser
//!     .parse_query(r#"filter=status=="APPROVED";year=ge=2000&sort=-status&limit=10"#)
//!     .unwrap();
//! let flat = params.flat_filters();
//! assert_eq!(flat[1].name, "release_year");
//! assert_eq!(flat[1].value, Value::Int(2000));
//!
//! let err = parser.parse_query("filter=year=like=20*").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::OperatorNotAllowed);
//! ```

pub mod bind;
pub mod error;
pub mod filter;
pub mod query;
pub mod schema;
pub mod value;

pub use bind::{Binder, FlatFilter, TypedComparison, TypedNode};
pub use error::{ConversionError, Error, ErrorKind, Result};
pub use filter::{FilterError, FilterParser, Node, Operator};
pub use query::{parse_query, Params, QueryOptions, QueryParser, Sort, SortDirection};
pub use schema::{DataType, FieldDescriptor, Schema, SchemaProvider};
pub use value::Value;
