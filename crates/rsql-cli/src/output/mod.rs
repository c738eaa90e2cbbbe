//! Output formatting utilities for the rsql CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules by what is being printed:
//!
//! - [`params`] - Parsed queries and bound filter trees
//! - [`tokens`] - Lexer token streams
//! - [`schema`] - Schema field listings
//! - [`helpers`] - Common formatting utilities (headers, values, truncation)

pub mod helpers;
mod params;
mod schema;
mod tokens;

// Params
pub use params::{format_filter_json, format_filter_table, format_params_json, format_params_table};

// Tokens
pub use tokens::{format_tokens_json, format_tokens_table};

// Schema
pub use schema::{format_schema_json, format_schema_table};
