//! Parse command implementation.
//!
//! Parses a full query string and prints the resulting params.

use rsql::QueryParser;
use tracing::debug;

use super::{CommandContext, Result};
use crate::output::{format_params_json, format_params_table};

/// Options for the parse command.
pub struct ParseOptions<'a> {
    /// The URL-decoded query string.
    pub query: &'a str,
    /// Print filters as a flat list instead of a tree.
    pub flat: bool,
}

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, opts: &ParseOptions) -> Result<()> {
    let parser = match ctx.load_schema()? {
        Some(schema) => QueryParser::new(schema),
        None => QueryParser::untyped(),
    }
    .with_options(ctx.query_options.clone());
    debug!(query = opts.query, typed = parser.schema().is_some(), "parsing query");

    let params = parser.parse_query(opts.query)?;

    if ctx.json_output {
        println!("{}", format_params_json(&params, opts.flat)?);
    } else if !ctx.quiet {
        print!("{}", format_params_table(&params, opts.flat, ctx.use_colors));
    }
    Ok(())
}
