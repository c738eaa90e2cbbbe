//! Filter command implementation.
//!
//! Parses a bare filter expression, binds it against the loaded schema and
//! prints the canonical expression next to the typed tree.

use rsql::{Binder, FilterParser};

use super::{CommandContext, Result};
use crate::output::{format_filter_json, format_filter_table};

/// Executes the filter command.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let node = FilterParser::parse(expression).map_err(rsql::Error::from)?;

    let schema = ctx.load_schema()?;
    let binder = match &schema {
        Some(schema) => Binder::new(schema),
        None => Binder::untyped(),
    };
    let tree = binder.bind(&node)?;

    let canonical = node.to_string();
    if ctx.json_output {
        println!("{}", format_filter_json(canonical, &tree)?);
    } else if !ctx.quiet {
        print!("{}", format_filter_table(&canonical, &tree, ctx.use_colors));
    }
    Ok(())
}
