//! Schema command implementation.
//!
//! Lists the fields of the configured schema.

use super::{CommandContext, Result};
use crate::output::{format_schema_json, format_schema_table};

/// Executes the schema command.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let schema = ctx.require_schema()?;

    if ctx.json_output {
        println!("{}", format_schema_json(schema.fields())?);
    } else if !ctx.quiet {
        print!("{}", format_schema_table(schema.fields(), ctx.use_colors));
    }
    Ok(())
}
