//! Tokens command implementation.
//!
//! Prints the lexer's token stream, including the terminal token. A lexical
//! error is printed as its token and then reported as the command's error.

use rsql::filter::Lexer;

use super::{CommandContext, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Executes the tokens command.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let mut lexer = Lexer::new(expression);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let terminal = token.is_terminal();
        tokens.push(token);
        if terminal {
            break;
        }
    }

    if ctx.json_output {
        println!("{}", format_tokens_json(&tokens)?);
    } else if !ctx.quiet {
        print!("{}", format_tokens_table(&tokens, ctx.use_colors));
    }

    match lexer.take_error() {
        Some(error) => Err(rsql::Error::from(error).into()),
        None => Ok(()),
    }
}
