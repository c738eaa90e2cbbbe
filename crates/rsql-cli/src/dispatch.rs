//! Command dispatch module for routing CLI commands to their handlers.

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::{self, CommandContext, CommandError, Result};

/// A command resolved from the CLI, borrowing its arguments.
pub enum Dispatch<'a> {
    Parse { query: &'a str, flat: bool },
    Filter { expression: &'a str },
    Tokens { expression: &'a str },
    Schema,
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Creates a dispatch from the parsed CLI.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Parse { query, flat }) => Self::Parse { query, flat: *flat },
            Some(Commands::Filter { expression }) => Self::Filter { expression },
            Some(Commands::Tokens { expression }) => Self::Tokens { expression },
            Some(Commands::Schema) => Self::Schema,
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }

    /// Executes the command.
    pub fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Parse { query, flat } => {
                let opts = commands::parse::ParseOptions { query, flat: *flat };
                commands::parse::execute(ctx, &opts)
            }
            Self::Filter { expression } => commands::filter::execute(ctx, expression),
            Self::Tokens { expression } => commands::tokens::execute(ctx, expression),
            Self::Schema => commands::schema::execute(ctx),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("rsql - RSQL query inspector");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}
