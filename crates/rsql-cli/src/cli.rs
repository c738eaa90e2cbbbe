//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the rsql CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// rsql - Inspect how RSQL-style query strings parse and bind
#[derive(Parser, Debug)]
#[command(name = "rsql")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Schema file (TOML or JSON) to bind against (default: from config)
    #[arg(long, global = true, env = "RSQL_SCHEMA")]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a full query string (filter, sort, select, limit, page, cursor)
    #[command(alias = "p")]
    Parse {
        /// URL-decoded query string, e.g. "filter=no=gt=1991&sort=-no&limit=10"
        query: String,

        /// Print filters as a flat list instead of a tree
        #[arg(long)]
        flat: bool,
    },

    /// Parse and bind a bare filter expression
    #[command(alias = "f")]
    Filter {
        /// Filter expression, e.g. "genres=in=(sci-fi,action);year=ge=2000"
        expression: String,
    },

    /// Print the lexer's token stream for a filter expression
    #[command(alias = "t")]
    Tokens {
        /// Filter expression
        expression: String,
    },

    /// List the fields of the loaded schema
    Schema,

    /// View configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,
}

/// Supported shells for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}
