//! Command implementations for the rsql CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod filter;
pub mod parse;
pub mod schema;
pub mod tokens;

use std::fs;
use std::path::{Path, PathBuf};

use rsql::schema::{Schema, SchemaConfig, SchemaError};
use rsql::QueryOptions;
use tracing::debug;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Query, filter or binding error.
    #[error("{0}")]
    Query(#[from] rsql::Error),

    /// Schema declaration error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration or schema-file error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Schema file to bind against, from the flag or the config.
    pub schema_path: Option<PathBuf>,
    /// Query key names and paging defaults.
    pub query_options: QueryOptions,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color
                && std::env::var_os("NO_COLOR").is_none()
                && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            schema_path: cli.schema.clone().or_else(|| config.schema.clone()),
            query_options: config.query.clone(),
        }
    }

    /// Loads the configured schema, if any.
    pub fn load_schema(&self) -> Result<Option<Schema>> {
        self.schema_path.as_deref().map(load_schema).transpose()
    }

    /// Loads the configured schema, failing if none is configured.
    pub fn require_schema(&self) -> Result<Schema> {
        self.load_schema()?.ok_or_else(|| {
            CommandError::Config(
                "no schema configured; pass --schema, set RSQL_SCHEMA or add 'schema' to the config"
                    .to_string(),
            )
        })
    }
}

/// Reads a schema file. Files ending in `.json` are read as JSON, anything
/// else as TOML.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path).map_err(|e| {
        CommandError::Config(format!("Failed to read schema file {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config: SchemaConfig = if is_json {
        serde_json::from_str(&content).map_err(|e| {
            CommandError::Config(format!("Failed to parse schema file {}: {}", path.display(), e))
        })?
    } else {
        toml::from_str(&content).map_err(|e| {
            CommandError::Config(format!("Failed to parse schema file {}: {}", path.display(), e))
        })?
    };

    let schema = Schema::try_from(config)?;
    debug!(path = %path.display(), fields = schema.len(), "loaded schema");
    Ok(schema)
}
