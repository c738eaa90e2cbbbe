//! Config command implementation.
//!
//! View configuration settings.
//! Config file is located at ~/.config/rsql/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use rsql::QueryOptions;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Current config file version.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "RSQL_CONFIG";

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default schema file, used when `--schema` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,

    /// Query key names and paging defaults.
    #[serde(default)]
    pub query: QueryOptions,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            schema: None,
            query: QueryOptions::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config file path.
///
/// `RSQL_CONFIG` wins, then `$XDG_CONFIG_HOME/rsql/config.toml`, then
/// `~/.config/rsql/config.toml` on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("rsql").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("rsql").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let mut config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("Settings:");
        match config.schema {
            Some(ref schema) => println!("  schema: {}", schema.display()),
            None => println!("  schema: (none)"),
        }

        let query = &config.query;
        println!("\n[query]");
        println!("  filter_key: {}", query.filter_key);
        println!("  sort_key: {}", query.sort_key);
        println!("  select_key: {}", query.select_key);
        println!("  limit_key: {}", query.limit_key);
        println!("  page_key: {}", query.page_key);
        println!("  cursor_key: {}", query.cursor_key);
        println!("  default_limit: {}", query.default_limit);
        if let Some(max) = query.max_limit {
            println!("  max_limit: {}", max);
        }

        println!("\n[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    /// Runs `f` with `RSQL_CONFIG` pointing at `path`, restoring it afterwards.
    fn with_config_env<T>(path: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let original = env::var(CONFIG_ENV).ok();
        env::set_var(CONFIG_ENV, path);
        let result = f();
        match original {
            Some(val) => env::set_var(CONFIG_ENV, val),
            None => env::remove_var(CONFIG_ENV),
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.schema.is_none());
        assert_eq!(config.query, QueryOptions::default());
        assert!(config.output.color.is_none());
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.query.default_limit, 20);
    }

    #[test]
    fn test_config_deserialization_partial() {
        let toml_str = r#"
schema = "/etc/rsql/movies.toml"

[query]
filter_key = "q"
max_limit = 50

[output]
color = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.schema, Some(PathBuf::from("/etc/rsql/movies.toml")));
        assert_eq!(config.query.filter_key, "q");
        assert_eq!(config.query.sort_key, "sort");
        assert_eq!(config.query.max_limit, Some(50));
        assert_eq!(config.output.color, Some(false));
    }

    #[test]
    fn test_config_serialization_skips_unset() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(serialized.contains("version = 1"));
        assert!(!serialized.contains("schema ="));
        assert!(!serialized.contains("max_limit"));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        let path = PathBuf::from("/tmp/rsql-test/config.toml");
        let resolved = with_config_env(&path, get_config_path).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    #[serial]
    fn test_load_config_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let config = with_config_env(&path, load_config).unwrap();
        assert!(config.schema.is_none());
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "version = 0\n[query]\ndefault_limit = 5").unwrap();

        let config = with_config_env(&path, load_config).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.query.default_limit, 5);
    }

    #[test]
    #[serial]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "query = [not toml").unwrap();

        let err = with_config_env(&path, load_config).unwrap_err();
        assert!(matches!(err, CommandError::Config(ref msg) if msg.starts_with("Failed to parse config")));
    }
}
