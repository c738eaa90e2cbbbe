use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use dispatch::Dispatch;
use rsql::ErrorKind;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("{error_json}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Logs go to stderr so stdout stays clean for JSON. `RUST_LOG` wins over
/// the verbosity flags.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let config = load_config()?;
    let ctx = CommandContext::new(cli, &config);
    Dispatch::from_cli(cli).execute(&ctx)
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(err) => match err.kind() {
            ErrorKind::Lexical => "LEXICAL_ERROR",
            ErrorKind::Syntax => "SYNTAX_ERROR",
            ErrorKind::UnknownField => "UNKNOWN_FIELD",
            ErrorKind::OperatorNotAllowed => "OPERATOR_NOT_ALLOWED",
            ErrorKind::Overflow => "OVERFLOW",
            ErrorKind::Format => "FORMAT_ERROR",
            ErrorKind::UnsupportedType => "UNSUPPORTED_TYPE",
            ErrorKind::InvalidParameter => "INVALID_PARAMETER",
        },
        CommandError::Schema(_) => "SCHEMA_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Query(_) => 1,
        CommandError::Schema(_) | CommandError::Config(_) => 5,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsql::schema::SchemaError;
    use rsql::FilterParser;

    #[test]
    fn test_error_code_follows_query_error_kind() {
        let lexical = FilterParser::parse(r#"a=="open"#).unwrap_err();
        assert_eq!(
            error_code(&CommandError::Query(lexical.into())),
            "LEXICAL_ERROR"
        );

        let invalid = rsql::parse_query("limit=0", None).unwrap_err();
        assert_eq!(
            error_code(&CommandError::Query(invalid)),
            "INVALID_PARAMETER"
        );
    }

    #[test]
    fn test_error_code_for_setup_errors() {
        assert_eq!(
            error_code(&CommandError::Schema(SchemaError::EmptyName)),
            "SCHEMA_ERROR"
        );
        assert_eq!(error_code(&CommandError::Config("x".into())), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(exit_status(&CommandError::Config("x".into())), 5);
        assert_eq!(exit_status(&CommandError::Schema(SchemaError::EmptyName)), 5);
        assert_eq!(exit_status(&CommandError::Io(std::io::Error::other("closed"))), 3);
        let err = rsql::parse_query("page=0", None).unwrap_err();
        assert_eq!(exit_status(&CommandError::Query(err)), 1);
    }
}
