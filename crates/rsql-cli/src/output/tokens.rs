//! Output formatting for lexer token streams.

use owo_colors::OwoColorize;
use rsql::filter::{Token, TokenKind};
use serde::Serialize;

use super::helpers::push_header;

/// JSON output structure for a token stream.
#[derive(Serialize)]
pub struct TokensOutput<'a> {
    pub tokens: Vec<TokenOutput<'a>>,
}

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    pub kind: String,
    pub value: &'a str,
    pub position: usize,
}

/// Formats tokens as JSON.
pub fn format_tokens_json(tokens: &[Token]) -> Result<String, serde_json::Error> {
    let output = TokensOutput {
        tokens: tokens
            .iter()
            .map(|t| TokenOutput {
                kind: t.kind.to_string(),
                value: &t.value,
                position: t.position,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats tokens as a table.
pub fn format_tokens_table(tokens: &[Token], use_colors: bool) -> String {
    let mut output = String::new();
    let header = format!("{:<5} {:<14} {}", "Pos", "Kind", "Value");
    push_header(&mut output, &header, use_colors);

    for token in tokens {
        let kind = format!("{:<14}", token.kind.to_string());
        let kind = if !use_colors {
            kind
        } else if token.kind == TokenKind::Error {
            kind.red().to_string()
        } else if token.kind == TokenKind::Operator {
            kind.cyan().to_string()
        } else {
            kind
        };
        output.push_str(&format!("{:<5} {} {}\n", token.position, kind, token.value));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsql::filter::Lexer;

    #[test]
    fn test_format_tokens_table() {
        let tokens = Lexer::new("a==1").tokenize();
        let output = format_tokens_table(&tokens, false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], format!("{:<5} {:<14} {}", "Pos", "Kind", "Value"));
        assert_eq!(lines[1], format!("{:<5} {:<14} {}", 0, "name", "a"));
        assert_eq!(lines[2], format!("{:<5} {:<14} {}", 1, "operator", "=="));
    }

    #[test]
    fn test_format_tokens_json() {
        let tokens = Lexer::new("a==1").tokenize();
        let json = format_tokens_json(&tokens).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tokens"][0]["kind"], "name");
        assert_eq!(value["tokens"][0]["value"], "a");
        let last = value["tokens"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["kind"], "end-of-input");
    }
}
