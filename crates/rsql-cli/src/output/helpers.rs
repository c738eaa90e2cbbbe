//! Common helper functions for output formatting.

use owo_colors::OwoColorize;
use rsql::Value;

/// Truncates a string to a maximum length, counting characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Appends a table header line, dimmed when colors are enabled.
pub fn push_header(output: &mut String, header: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(header);
        output.push('\n');
    }
}

/// Formats a typed value for table output.
///
/// Strings are quoted so that empty and whitespace values stay visible.
pub fn format_value(value: &Value, use_colors: bool) -> String {
    let text = match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    };

    if !use_colors {
        return text;
    }
    match value {
        Value::Null => text.dimmed().to_string(),
        Value::String(_) => text.green().to_string(),
        Value::Bool(_) => text.yellow().to_string(),
        Value::Int(_) | Value::UInt(_) | Value::Float(_) => text.cyan().to_string(),
        _ => text,
    }
}

/// Formats a yes/no flag.
pub fn format_flag(flag: bool, use_colors: bool) -> String {
    match (flag, use_colors) {
        (true, true) => "yes".green().to_string(),
        (true, false) => "yes".to_string(),
        (false, true) => "no".dimmed().to_string(),
        (false, false) => "no".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a very long field name", 10), "a very ...");
        assert_eq!(truncate_str("größenordnung", 8), "größe...");
    }

    #[test]
    fn test_format_value_plain() {
        assert_eq!(format_value(&Value::String("x".into()), false), "\"x\"");
        assert_eq!(format_value(&Value::Int(7), false), "7");
        assert_eq!(format_value(&Value::Null, false), "null");
    }

    #[test]
    fn test_push_header_plain() {
        let mut out = String::new();
        push_header(&mut out, "Name", false);
        assert_eq!(out, "Name\n");
    }

    #[test]
    fn test_format_flag_plain() {
        assert_eq!(format_flag(true, false), "yes");
        assert_eq!(format_flag(false, false), "no");
    }
}
