//! Conversion of raw filter arguments into typed values.

use std::borrow::Cow;
use std::num::{IntErrorKind, ParseIntError};

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ConversionError;
use crate::schema::{DataType, FloatWidth, IntWidth, ScanSource};
use crate::value::Value;

/// The literal that maps to [`Value::Null`] on optional fields.
const NULL_LITERAL: &str = "null";

/// Timestamp layouts tried by [`parse_time`], in order.
enum Layout {
    Rfc3339,
    Rfc2822,
    /// A layout with a numeric offset (`%z`).
    Zoned(&'static str),
    /// A layout without an offset, or with a zone abbreviation; read as UTC.
    Naive(&'static str),
    /// A date at midnight UTC.
    Date(&'static str),
}

const LENIENT_LAYOUTS: &[Layout] = &[
    Layout::Rfc3339,
    // RFC 1123, RFC 1123Z and RFC 822 with GMT or numeric offsets
    Layout::Rfc2822,
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %z"),
    Layout::Zoned("%d %b %y %H:%M %z"),
    // Ruby date
    Layout::Zoned("%a %b %d %H:%M:%S %z %Y"),
    Layout::Zoned("%Y-%m-%d %H:%M:%S %z"),
    // RFC 1123, RFC 850 and RFC 822 with a zone abbreviation
    Layout::Naive("%a, %d %b %Y %H:%M:%S %Z"),
    Layout::Naive("%A, %d-%b-%y %H:%M:%S %Z"),
    Layout::Naive("%d %b %y %H:%M %Z"),
    // Unix date, then ANSI C
    Layout::Naive("%a %b %e %H:%M:%S %Z %Y"),
    Layout::Naive("%a %b %e %H:%M:%S %Y"),
    Layout::Naive("%Y-%m-%d %H:%M:%S"),
    Layout::Naive("%Y-%m-%dT%H:%M:%S"),
    Layout::Date("%Y-%m-%d"),
];

/// Converts one raw argument to `data_type`.
///
/// Strings are taken verbatim; every other type is converted from the
/// trimmed argument.
pub(crate) fn convert_value(data_type: &DataType, raw: &str) -> Result<Value, ConversionError> {
    let text = raw.trim();
    match data_type {
        DataType::String => Ok(Value::String(raw.to_string())),
        DataType::Bool => parse_bool(text).map(Value::Bool),
        DataType::Int(width) => parse_int(text, *width, &data_type.type_name()),
        DataType::UInt(width) => parse_uint(text, *width, &data_type.type_name()),
        DataType::Float(width) => parse_float(text, *width, &data_type.type_name()),
        DataType::Timestamp => DateTime::parse_from_rfc3339(text)
            .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
            .map_err(|e| ConversionError::format("RFC 3339 timestamp", e)),
        DataType::Bytes => general_purpose::STANDARD
            .decode(text)
            .map(Value::Bytes)
            .map_err(|e| ConversionError::format("base64", e)),
        DataType::Optional(inner) => {
            if text == NULL_LITERAL {
                Ok(Value::Null)
            } else {
                convert_value(inner, raw)
            }
        }
        DataType::Scannable(scanner) => {
            if scanner.is_nullable_temporal() && text != NULL_LITERAL {
                scanner.scan(ScanSource::Timestamp(parse_time(text)?))
            } else {
                scanner.scan(ScanSource::Text(text))
            }
        }
        DataType::Other(name) => Err(ConversionError::Unsupported {
            type_name: name.clone(),
        }),
    }
}

/// Accepts `1 t T true TRUE True` and `0 f F false FALSE False`.
fn parse_bool(text: &str) -> Result<bool, ConversionError> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ConversionError::format(
            "bool",
            format!("'{text}' is not a boolean"),
        )),
    }
}

fn int_error(e: ParseIntError, type_name: &str) -> ConversionError {
    match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ConversionError::overflow(type_name),
        _ => ConversionError::format(type_name, e),
    }
}

fn parse_int(text: &str, width: IntWidth, type_name: &str) -> Result<Value, ConversionError> {
    let value: i64 = text.parse().map_err(|e| int_error(e, type_name))?;
    let fits = match width {
        IntWidth::W8 => i8::try_from(value).is_ok(),
        IntWidth::W16 => i16::try_from(value).is_ok(),
        IntWidth::W32 => i32::try_from(value).is_ok(),
        IntWidth::W64 => true,
    };
    if fits {
        Ok(Value::Int(value))
    } else {
        Err(ConversionError::overflow(type_name))
    }
}

fn parse_uint(text: &str, width: IntWidth, type_name: &str) -> Result<Value, ConversionError> {
    let value: u64 = text.parse().map_err(|e| int_error(e, type_name))?;
    let fits = match width {
        IntWidth::W8 => u8::try_from(value).is_ok(),
        IntWidth::W16 => u16::try_from(value).is_ok(),
        IntWidth::W32 => u32::try_from(value).is_ok(),
        IntWidth::W64 => true,
    };
    if fits {
        Ok(Value::UInt(value))
    } else {
        Err(ConversionError::overflow(type_name))
    }
}

fn parse_float(text: &str, width: FloatWidth, type_name: &str) -> Result<Value, ConversionError> {
    let value: f64 = text
        .parse()
        .map_err(|e| ConversionError::format(type_name, e))?;
    let literal_infinity = text
        .trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf");
    if value.is_infinite() && !literal_infinity {
        return Err(ConversionError::overflow(type_name));
    }
    match width {
        FloatWidth::F32 if value.is_finite() && value.abs() > f64::from(f32::MAX) => {
            Err(ConversionError::overflow(type_name))
        }
        FloatWidth::F32 => Ok(Value::Float(f64::from(value as f32))),
        FloatWidth::F64 => Ok(Value::Float(value)),
    }
}

/// Parses a timestamp in any of the accepted layouts.
///
/// RFC 3339 comes first; then the RFC 1123/822/850, Ruby, Unix and ANSI C
/// layouts; then `YYYY-MM-DD HH:MM:SS` and a bare `YYYY-MM-DD`. Layouts
/// without a numeric offset are read as UTC, and so is every zone
/// abbreviation (`MST`, `EST`, `GMT`) in whichever layout it appears.
/// A leading weekday must agree with the date.
pub fn parse_time(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    LENIENT_LAYOUTS
        .iter()
        .find_map(|layout| try_layout(layout, text))
        .ok_or_else(|| {
            ConversionError::format("date/time", format!("failed to parse date/time: {text}"))
        })
}

fn try_layout(layout: &Layout, text: &str) -> Option<DateTime<Utc>> {
    match layout {
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Layout::Rfc2822 => DateTime::parse_from_rfc2822(&abbreviation_as_utc(text))
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Layout::Zoned(fmt) => DateTime::parse_from_str(text, fmt)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Layout::Naive(fmt) => NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .map(|t| t.and_utc()),
        Layout::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| t.and_utc()),
    }
}

/// Replaces a trailing alphabetic zone abbreviation with `+0000`.
fn abbreviation_as_utc(text: &str) -> Cow<'_, str> {
    match text.trim_end().rsplit_once(' ') {
        Some((head, zone)) if !zone.is_empty() && zone.bytes().all(|b| b.is_ascii_alphabetic()) => {
            Cow::Owned(format!("{head} +0000"))
        }
        _ => Cow::Borrowed(text),
    }
}
