//! User-defined value conversion.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::bind::convert_value;
use crate::error::ConversionError;
use crate::value::Value;

use super::types::{DataType, FloatWidth, IntWidth};

/// Input handed to a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanSource<'a> {
    /// The trimmed raw argument.
    Text(&'a str),
    /// The argument already parsed by the lenient timestamp parser.
    ///
    /// Only nullable-temporal scanners receive this, and never for `null`.
    Timestamp(DateTime<Utc>),
}

/// A type that converts filter arguments itself.
///
/// Scanners are shared between threads through the schema, so they must be
/// `Send + Sync` and conversion must not mutate them.
pub trait Scanner: fmt::Debug + Send + Sync {
    /// Name reported in errors and schema listings.
    fn type_name(&self) -> &str;

    /// Returns true if arguments should be pre-parsed as timestamps with the
    /// lenient multi-format parser before reaching [`Scanner::scan`].
    fn is_nullable_temporal(&self) -> bool {
        false
    }

    /// Converts one argument.
    fn scan(&self, source: ScanSource<'_>) -> Result<Value, ConversionError>;
}

const NULL_LITERAL: &str = "null";

/// Scanners mirroring SQL nullable column types.
///
/// The literal `null` scans to [`Value::Null`]; any other argument converts
/// as the wrapped scalar type.
#[derive(Debug, Clone)]
pub struct SqlNull {
    name: &'static str,
    inner: DataType,
}

impl SqlNull {
    /// A nullable string column.
    pub fn string() -> Self {
        Self {
            name: "null_string",
            inner: DataType::String,
        }
    }

    /// A nullable 64-bit integer column.
    pub fn int64() -> Self {
        Self {
            name: "null_int64",
            inner: DataType::Int(IntWidth::W64),
        }
    }

    /// A nullable double column.
    pub fn float64() -> Self {
        Self {
            name: "null_float64",
            inner: DataType::Float(FloatWidth::F64),
        }
    }

    /// A nullable boolean column.
    pub fn bool() -> Self {
        Self {
            name: "null_bool",
            inner: DataType::Bool,
        }
    }

    /// A nullable timestamp column. Arguments go through the lenient
    /// timestamp parser.
    pub fn time() -> Self {
        Self {
            name: "null_time",
            inner: DataType::Timestamp,
        }
    }
}

impl Scanner for SqlNull {
    fn type_name(&self) -> &str {
        self.name
    }

    fn is_nullable_temporal(&self) -> bool {
        self.inner == DataType::Timestamp
    }

    fn scan(&self, source: ScanSource<'_>) -> Result<Value, ConversionError> {
        match source {
            ScanSource::Text(NULL_LITERAL) => Ok(Value::Null),
            ScanSource::Text(raw) => convert_value(&self.inner, raw),
            ScanSource::Timestamp(t) => Ok(Value::Timestamp(t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sql_null_maps_null_literal() {
        for scanner in [SqlNull::string(), SqlNull::int64(), SqlNull::bool(), SqlNull::time()] {
            assert_eq!(scanner.scan(ScanSource::Text("null")), Ok(Value::Null));
        }
    }

    #[test]
    fn test_sql_null_converts_inner_type() {
        assert_eq!(
            SqlNull::string().scan(ScanSource::Text("foo")),
            Ok(Value::String("foo".into()))
        );
        assert_eq!(
            SqlNull::int64().scan(ScanSource::Text("42")),
            Ok(Value::Int(42))
        );
        assert!(SqlNull::int64().scan(ScanSource::Text("forty")).is_err());
    }

    #[test]
    fn test_sql_null_time_accepts_parsed_timestamp() {
        let scanner = SqlNull::time();
        assert!(scanner.is_nullable_temporal());
        assert!(!SqlNull::string().is_nullable_temporal());

        let t = Utc.with_ymd_and_hms(2020, 1, 14, 16, 0, 0).unwrap();
        assert_eq!(scanner.scan(ScanSource::Timestamp(t)), Ok(Value::Timestamp(t)));
    }
}
