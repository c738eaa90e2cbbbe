//! Declared data types of schema fields.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::filter::{Operator, OperatorSet, TypeCategory};

use super::scanner::{Scanner, SqlNull};

/// Bit width of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    /// Number of bits.
    pub const fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    fn from_bits(bits: &str) -> Option<Self> {
        match bits {
            "" | "64" => Some(IntWidth::W64),
            "8" => Some(IntWidth::W8),
            "16" => Some(IntWidth::W16),
            "32" => Some(IntWidth::W32),
            _ => None,
        }
    }
}

/// Bit width of a floating-point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

/// The declared type of a field. Drives value conversion and the default
/// operator allow-list.
#[derive(Debug, Clone)]
pub enum DataType {
    String,
    Bool,
    /// Signed integer of the given width.
    Int(IntWidth),
    /// Unsigned integer of the given width.
    UInt(IntWidth),
    Float(FloatWidth),
    /// A point in time, written as RFC 3339.
    Timestamp,
    /// Binary data, written as standard base64.
    Bytes,
    /// A nullable wrapper: the literal `null` maps to [`Value::Null`](crate::Value::Null),
    /// anything else converts as the inner type.
    Optional(Box<DataType>),
    /// A user-supplied type that converts values itself.
    Scannable(Arc<dyn Scanner>),
    /// A type with no conversion. Binding any comparison on it fails.
    Other(String),
}

impl DataType {
    /// Wraps `inner` in [`DataType::Optional`].
    pub fn optional(inner: DataType) -> Self {
        DataType::Optional(Box::new(inner))
    }

    /// Wraps a scanner in [`DataType::Scannable`].
    pub fn scannable(scanner: impl Scanner + 'static) -> Self {
        DataType::Scannable(Arc::new(scanner))
    }

    /// The category that selects the default allow-list.
    pub fn category(&self) -> TypeCategory {
        match self {
            DataType::String => TypeCategory::String,
            DataType::Bool => TypeCategory::Boolean,
            DataType::Int(_) | DataType::UInt(_) | DataType::Float(_) => TypeCategory::Numeric,
            DataType::Timestamp => TypeCategory::Temporal,
            DataType::Bytes => TypeCategory::Binary,
            DataType::Optional(inner) => inner.category(),
            DataType::Scannable(_) | DataType::Other(_) => TypeCategory::Other,
        }
    }

    /// Operators permitted when the field declares no allow-list of its own.
    ///
    /// Optional fields additionally permit `=isnull=`.
    pub fn default_operators(&self) -> OperatorSet {
        match self {
            DataType::Optional(inner) => inner.default_operators().with(Operator::IsNull),
            other => other.category().default_operators(),
        }
    }

    /// Returns true for [`DataType::Optional`].
    pub fn is_optional(&self) -> bool {
        matches!(self, DataType::Optional(_))
    }

    /// The type name as written in schema files (`int32`, `optional<string>`, ...).
    pub fn type_name(&self) -> String {
        match self {
            DataType::String => "string".into(),
            DataType::Bool => "bool".into(),
            DataType::Int(w) => format!("int{}", w.bits()),
            DataType::UInt(w) => format!("uint{}", w.bits()),
            DataType::Float(FloatWidth::F32) => "float32".into(),
            DataType::Float(FloatWidth::F64) => "float64".into(),
            DataType::Timestamp => "timestamp".into(),
            DataType::Bytes => "bytes".into(),
            DataType::Optional(inner) => format!("optional<{}>", inner.type_name()),
            DataType::Scannable(scanner) => scanner.type_name().to_string(),
            DataType::Other(name) => name.clone(),
        }
    }
}

impl PartialEq for DataType {
    /// Scannable types compare by their type name.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataType::String, DataType::String)
            | (DataType::Bool, DataType::Bool)
            | (DataType::Timestamp, DataType::Timestamp)
            | (DataType::Bytes, DataType::Bytes) => true,
            (DataType::Int(a), DataType::Int(b)) | (DataType::UInt(a), DataType::UInt(b)) => a == b,
            (DataType::Float(a), DataType::Float(b)) => a == b,
            (DataType::Optional(a), DataType::Optional(b)) => a == b,
            (DataType::Scannable(a), DataType::Scannable(b)) => a.type_name() == b.type_name(),
            (DataType::Other(a), DataType::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

impl FromStr for DataType {
    type Err = std::convert::Infallible;

    /// Parses a type name. Unrecognized names become [`DataType::Other`].
    ///
    /// Accepted names: `string`, `bool`, `int`, `int8`..`int64`, `uint`,
    /// `uint8`..`uint64`, `float32`, `float64`, `timestamp`, `bytes`,
    /// `optional<T>` or `T?`, and the SQL-null scanners `null_string`,
    /// `null_int64`, `null_float64`, `null_bool`, `null_time`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let lower = name.to_lowercase();

        if let Some(inner) = lower
            .strip_prefix("optional<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Ok(DataType::optional(inner.parse()?));
        }
        if let Some(inner) = lower.strip_suffix('?') {
            return Ok(DataType::optional(inner.parse()?));
        }

        let data_type = match lower.as_str() {
            "string" | "str" | "text" => DataType::String,
            "bool" | "boolean" => DataType::Bool,
            "float" | "float64" | "double" => DataType::Float(FloatWidth::F64),
            "float32" => DataType::Float(FloatWidth::F32),
            "timestamp" | "time" | "datetime" => DataType::Timestamp,
            "bytes" | "binary" => DataType::Bytes,
            "null_string" => DataType::scannable(SqlNull::string()),
            "null_int64" => DataType::scannable(SqlNull::int64()),
            "null_float64" => DataType::scannable(SqlNull::float64()),
            "null_bool" => DataType::scannable(SqlNull::bool()),
            "null_time" => DataType::scannable(SqlNull::time()),
            other => {
                let width = |prefix: &str| other.strip_prefix(prefix).and_then(IntWidth::from_bits);
                if let Some(w) = width("uint") {
                    DataType::UInt(w)
                } else if let Some(w) = width("int") {
                    DataType::Int(w)
                } else {
                    DataType::Other(name.to_string())
                }
            }
        };
        Ok(data_type)
    }
}
