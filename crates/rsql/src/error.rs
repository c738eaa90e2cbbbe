//! Error types for query parsing and schema binding.

use std::fmt;

use serde::Serialize;
use strsim::levenshtein;
use thiserror::Error;

use crate::filter::{FilterError, Operator, OperatorSet};

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed token in a filter expression.
    Lexical,
    /// Structurally invalid filter expression.
    Syntax,
    /// Selector or sort key not declared (or not usable) in the schema.
    UnknownField,
    /// Operator outside the field's allow-list.
    OperatorNotAllowed,
    /// Numeric value outside the field's range.
    Overflow,
    /// Value not in the field's expected textual format.
    Format,
    /// Field declared with a type that has no conversion.
    UnsupportedType,
    /// Invalid `limit`, `page` or other envelope parameter.
    InvalidParameter,
}

impl ErrorKind {
    /// Returns a short machine-readable name (`"unknown_field"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::OperatorNotAllowed => "operator_not_allowed",
            ErrorKind::Overflow => "overflow",
            ErrorKind::Format => "format",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::InvalidParameter => "invalid_parameter",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to convert a raw argument into a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value parses but does not fit the declared width.
    #[error("value out of range for {type_name}")]
    Overflow {
        /// The declared type, e.g. `int32`.
        type_name: String,
    },

    /// The value is not in the expected format.
    #[error("expected {expected}: {reason}")]
    Format {
        /// What the field expects, e.g. `int64` or `RFC 3339 timestamp`.
        expected: String,
        /// The underlying parse failure.
        reason: String,
    },

    /// The declared type has no conversion.
    #[error("unsupported data type '{type_name}'")]
    Unsupported {
        /// The declared type name.
        type_name: String,
    },
}

impl ConversionError {
    pub(crate) fn overflow(type_name: impl Into<String>) -> Self {
        ConversionError::Overflow {
            type_name: type_name.into(),
        }
    }

    pub(crate) fn format(expected: impl Into<String>, reason: impl ToString) -> Self {
        ConversionError::Format {
            expected: expected.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors returned by query parsing and schema binding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The filter expression failed to lex or parse.
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),

    /// A selector or sort key is not declared in the schema.
    #[error("{}", format_unknown_field(field, suggestion.as_deref()))]
    UnknownField {
        /// The name as written in the query.
        field: String,
        /// The closest declared name, if any is close enough.
        suggestion: Option<String>,
    },

    /// The field is declared but excluded from filtering.
    #[error("field '{field}' is not filterable")]
    NotFilterable {
        /// The field name.
        field: String,
    },

    /// The field is declared but excluded from sorting.
    #[error("field '{field}' is not sortable")]
    NotSortable {
        /// The field name.
        field: String,
    },

    /// The operator is outside the field's allow-list.
    #[error("operator '{}' is not allowed on field '{field}' (allowed: {allowed})", .operator.name())]
    OperatorNotAllowed {
        /// The field name.
        field: String,
        /// The rejected operator.
        operator: Operator,
        /// The field's effective allow-list.
        allowed: OperatorSet,
    },

    /// A value could not be converted to the field's type.
    #[error("invalid value '{value}' for field '{field}': {source}")]
    Conversion {
        /// The field name.
        field: String,
        /// The raw argument.
        value: String,
        /// What went wrong.
        #[source]
        source: ConversionError,
    },

    /// The field's declared type has no conversion.
    #[error("field '{field}' has unsupported data type '{type_name}'")]
    UnsupportedType {
        /// The field name.
        field: String,
        /// The declared type name.
        type_name: String,
    },

    /// An envelope parameter (`limit`, `page`, ...) is invalid.
    #[error("invalid {key} '{value}': {reason}")]
    InvalidParameter {
        /// The parameter key.
        key: String,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl Error {
    /// Classifies the error.
    ///
    /// Fields that exist but are excluded from filtering or sorting report
    /// [`ErrorKind::UnknownField`], the same as undeclared ones.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Filter(e) => e.kind(),
            Error::UnknownField { .. } | Error::NotFilterable { .. } | Error::NotSortable { .. } => {
                ErrorKind::UnknownField
            }
            Error::OperatorNotAllowed { .. } => ErrorKind::OperatorNotAllowed,
            Error::Conversion { source, .. } => match source {
                ConversionError::Overflow { .. } => ErrorKind::Overflow,
                ConversionError::Format { .. } => ErrorKind::Format,
                ConversionError::Unsupported { .. } => ErrorKind::UnsupportedType,
            },
            Error::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
        }
    }

    /// Returns the field the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::UnknownField { field, .. }
            | Error::NotFilterable { field }
            | Error::NotSortable { field }
            | Error::OperatorNotAllowed { field, .. }
            | Error::Conversion { field, .. }
            | Error::UnsupportedType { field, .. } => Some(field),
            Error::Filter(_) | Error::InvalidParameter { .. } => None,
        }
    }

    pub(crate) fn invalid_parameter(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Formats the "unknown field" message, optionally including a suggestion.
fn format_unknown_field(field: &str, suggestion: Option<&str>) -> String {
    let base = format!("unknown field '{field}'");
    match suggestion {
        Some(s) => format!("{base}. Did you mean '{s}'?"),
        None => base,
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise returns `None`.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| (name, levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    (best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE).then(|| best_match.to_string())
}
