//! Error types for the filter lexer and parser.

use thiserror::Error;

use crate::error::ErrorKind;

/// A specialized Result type for filter parsing operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while lexing or parsing a filter expression.
///
/// Every variant carries the byte offset into the expression where the
/// problem was detected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    // ==================== Lexical ====================
    /// A comparison has no selector.
    #[error("expected a field name at position {position}")]
    MissingSelector {
        /// Byte offset of the missing selector.
        position: usize,
    },

    /// A selector is not followed by an operator.
    #[error("missing operator after '{selector}' at position {position}")]
    MissingOperator {
        /// The selector without an operator.
        selector: String,
        /// Byte offset where the operator was expected.
        position: usize,
    },

    /// A padded operator (`=xx=`) is not closed or contains invalid characters.
    #[error("malformed operator '{symbol}' at position {position}")]
    MalformedOperator {
        /// The text scanned so far.
        symbol: String,
        /// Byte offset of the operator.
        position: usize,
    },

    /// An operator symbol is not in the operator table.
    #[error("unknown operator '{symbol}' at position {position}")]
    UnknownOperator {
        /// The unrecognized symbol.
        symbol: String,
        /// Byte offset of the operator.
        position: usize,
    },

    /// A comparison has no value.
    #[error("missing value for '{selector}' at position {position}")]
    MissingValue {
        /// The selector without a value.
        selector: String,
        /// Byte offset where the value was expected.
        position: usize,
    },

    /// A quoted value has no closing quote.
    #[error("unterminated quoted value starting at position {position}")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        position: usize,
    },

    /// A parenthesized value list has no closing parenthesis.
    #[error("unterminated value list for '{selector}' starting at position {position}")]
    UnterminatedValueList {
        /// The selector owning the list.
        selector: String,
        /// Byte offset of the opening parenthesis.
        position: usize,
    },

    /// A character that cannot start or continue the current construct.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Byte offset of the character.
        position: usize,
    },

    // ==================== Syntax ====================
    /// A `)` without a matching `(`.
    #[error("unexpected ')' at position {position}")]
    UnexpectedGroupEnd {
        /// Byte offset of the parenthesis.
        position: usize,
    },

    /// Input ended while groups were still open.
    #[error("unclosed group opened at position {position} ({open} open)")]
    UnclosedGroup {
        /// Number of groups still open.
        open: usize,
        /// Byte offset of the innermost unclosed `(`.
        position: usize,
    },

    /// A group with no comparisons.
    #[error("empty group at position {position}")]
    EmptyGroup {
        /// Byte offset of the group's `(`.
        position: usize,
    },

    /// Groups nested deeper than the parser allows.
    #[error("groups nested deeper than {limit} levels at position {position}")]
    NestingTooDeep {
        /// Maximum nesting depth.
        limit: usize,
        /// Byte offset of the `(` that exceeded the limit.
        position: usize,
    },

    /// A logical connective at the start of a group or after another connective.
    #[error("misplaced logical operator '{operator}' at position {position}")]
    MisplacedLogical {
        /// The connective text.
        operator: String,
        /// Byte offset of the connective.
        position: usize,
    },

    /// A logical connective at the end of a group.
    #[error("logical operator without a right-hand side at position {position}")]
    DanglingLogical {
        /// Byte offset where the operand was expected.
        position: usize,
    },

    /// Two operands without a connective between them.
    #[error("expected ';' or ',' before position {position}")]
    MissingLogical {
        /// Byte offset of the second operand.
        position: usize,
    },

    /// A single-valued operator was given a value list.
    #[error("operator '{operator}' on '{selector}' takes one value, got {count}")]
    TooManyValues {
        /// The selector.
        selector: String,
        /// The operator symbol.
        operator: String,
        /// Number of values supplied.
        count: usize,
        /// Byte offset of the value list.
        position: usize,
    },

    /// A token arrived in a state where it cannot be used.
    #[error("unexpected {token} at position {position}")]
    UnexpectedToken {
        /// Description of the token.
        token: String,
        /// Byte offset of the token.
        position: usize,
    },
}

impl FilterError {
    /// Returns the byte offset the error refers to.
    pub fn position(&self) -> usize {
        match self {
            FilterError::MissingSelector { position }
            | FilterError::MissingOperator { position, .. }
            | FilterError::MalformedOperator { position, .. }
            | FilterError::UnknownOperator { position, .. }
            | FilterError::MissingValue { position, .. }
            | FilterError::UnterminatedQuote { position }
            | FilterError::UnterminatedValueList { position, .. }
            | FilterError::UnexpectedCharacter { position, .. }
            | FilterError::UnexpectedGroupEnd { position }
            | FilterError::UnclosedGroup { position, .. }
            | FilterError::EmptyGroup { position }
            | FilterError::NestingTooDeep { position, .. }
            | FilterError::MisplacedLogical { position, .. }
            | FilterError::DanglingLogical { position }
            | FilterError::MissingLogical { position }
            | FilterError::TooManyValues { position, .. }
            | FilterError::UnexpectedToken { position, .. } => *position,
        }
    }

    /// Classifies the error as lexical or syntactic.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilterError::MissingSelector { .. }
            | FilterError::MissingOperator { .. }
            | FilterError::MalformedOperator { .. }
            | FilterError::UnknownOperator { .. }
            | FilterError::MissingValue { .. }
            | FilterError::UnterminatedQuote { .. }
            | FilterError::UnterminatedValueList { .. }
            | FilterError::UnexpectedCharacter { .. } => ErrorKind::Lexical,
            _ => ErrorKind::Syntax,
        }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }
}
