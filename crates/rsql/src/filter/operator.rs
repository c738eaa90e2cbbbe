//! Operator table: symbol lookup and default allow-lists.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// `==`, `=eq=`
    Equal,
    /// `!=`, `=ne=`
    NotEqual,
    /// `>`, `=gt=`
    GreaterThan,
    /// `>=`, `=ge=`, `=gte=`
    GreaterOrEqual,
    /// `<`, `=lt=`
    LessThan,
    /// `<=`, `=le=`, `=lte=`
    LessOrEqual,
    /// `=like=`
    Like,
    /// `=in=`
    In,
    /// `=out=`, `=nin=`
    NotIn,
    /// `=isnull=`
    IsNull,
}

/// Every accepted symbol, aliases included.
const SYMBOLS: &[(&str, Operator)] = &[
    ("==", Operator::Equal),
    ("=eq=", Operator::Equal),
    ("!=", Operator::NotEqual),
    ("=ne=", Operator::NotEqual),
    (">", Operator::GreaterThan),
    ("=gt=", Operator::GreaterThan),
    (">=", Operator::GreaterOrEqual),
    ("=ge=", Operator::GreaterOrEqual),
    ("=gte=", Operator::GreaterOrEqual),
    ("<", Operator::LessThan),
    ("=lt=", Operator::LessThan),
    ("<=", Operator::LessOrEqual),
    ("=le=", Operator::LessOrEqual),
    ("=lte=", Operator::LessOrEqual),
    ("=like=", Operator::Like),
    ("=in=", Operator::In),
    ("=out=", Operator::NotIn),
    ("=nin=", Operator::NotIn),
    ("=isnull=", Operator::IsNull),
];

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 10] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::Like,
        Operator::In,
        Operator::NotIn,
        Operator::IsNull,
    ];

    /// Looks up an operator by its source symbol (`==`, `=gt=`, `>=`, ...).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        SYMBOLS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    /// Looks up an operator by its allow-list name (`eq`, `gte`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Short name used in allow-lists.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Equal => "eq",
            Operator::NotEqual => "ne",
            Operator::GreaterThan => "gt",
            Operator::GreaterOrEqual => "gte",
            Operator::LessThan => "lt",
            Operator::LessOrEqual => "lte",
            Operator::Like => "like",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::IsNull => "isnull",
        }
    }

    /// Canonical symbol used when rendering an expression.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => "=gt=",
            Operator::GreaterOrEqual => "=ge=",
            Operator::LessThan => "=lt=",
            Operator::LessOrEqual => "=le=",
            Operator::Like => "=like=",
            Operator::In => "=in=",
            Operator::NotIn => "=out=",
            Operator::IsNull => "=isnull=",
        }
    }

    /// Returns true for operators that accept a list of values.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    /// Accepts either an allow-list name or a source symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_name(&trimmed.to_lowercase())
            .or_else(|| Self::from_symbol(trimmed))
            .ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// An immutable set of operators.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperatorSet(u16);

impl OperatorSet {
    /// The empty set.
    pub const EMPTY: OperatorSet = OperatorSet(0);

    /// Every operator.
    pub const ALL: OperatorSet = OperatorSet::of(&Operator::ALL);

    /// Every operator except `IsNull`.
    pub const COMPARISONS: OperatorSet = OperatorSet::ALL.without(Operator::IsNull);

    /// `eq`, `ne`.
    pub const EQUALITY: OperatorSet = OperatorSet::of(&[Operator::Equal, Operator::NotEqual]);

    /// `eq`, `ne`, `gt`, `gte`, `lt`, `lte`.
    pub const ORDERED: OperatorSet = OperatorSet::of(&[
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::LessThan,
        Operator::LessOrEqual,
    ]);

    /// Ordered comparisons plus `in`, `nin`.
    pub const NUMERIC: OperatorSet = OperatorSet::ORDERED
        .with(Operator::In)
        .with(Operator::NotIn);

    /// Builds a set from a slice of operators.
    pub const fn of(operators: &[Operator]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < operators.len() {
            bits |= operators[i].bit();
            i += 1;
        }
        OperatorSet(bits)
    }

    /// Returns a copy of the set with `op` added.
    pub const fn with(self, op: Operator) -> Self {
        OperatorSet(self.0 | op.bit())
    }

    /// Returns a copy of the set with `op` removed.
    pub const fn without(self, op: Operator) -> Self {
        OperatorSet(self.0 & !op.bit())
    }

    /// Returns true if `op` is in the set.
    pub const fn contains(self, op: Operator) -> bool {
        self.0 & op.bit() != 0
    }

    /// Returns true if the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the operators in the set in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Operator> {
        Operator::ALL.into_iter().filter(move |op| self.contains(*op))
    }

    /// Parses a list of operator names or symbols.
    pub fn parse<'a>(items: impl IntoIterator<Item = &'a str>) -> Result<Self, String> {
        items
            .into_iter()
            .try_fold(OperatorSet::EMPTY, |set, item| Ok(set.with(item.parse()?)))
    }
}

impl FromIterator<Operator> for OperatorSet {
    fn from_iter<I: IntoIterator<Item = Operator>>(iter: I) -> Self {
        iter.into_iter().fold(OperatorSet::EMPTY, OperatorSet::with)
    }
}

impl fmt::Debug for OperatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Operator::name)).finish()
    }
}

impl fmt::Display for OperatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(Operator::name).collect();
        f.write_str(&names.join("|"))
    }
}

impl Serialize for OperatorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Operator::name))
    }
}

/// Coarse value-type categories that select a default allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    String,
    Boolean,
    Numeric,
    Temporal,
    Binary,
    Other,
}

impl TypeCategory {
    /// The operators permitted on a field of this category unless the field
    /// declares its own allow-list.
    pub const fn default_operators(self) -> OperatorSet {
        match self {
            TypeCategory::String | TypeCategory::Other => OperatorSet::COMPARISONS,
            TypeCategory::Boolean | TypeCategory::Binary => OperatorSet::EQUALITY,
            TypeCategory::Numeric => OperatorSet::NUMERIC,
            TypeCategory::Temporal => OperatorSet::ORDERED,
        }
    }
}
