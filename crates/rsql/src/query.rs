//! Query-string entry point: filter, sort, select, paging and cursor.
//!
//! A query string such as
//!
//! ```text
//! filter=status=="APPROVED";no=gt=1991&sort=status,-no&limit=100&page=2
//! ```
//!
//! is split on `&` and then on the first `=` of each pair. The recognised
//! keys are configurable through [`QueryOptions`]; everything else is
//! ignored. The input is expected to be URL-decoded already.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bind::{resolve, Binder, FlatFilter, TypedNode};
use crate::error::{Error, Result};
use crate::filter::FilterParser;
use crate::schema::SchemaProvider;

/// Default page size when the query has no `limit`.
pub const DEFAULT_LIMIT: u32 = 20;

/// Names of the recognised query keys and paging defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Key holding the filter expression.
    pub filter_key: String,
    /// Key holding the sort directives.
    pub sort_key: String,
    /// Key holding the page size.
    pub limit_key: String,
    /// Key holding the 1-based page number.
    pub page_key: String,
    /// Key holding the opaque cursor.
    pub cursor_key: String,
    /// Key holding the selected fields.
    pub select_key: String,
    /// Page size used when the query has no limit.
    pub default_limit: u32,
    /// Upper bound for the page size; larger requests are clamped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u32>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            filter_key: "filter".to_string(),
            sort_key: "sort".to_string(),
            limit_key: "limit".to_string(),
            page_key: "page".to_string(),
            cursor_key: "cursor".to_string(),
            select_key: "select".to_string(),
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

/// Sort direction of a [`Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// One sort directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    /// Public field name.
    pub field: String,
    /// Backing column name (the public name when parsing without a schema).
    pub column: String,
    pub direction: SortDirection,
}

impl fmt::Display for Sort {
    /// Writes `column` or `-column`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Descending {
            f.write_str("-")?;
        }
        f.write_str(&self.column)
    }
}

/// The result of parsing a query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Params {
    /// Selected columns, in request order.
    pub selects: Vec<String>,
    /// The typed filter tree, or `None` when the query has no filter.
    pub filters: Option<TypedNode>,
    /// Sort directives, in request order.
    pub sorts: Vec<Sort>,
    /// Page size.
    pub limit: u32,
    /// Number of rows to skip: `(page - 1) * limit`.
    pub offset: u64,
    /// Opaque pagination cursor.
    pub cursor: Option<String>,
}

impl Params {
    /// The flat view of the filter tree. Empty when there is no filter.
    pub fn flat_filters(&self) -> Vec<FlatFilter> {
        self.filters
            .as_ref()
            .map(TypedNode::flatten)
            .unwrap_or_default()
    }
}

/// Parses query strings against an optional shared schema.
///
/// A `QueryParser` is immutable after construction and can be shared
/// between threads.
///
/// # Example
///
/// ```
/// use rsql::schema::{DataType, FieldDescriptor, IntWidth, Schema};
/// use rsql::{QueryParser, Value};
///
/// let schema = Schema::builder()
///     .field(FieldDescriptor::new("no", DataType::Int(IntWidth::W64)).sortable(true))
///     .build()
///     .unwrap();
/// let parser = QueryParser::new(schema);
///
/// let params = parser.parse_query("filter=no=gt=1991&sort=-no&limit=10&page=3").unwrap();
/// let flat = params.flat_filters();
/// assert_eq!(flat[0].value, Value::Int(1991));
/// assert_eq!(params.sorts[0].to_string(), "-no");
/// assert_eq!(params.offset, 20);
/// ```
#[derive(Clone)]
pub struct QueryParser {
    schema: Option<Arc<dyn SchemaProvider>>,
    options: QueryOptions,
}

impl QueryParser {
    /// Creates a parser validating against `schema`.
    pub fn new(schema: impl SchemaProvider + 'static) -> Self {
        Self::from_shared(Arc::new(schema))
    }

    /// Creates a parser from an already shared schema.
    pub fn from_shared(schema: Arc<dyn SchemaProvider>) -> Self {
        Self {
            schema: Some(schema),
            options: QueryOptions::default(),
        }
    }

    /// Creates a parser that accepts every field and keeps values as strings.
    pub fn untyped() -> Self {
        Self {
            schema: None,
            options: QueryOptions::default(),
        }
    }

    /// Replaces the query options.
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn schema(&self) -> Option<&dyn SchemaProvider> {
        self.schema.as_deref()
    }

    /// Parses a URL-decoded query string.
    ///
    /// # Errors
    ///
    /// Returns the first filter, binding, sort, select or paging error.
    pub fn parse_query(&self, raw: &str) -> Result<Params> {
        parse_with(self.schema(), &self.options, split_query(raw))
    }

    /// Parses already decoded key/value pairs. Later pairs win over earlier
    /// ones with the same key.
    pub fn parse_pairs<I, K, V>(&self, pairs: I) -> Result<Params>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        parse_with(self.schema(), &self.options, values)
    }

    /// Parses and binds a bare filter expression.
    ///
    /// Returns `None` for an empty or whitespace-only expression.
    pub fn parse_filter(&self, expression: &str) -> Result<Option<TypedNode>> {
        parse_filter(self.schema(), expression)
    }
}

impl fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParser")
            .field("typed", &self.schema.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// Parses a URL-decoded query string with default options.
///
/// # Errors
///
/// Returns the first filter, binding, sort, select or paging error.
pub fn parse_query(raw: &str, schema: Option<&dyn SchemaProvider>) -> Result<Params> {
    parse_with(schema, &QueryOptions::default(), split_query(raw))
}

/// Splits `a=1&b=2` into a map. A leading `?` and empty segments are
/// ignored; the last occurrence of a key wins.
fn split_query(raw: &str) -> HashMap<String, String> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            (key.to_string(), value.to_string())
        })
        .collect()
}

fn parse_with(
    schema: Option<&dyn SchemaProvider>,
    options: &QueryOptions,
    mut values: HashMap<String, String>,
) -> Result<Params> {
    let mut take = |key: &str| values.remove(key);

    let filters = match take(options.filter_key.as_str()) {
        Some(expression) => parse_filter(schema, &expression)?,
        None => None,
    };
    let sorts = match take(options.sort_key.as_str()) {
        Some(raw) => parse_sorts(schema, &options.sort_key, &raw)?,
        None => Vec::new(),
    };
    let selects = match take(options.select_key.as_str()) {
        Some(raw) => parse_selects(schema, &raw)?,
        None => Vec::new(),
    };
    let limit = parse_limit(options, take(options.limit_key.as_str()).as_deref())?;
    let page = parse_page(&options.page_key, take(options.page_key.as_str()).as_deref())?;
    let cursor = take(options.cursor_key.as_str()).filter(|c| !c.is_empty());

    for key in values.keys() {
        trace!(key = %key, "ignoring unrecognised query key");
    }

    let offset = u64::from(page - 1) * u64::from(limit);
    debug!(
        comparisons = filters.as_ref().map_or(0, |f| f.comparisons().len()),
        sorts = sorts.len(),
        limit,
        offset,
        "parsed query"
    );

    Ok(Params {
        selects,
        filters,
        sorts,
        limit,
        offset,
        cursor,
    })
}

fn parse_filter(schema: Option<&dyn SchemaProvider>, expression: &str) -> Result<Option<TypedNode>> {
    if expression.trim().is_empty() {
        return Ok(None);
    }
    let tree = FilterParser::parse(expression)?;
    Binder::with_schema(schema).bind(&tree).map(Some)
}

/// Empty segments are skipped. A direction prefix without a field name is
/// an [`Error::InvalidParameter`].
fn parse_sorts(schema: Option<&dyn SchemaProvider>, key: &str, raw: &str) -> Result<Vec<Sort>> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (direction, name) = if let Some(name) = segment.strip_prefix('-') {
                (SortDirection::Descending, name.trim())
            } else {
                (
                    SortDirection::Ascending,
                    segment.strip_prefix('+').unwrap_or(segment).trim(),
                )
            };
            if name.is_empty() {
                return Err(Error::invalid_parameter(key, segment, "missing field name"));
            }
            let Some(schema) = schema else {
                return Ok(Sort {
                    field: name.to_string(),
                    column: name.to_string(),
                    direction,
                });
            };
            let field = resolve(schema, name)?;
            if !field.is_sortable() {
                debug!(field = field.name(), "field is not sortable");
                return Err(Error::NotSortable {
                    field: field.name().to_string(),
                });
            }
            Ok(Sort {
                field: field.name().to_string(),
                column: field.column_name().to_string(),
                direction,
            })
        })
        .collect()
}

fn parse_selects(schema: Option<&dyn SchemaProvider>, raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| match schema {
            Some(schema) => resolve(schema, name).map(|f| f.column_name().to_string()),
            None => Ok(name.to_string()),
        })
        .collect()
}

fn parse_limit(options: &QueryOptions, raw: Option<&str>) -> Result<u32> {
    let requested = match raw.map(str::trim) {
        None | Some("") => options.default_limit,
        Some(text) => parse_positive(&options.limit_key, text)?,
    };
    match options.max_limit {
        Some(max) if requested > max => {
            debug!(requested, max, "clamping limit");
            Ok(max)
        }
        _ => Ok(requested),
    }
}

fn parse_page(key: &str, raw: Option<&str>) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(1),
        Some(text) => parse_positive(key, text),
    }
}

fn parse_positive(key: &str, text: &str) -> Result<u32> {
    let value: u32 = text
        .parse()
        .map_err(|_| Error::invalid_parameter(key, text, "expected a positive integer"))?;
    if value == 0 {
        return Err(Error::invalid_parameter(key, text, "must be at least 1"));
    }
    Ok(value)
}
