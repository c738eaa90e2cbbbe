//! Integration tests for the query entry point.
//!
//! These tests run whole query strings through `QueryParser` against
//! schemas built in code and loaded from TOML.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rsql::filter::{Logic, Operator};
use rsql::schema::{DataType, FieldDescriptor, IntWidth, Schema, SchemaConfig, SqlNull};
use rsql::{parse_query, ErrorKind, FlatFilter, QueryParser, SchemaProvider, TypedNode, Value};

fn record_schema() -> Schema {
    Schema::builder()
        .field(FieldDescriptor::new("int", DataType::Int(IntWidth::W64)))
        .field(FieldDescriptor::new("status", DataType::String).sortable(true))
        .field(
            FieldDescriptor::new("no", DataType::Int(IntWidth::W32))
                .column("No2")
                .sortable(true)
                .allow([Operator::Equal, Operator::GreaterThan, Operator::GreaterOrEqual]),
        )
        .field(FieldDescriptor::new("text", DataType::optional(DataType::String)))
        .field(FieldDescriptor::new("name", DataType::String).sortable(true))
        .build()
        .expect("valid schema")
}

fn movie_schema() -> Schema {
    let config: SchemaConfig = toml::from_str(
        r#"
[[fields]]
name = "genres"

[[fields]]
name = "director"

[[fields]]
name = "director.lastName"
column = "director_last_name"

[[fields]]
name = "actor"

[[fields]]
name = "year"
type = "int16"
sort = true

[[fields]]
name = "name"

[[fields]]
name = "title"
"#,
    )
    .expect("valid toml");
    Schema::try_from(config).expect("valid schema")
}

fn flat(name: &str, operator: Operator, value: impl Into<Value>) -> FlatFilter {
    FlatFilter {
        name: name.to_string(),
        operator,
        value: value.into(),
    }
}

// ============================================================================
// Envelope Tests
// ============================================================================

#[test]
fn test_full_query_with_schema() {
    let parser = QueryParser::new(record_schema());
    let params = parser
        .parse_query(r#"filter=int>10;status=eq="111";no=gt=1991;text==null&sort=status,-no&limit=100&page=2"#)
        .expect("query should parse");

    assert_eq!(
        params.flat_filters(),
        vec![
            flat("int", Operator::GreaterThan, 10i64),
            flat("status", Operator::Equal, "111"),
            flat("No2", Operator::GreaterThan, 1991i64),
            flat("text", Operator::Equal, Value::Null),
        ]
    );

    let sorts: Vec<_> = params.sorts.iter().map(ToString::to_string).collect();
    assert_eq!(sorts, vec!["status", "-No2"]);
    assert_eq!(params.limit, 100);
    assert_eq!(params.offset, 100);
}

#[test]
fn test_empty_filter_with_paging() {
    let params = parse_query("filter=&sort=name,-status&limit=10&page=2", None).unwrap();
    assert!(params.filters.is_none());
    assert_eq!(params.sorts.len(), 2);
    assert_eq!(params.limit, 10);
    assert_eq!(params.offset, 10);
}

#[test]
fn test_selects_resolve_to_columns() {
    let parser = QueryParser::new(record_schema());
    let params = parser.parse_query("select=status,no").unwrap();
    assert_eq!(params.selects, vec!["status", "No2"]);

    let err = parser.parse_query("select=status,nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownField);
}

#[test]
fn test_sort_requires_sortable_field() {
    let parser = QueryParser::new(record_schema());
    let err = parser.parse_query("sort=int").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownField);
    assert_eq!(err.to_string(), "field 'int' is not sortable");

    let err = parser.parse_query("sort=-stats").unwrap_err();
    assert_eq!(err.to_string(), "unknown field 'stats'. Did you mean 'status'?");
}

#[test]
fn test_params_serialize() {
    let parser = QueryParser::new(record_schema());
    let params = parser
        .parse_query("filter=no>=7&sort=-no&cursor=abc")
        .unwrap();
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["sorts"][0]["direction"], "desc");
    assert_eq!(json["sorts"][0]["column"], "No2");
    assert_eq!(json["cursor"], "abc");
    assert_eq!(json["limit"], 20);
    assert_eq!(
        json["filters"]["group"][0]["comparison"]["values"][0],
        serde_json::json!(7)
    );
}

// ============================================================================
// Filter Corpus Tests
// ============================================================================

#[test]
fn test_movie_corpus_parses() {
    let parser = QueryParser::new(movie_schema());
    let corpus = [
        r#"name=="Kill Bill";year=gt=2003"#,
        "name==\"Kill Bill\" and year>2003",
        "genres=in=(sci-fi,action);(director=='Christopher Nolan',actor==*Bale);year=ge=2000",
        "genres=in=(sci-fi,action) and (director=='Christopher Nolan' or actor==*Bale) and year>=2000",
        "director.lastName==Nolan;year=ge=2000;year=lt=2010",
        "director.lastName==Nolan and year>=2000 and year<2010",
        "genres=in=(sci-fi,action);genres=out=(romance,animated,horror),director==Que*Tarantino",
        "genres=in=(sci-fi,action) and genres=out=(romance,animated,horror) or director==Que*Tarantino",
        r#"title=like="testing%25""#,
    ];
    for expression in corpus {
        let tree = parser
            .parse_filter(expression)
            .unwrap_or_else(|e| panic!("{expression}: {e}"))
            .expect("non-empty filter");
        assert!(!tree.comparisons().is_empty(), "{expression}");
    }
}

#[test]
fn test_symbol_and_word_forms_bind_identically() {
    let parser = QueryParser::new(movie_schema());
    let pairs = [
        (
            "director.lastName==Nolan;year=ge=2000;year=lt=2010",
            "director.lastName==Nolan and year>=2000 and year<2010",
        ),
        (
            "genres=in=(sci-fi,action);genres=out=(romance,animated,horror),director==Que*Tarantino",
            "genres=in=(sci-fi,action) and genres=out=(romance,animated,horror) or director==Que*Tarantino",
        ),
    ];
    for (symbols, words) in pairs {
        assert_eq!(
            parser.parse_filter(symbols).unwrap(),
            parser.parse_filter(words).unwrap()
        );
    }
}

#[test]
fn test_grouping_survives_binding() {
    let parser = QueryParser::new(movie_schema());
    let tree = parser
        .parse_filter("genres=in=(sci-fi,action);(director=='Christopher Nolan',actor==*Bale);year=ge=2000")
        .unwrap()
        .unwrap();
    let TypedNode::Group(top) = &tree else {
        panic!("expected group");
    };
    assert_eq!(top.len(), 5);
    assert_eq!(top[1], TypedNode::Logical(Logic::And));
    let TypedNode::Group(nested) = &top[2] else {
        panic!("expected nested group");
    };
    assert_eq!(nested[1], TypedNode::Logical(Logic::Or));

    let year = tree.comparisons()[3];
    assert_eq!(year.values, vec![Value::Int(2000)]);
    assert_eq!(
        tree.comparisons()[0].value(),
        Value::List(vec!["sci-fi".into(), "action".into()])
    );
}

#[test]
fn test_dotted_selector_maps_to_column() {
    let parser = QueryParser::new(movie_schema());
    let tree = parser.parse_filter("director.lastName==Nolan").unwrap().unwrap();
    assert_eq!(tree.flatten()[0].name, "director_last_name");
}

#[test]
fn test_like_value_is_kept_verbatim() {
    let parser = QueryParser::new(movie_schema());
    let tree = parser.parse_filter(r#"title=like="testing%25""#).unwrap().unwrap();
    assert_eq!(tree.flatten()[0].value, Value::String("testing%25".into()));
}

// ============================================================================
// Error Taxonomy Tests
// ============================================================================

#[test]
fn test_overflow_on_narrow_field() {
    let parser = QueryParser::new(record_schema());
    let err = parser
        .parse_query("filter=no=gt=99999999999999999999")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);

    let parser = QueryParser::new(movie_schema());
    let err = parser.parse_filter("year==40000").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);
}

#[test]
fn test_unknown_field() {
    let parser = QueryParser::new(record_schema());
    let err = parser.parse_query("filter=missing==1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownField);
}

#[test]
fn test_operator_outside_allow_list() {
    let parser = QueryParser::new(record_schema());
    let err = parser.parse_query("filter=no=like=1991").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperatorNotAllowed);
}

#[test]
fn test_malformed_filters() {
    let parser = QueryParser::new(record_schema());
    let err = parser
        .parse_query(r#"filter=status=="APPROVED"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lexical);

    let err = parser.parse_query("filter=(status==1;name==2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

// ============================================================================
// Schema Variants
// ============================================================================

#[test]
fn test_absent_schema_accepts_everything() {
    let params = parse_query("filter=anything=like=%25x;n>abc&sort=-whatever", None).unwrap();
    let filters = params.flat_filters();
    assert_eq!(filters[0], flat("anything", Operator::Like, "%25x"));
    assert_eq!(filters[1], flat("n", Operator::GreaterThan, "abc"));
    assert_eq!(params.sorts[0].column, "whatever");
}

#[test]
fn test_sql_null_types() {
    let schema = Schema::builder()
        .field(FieldDescriptor::new("name", DataType::scannable(SqlNull::string())))
        .field(FieldDescriptor::new("created_at", DataType::scannable(SqlNull::time())))
        .field(FieldDescriptor::new("count", DataType::scannable(SqlNull::int64())))
        .build()
        .unwrap();
    let parser = QueryParser::new(schema);

    let tree = parser
        .parse_filter("name=like=foo;created_at>2020-01-14;count==null")
        .unwrap()
        .unwrap();
    let values: Vec<_> = tree.flatten().into_iter().map(|f| f.value).collect();
    assert_eq!(
        values,
        vec![
            Value::String("foo".into()),
            Value::Timestamp(Utc.with_ymd_and_hms(2020, 1, 14, 0, 0, 0).unwrap()),
            Value::Null,
        ]
    );

    let err = parser.parse_filter("count==many").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_unsupported_type_from_config() {
    let config: SchemaConfig = toml::from_str(
        r#"
[[fields]]
name = "shape"
type = "geometry"
"#,
    )
    .unwrap();
    let parser = QueryParser::new(Schema::try_from(config).unwrap());
    let err = parser.parse_filter("shape==x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
}

#[test]
fn test_schema_is_shared_across_threads() {
    let schema: Arc<dyn SchemaProvider> = Arc::new(record_schema());
    let parser = QueryParser::from_shared(schema);

    std::thread::scope(|scope| {
        for i in 0..8 {
            let parser = &parser;
            scope.spawn(move || {
                let params = parser
                    .parse_query(&format!("filter=int=={i};no>={i}&limit=5&page={}", i + 1))
                    .unwrap();
                assert_eq!(params.flat_filters()[0].value, Value::Int(i));
                assert_eq!(params.offset, 5 * i as u64);
            });
        }
    });
}
