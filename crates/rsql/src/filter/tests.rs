//! Tests for the filter parser.

use super::*;
use crate::error::ErrorKind;

fn cmp(selector: &str, operator: Operator, arguments: &[&str]) -> Node {
    Node::Comparison(Comparison::new(selector, operator, arguments.iter().copied()))
}

fn children(node: &Node) -> &[Node] {
    match node {
        Node::Group(children) => children,
        other => panic!("expected group, got {other:?}"),
    }
}

// ==================== Single Comparison Tests ====================

#[test]
fn test_parse_single_comparison() {
    let tree = FilterParser::parse("no=gt=1991").unwrap();
    assert_eq!(
        tree,
        Node::Group(vec![cmp("no", Operator::GreaterThan, &["1991"])])
    );
}

#[test]
fn test_parse_symbolic_and_padded_forms_agree() {
    let pairs = [
        ("a==1", "a=eq=1"),
        ("a!=1", "a=ne=1"),
        ("a>1", "a=gt=1"),
        ("a>=1", "a=ge=1"),
        ("a<1", "a=lt=1"),
        ("a<=1", "a=le=1"),
    ];
    for (symbolic, padded) in pairs {
        assert_eq!(
            FilterParser::parse(symbolic).unwrap(),
            FilterParser::parse(padded).unwrap(),
            "{symbolic} vs {padded}"
        );
    }
}

#[test]
fn test_parse_quoted_values() {
    let tree = FilterParser::parse(r#"name=="Kill Bill";title=='it\'s'"#).unwrap();
    let comparisons = tree.comparisons();
    assert_eq!(comparisons[0].arguments, vec!["Kill Bill"]);
    assert_eq!(comparisons[1].arguments, vec!["it's"]);
}

#[test]
fn test_parse_multi_value_operator() {
    let tree = FilterParser::parse("genres=in=(sci-fi,action)").unwrap();
    assert_eq!(
        tree,
        Node::Group(vec![cmp("genres", Operator::In, &["sci-fi", "action"])])
    );
}

#[test]
fn test_parse_in_with_single_value() {
    let tree = FilterParser::parse("genres=out=horror").unwrap();
    assert_eq!(
        tree,
        Node::Group(vec![cmp("genres", Operator::NotIn, &["horror"])])
    );
}

#[test]
fn test_parse_null_literal_stays_raw() {
    let tree = FilterParser::parse("text==null").unwrap();
    assert_eq!(tree.comparisons()[0].arguments, vec!["null"]);
}

// ==================== Logical Operator Tests ====================

#[test]
fn test_parse_and_or_symbols() {
    let tree = FilterParser::parse("a==1;b==2,c==3").unwrap();
    assert_eq!(
        tree,
        Node::Group(vec![
            cmp("a", Operator::Equal, &["1"]),
            Node::Logical(Logic::And),
            cmp("b", Operator::Equal, &["2"]),
            Node::Logical(Logic::Or),
            cmp("c", Operator::Equal, &["3"]),
        ])
    );
}

#[test]
fn test_parse_and_or_words() {
    assert_eq!(
        FilterParser::parse("a==1 and b==2 or c==3").unwrap(),
        FilterParser::parse("a==1;b==2,c==3").unwrap()
    );
}

// ==================== Grouping Tests ====================

#[test]
fn test_grouping_is_preserved() {
    let tree = FilterParser::parse("(a==1;b==2),c==3").unwrap();
    assert_eq!(
        tree,
        Node::Group(vec![
            Node::Group(vec![
                cmp("a", Operator::Equal, &["1"]),
                Node::Logical(Logic::And),
                cmp("b", Operator::Equal, &["2"]),
            ]),
            Node::Logical(Logic::Or),
            cmp("c", Operator::Equal, &["3"]),
        ])
    );

    let selectors: Vec<_> = tree.comparisons().iter().map(|c| c.selector.clone()).collect();
    assert_eq!(selectors, vec!["a", "b", "c"]);
}

#[test]
fn test_group_after_connective() {
    let tree = FilterParser::parse(
        "genres=in=(sci-fi,action);(director=='Christopher Nolan',actor==*Bale);year=ge=2000",
    )
    .unwrap();
    let top = children(&tree);
    assert_eq!(top.len(), 5);
    assert!(matches!(top[2], Node::Group(_)));
    assert_eq!(children(&top[2]).len(), 3);
    assert_eq!(tree.comparisons()[2].arguments, vec!["*Bale"]);
}

#[test]
fn test_leading_group_is_nested() {
    let tree = FilterParser::parse("(a==1;b==2)").unwrap();
    let top = children(&tree);
    assert_eq!(top.len(), 1);
    assert_eq!(children(&top[0]).len(), 3);
}

#[test]
fn test_consecutive_group_closes() {
    let tree = FilterParser::parse("((a==1;(b==2)));c==3").unwrap();
    let top = children(&tree);
    assert_eq!(top.len(), 3);
    let outer = children(&top[0]);
    assert_eq!(outer.len(), 1);
    let inner = children(&outer[0]);
    assert_eq!(inner.len(), 3);
    assert!(matches!(inner[2], Node::Group(_)));
}

#[test]
fn test_empty_expression() {
    assert!(FilterParser::parse("").unwrap().is_empty());
    assert!(FilterParser::parse("   ").unwrap().is_empty());
}

// ==================== Round Trip Tests ====================

#[test]
fn test_render_and_reparse_is_stable() {
    let inputs = [
        "name==\"Kill Bill\";year=gt=2003",
        "genres=in=(sci-fi,action) and (director=='Christopher Nolan' or actor==*Bale) and year>=2000",
        "director.lastName==Nolan;year=ge=2000;year=lt=2010",
        "genres=in=(sci-fi,action);genres=out=(romance,animated,horror),director==Que*Tarantino",
        r#"quote=='it\'s \\ here';x=isnull=true"#,
        "((a==1))",
    ];
    for input in inputs {
        let tree = FilterParser::parse(input).unwrap();
        let rendered = tree.to_string();
        let reparsed = FilterParser::parse(&rendered)
            .unwrap_or_else(|e| panic!("reparse of {rendered:?} failed: {e}"));
        assert_eq!(tree, reparsed, "round trip of {input}");
    }
}

// ==================== Error Tests ====================

#[test]
fn test_unterminated_quote_is_lexical() {
    let err = FilterParser::parse("status==\"APPROVED").unwrap_err();
    assert_eq!(err, FilterError::UnterminatedQuote { position: 8 });
    assert_eq!(err.kind(), ErrorKind::Lexical);
}

#[test]
fn test_unknown_operator_is_lexical() {
    let err = FilterParser::parse("a=between=1").unwrap_err();
    assert_eq!(
        err,
        FilterError::UnknownOperator {
            symbol: "=between=".to_string(),
            position: 1
        }
    );
    assert_eq!(err.kind(), ErrorKind::Lexical);

    let err = FilterParser::parse("a!1").unwrap_err();
    assert!(matches!(err, FilterError::UnknownOperator { ref symbol, .. } if symbol == "!"));
}

#[test]
fn test_unbalanced_group_is_syntax() {
    let err = FilterParser::parse("(status==1;name==2").unwrap_err();
    assert_eq!(
        err,
        FilterError::UnclosedGroup {
            open: 1,
            position: 0
        }
    );
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_extra_group_end_is_syntax() {
    let err = FilterParser::parse("status==1)").unwrap_err();
    assert_eq!(err, FilterError::UnexpectedGroupEnd { position: 9 });
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_multiple_values_on_single_valued_operator() {
    let err = FilterParser::parse("a==(1,2)").unwrap_err();
    assert!(matches!(
        err,
        FilterError::TooManyValues { count: 2, ref operator, .. } if operator == "=="
    ));
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_missing_components_are_lexical() {
    for input in ["status", "status==", "==1", "a==1;=gt=2", "a=in=()"] {
        let err = FilterParser::parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lexical, "{input}: {err}");
    }
}

#[test]
fn test_misplaced_connectives_are_syntax() {
    for input in [
        "a==1;",
        "a==1,",
        "a==1 and",
        ";a==1",
        "or a==1",
        "a==1;;b==2",
        "a==1;,b==2",
        "(;a==1)",
        "(a==1;)",
    ] {
        let err = FilterParser::parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{input}: {err}");
    }

    assert_eq!(
        FilterParser::parse("a==1;;b==2").unwrap_err(),
        FilterError::MisplacedLogical {
            operator: ";".to_string(),
            position: 5
        }
    );
    assert_eq!(
        FilterParser::parse("a==1;").unwrap_err(),
        FilterError::DanglingLogical { position: 5 }
    );
}

#[test]
fn test_empty_group_is_rejected() {
    for input in ["()", "a==1;()", "(())"] {
        let err = FilterParser::parse(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax, "{input}: {err}");
    }
    assert_eq!(
        FilterParser::parse("()").unwrap_err(),
        FilterError::EmptyGroup { position: 0 }
    );
}

#[test]
fn test_nesting_limit() {
    let depth = MAX_GROUP_DEPTH + 1;
    let input = format!("{}a==1{}", "(".repeat(depth), ")".repeat(depth));
    let err = FilterParser::parse(&input).unwrap_err();
    assert!(matches!(err, FilterError::NestingTooDeep { .. }));

    let ok = format!(
        "{}a==1{}",
        "(".repeat(MAX_GROUP_DEPTH),
        ")".repeat(MAX_GROUP_DEPTH)
    );
    assert!(FilterParser::parse(&ok).is_ok());
}

#[test]
fn test_trailing_garbage_is_rejected() {
    let err = FilterParser::parse("a==1 b==2").unwrap_err();
    assert_eq!(err, FilterError::MissingLogical { position: 5 });
    assert_eq!(err.kind(), ErrorKind::Syntax);
}
