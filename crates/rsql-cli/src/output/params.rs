//! Output formatting for parsed queries and filter trees.

use owo_colors::OwoColorize;
use rsql::filter::Logic;
use rsql::{FlatFilter, Params, Sort, TypedNode};
use serde::Serialize;

use super::helpers::{format_value, push_header};

/// JSON output structure for a parsed query with flat filters.
#[derive(Serialize)]
pub struct FlatParamsOutput<'a> {
    pub selects: &'a [String],
    pub filters: Vec<FlatFilter>,
    pub sorts: &'a [Sort],
    pub limit: u32,
    pub offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a str>,
}

/// JSON output structure for a bound filter expression.
#[derive(Serialize)]
pub struct FilterOutput<'a> {
    /// Canonical rendering of the parsed expression.
    pub expression: String,
    pub tree: &'a TypedNode,
}

/// Formats parsed query params as JSON, with either the tree or the flat view.
pub fn format_params_json(params: &Params, flat: bool) -> Result<String, serde_json::Error> {
    if !flat {
        return serde_json::to_string_pretty(params);
    }

    let output = FlatParamsOutput {
        selects: &params.selects,
        filters: params.flat_filters(),
        sorts: &params.sorts,
        limit: params.limit,
        offset: params.offset,
        cursor: params.cursor.as_deref(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats parsed query params for humans.
pub fn format_params_table(params: &Params, flat: bool, use_colors: bool) -> String {
    let mut output = String::new();

    output.push_str(&section("Filter", use_colors));
    match &params.filters {
        None => output.push_str("  (none)\n"),
        Some(_) if flat => output.push_str(&format_flat_table(&params.flat_filters(), use_colors)),
        Some(tree) => output.push_str(&format_tree(tree, use_colors)),
    }

    output.push_str(&section("Sort", use_colors));
    if params.sorts.is_empty() {
        output.push_str("  (none)\n");
    }
    for sort in &params.sorts {
        let direction = format!("{:?}", sort.direction).to_lowercase();
        output.push_str(&format!("  {:<24} {}\n", sort.column, direction));
    }

    if !params.selects.is_empty() {
        output.push_str(&section("Select", use_colors));
        output.push_str(&format!("  {}\n", params.selects.join(", ")));
    }

    output.push_str(&section("Paging", use_colors));
    output.push_str(&format!("  limit:  {}\n", params.limit));
    output.push_str(&format!("  offset: {}\n", params.offset));
    if let Some(cursor) = &params.cursor {
        output.push_str(&format!("  cursor: {}\n", cursor));
    }

    output
}

/// Formats a bound filter as JSON.
pub fn format_filter_json(expression: String, tree: &TypedNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&FilterOutput { expression, tree })
}

/// Formats a bound filter for humans: the canonical expression, then the tree.
pub fn format_filter_table(expression: &str, tree: &TypedNode, use_colors: bool) -> String {
    let mut output = String::new();
    output.push_str(&section("Expression", use_colors));
    output.push_str(&format!("  {}\n", expression));
    output.push_str(&section("Tree", use_colors));
    output.push_str(&format_tree(tree, use_colors));
    output
}

/// Formats the flat filter view as a table.
pub fn format_flat_table(filters: &[FlatFilter], use_colors: bool) -> String {
    let mut output = String::new();
    let header = format!("  {:<24} {:<8} {}", "Column", "Op", "Value");
    push_header(&mut output, &header, use_colors);

    for filter in filters {
        output.push_str(&format!(
            "  {:<24} {:<8} {}\n",
            filter.name,
            filter.operator.name(),
            format_value(&filter.value, use_colors)
        ));
    }
    output
}

/// Formats a typed tree, one node per line, indented by depth.
pub fn format_tree(tree: &TypedNode, use_colors: bool) -> String {
    let mut output = String::new();
    write_node(&mut output, tree, 1, use_colors);
    output
}

fn write_node(output: &mut String, node: &TypedNode, depth: usize, use_colors: bool) {
    let indent = "  ".repeat(depth);
    match node {
        TypedNode::Group(children) => {
            let label = if use_colors {
                "group".dimmed().to_string()
            } else {
                "group".to_string()
            };
            output.push_str(&format!("{indent}{label}\n"));
            for child in children {
                write_node(output, child, depth + 1, use_colors);
            }
        }
        TypedNode::Logical(logic) => {
            let label = match logic {
                Logic::And => "AND",
                Logic::Or => "OR",
            };
            let label = if use_colors {
                label.magenta().to_string()
            } else {
                label.to_string()
            };
            output.push_str(&format!("{indent}{label}\n"));
        }
        TypedNode::Comparison(comparison) => {
            let field = if comparison.field == comparison.column {
                comparison.field.clone()
            } else {
                format!("{} ({})", comparison.field, comparison.column)
            };
            let field = if use_colors {
                field.bold().to_string()
            } else {
                field
            };
            let values: Vec<String> = comparison
                .values
                .iter()
                .map(|v| format_value(v, use_colors))
                .collect();
            output.push_str(&format!(
                "{indent}{} {} {}\n",
                field,
                comparison.operator.name(),
                values.join(", ")
            ));
        }
    }
}

fn section(title: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", title.green().bold())
    } else {
        format!("{}\n", title)
    }
}
