//! Output formatting for schema field listings.

use rsql::filter::OperatorSet;
use rsql::FieldDescriptor;
use serde::Serialize;

use super::helpers::{format_flag, push_header, truncate_str};

/// JSON output structure for the schema command.
#[derive(Serialize)]
pub struct SchemaOutput<'a> {
    pub fields: Vec<FieldOutput<'a>>,
}

/// JSON output structure for a single field.
#[derive(Serialize)]
pub struct FieldOutput<'a> {
    pub name: &'a str,
    pub column: &'a str,
    #[serde(rename = "type")]
    pub data_type: String,
    pub filterable: bool,
    pub sortable: bool,
    pub operators: OperatorSet,
}

/// Formats schema fields as JSON.
pub fn format_schema_json(fields: &[FieldDescriptor]) -> Result<String, serde_json::Error> {
    let output = SchemaOutput {
        fields: fields
            .iter()
            .map(|f| FieldOutput {
                name: f.name(),
                column: f.column_name(),
                data_type: f.data_type().to_string(),
                filterable: f.is_filterable(),
                sortable: f.is_sortable(),
                operators: f.allowed_operators(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats schema fields as a table.
pub fn format_schema_table(fields: &[FieldDescriptor], use_colors: bool) -> String {
    if fields.is_empty() {
        return "No fields declared.\n".to_string();
    }

    let mut output = String::new();
    let header = format!(
        "{:<24} {:<24} {:<18} {:<6} {:<6} {}",
        "Field", "Column", "Type", "Filter", "Sort", "Operators"
    );
    push_header(&mut output, &header, use_colors);

    for field in fields {
        // pad by visible width, escape codes would throw off {:<6}
        let filter = format_flag(field.is_filterable(), use_colors);
        let sort = format_flag(field.is_sortable(), use_colors);
        let pad = |flag: bool| " ".repeat(6usize.saturating_sub(if flag { 3 } else { 2 }));
        output.push_str(&format!(
            "{:<24} {:<24} {:<18} {}{} {}{} {}\n",
            truncate_str(field.name(), 24),
            truncate_str(field.column_name(), 24),
            truncate_str(&field.data_type().to_string(), 18),
            filter,
            pad(field.is_filterable()),
            sort,
            pad(field.is_sortable()),
            field.allowed_operators(),
        ));
    }
    output
}
