//! Serde representation of a schema, for loading from configuration files.

use serde::{Deserialize, Serialize};

use crate::filter::OperatorSet;

use super::{DataType, FieldDescriptor, Schema, SchemaError};

/// A schema as written in a configuration file.
///
/// ```toml
/// [[fields]]
/// name = "no"
/// column = "No2"
/// type = "int32"
/// sort = true
/// allow = ["eq", "gt", "gte"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One field entry of a [`SchemaConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Public field name.
    pub name: String,

    /// Backing column name; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Type name, parsed with [`DataType`]'s `FromStr`.
    #[serde(rename = "type", default = "default_type")]
    pub data_type: String,

    /// Whether the field may be filtered on.
    #[serde(default = "default_true")]
    pub filter: bool,

    /// Whether the field may be sorted on.
    #[serde(default)]
    pub sort: bool,

    /// Operator names (`eq`, `gte`, ...) replacing the type's defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
}

fn default_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

impl FieldConfig {
    fn into_descriptor(self) -> Result<FieldDescriptor, SchemaError> {
        // FromStr for DataType is infallible
        let data_type = match self.data_type.parse::<DataType>() {
            Ok(t) => t,
            Err(never) => match never {},
        };
        let mut field = FieldDescriptor::new(self.name, data_type)
            .filterable(self.filter)
            .sortable(self.sort);
        if let Some(column) = self.column.filter(|c| !c.is_empty()) {
            field = field.column(column);
        }
        if let Some(allow) = self.allow {
            let operators = OperatorSet::parse(allow.iter().map(String::as_str)).map_err(|reason| {
                SchemaError::InvalidAllowList {
                    field: field.name().to_string(),
                    reason,
                }
            })?;
            field = field.allow(operators.iter());
        }
        Ok(field)
    }
}

impl TryFrom<SchemaConfig> for Schema {
    type Error = SchemaError;

    fn try_from(config: SchemaConfig) -> Result<Self, Self::Error> {
        let fields = config
            .fields
            .into_iter()
            .map(FieldConfig::into_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        Schema::new(fields)
    }
}

impl From<&Schema> for SchemaConfig {
    fn from(schema: &Schema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|f| FieldConfig {
                name: f.name().to_string(),
                column: (f.column_name() != f.name()).then(|| f.column_name().to_string()),
                data_type: f.data_type().type_name(),
                filter: f.is_filterable(),
                sort: f.is_sortable(),
                allow: f
                    .declared_operators()
                    .map(|set| set.iter().map(|op| op.name().to_string()).collect()),
            })
            .collect();
        SchemaConfig { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Operator;
    use crate::schema::{IntWidth, SchemaProvider};

    const SAMPLE: &str = r#"
[[fields]]
name = "status"
sort = true

[[fields]]
name = "no"
column = "No2"
type = "int32"
sort = true
allow = ["eq", "gt", "gte"]

[[fields]]
name = "text"
type = "optional<string>"

[[fields]]
name = "internal"
filter = false
"#;

    #[test]
    fn test_schema_from_toml() {
        let config: SchemaConfig = toml::from_str(SAMPLE).unwrap();
        let schema = Schema::try_from(config).unwrap();

        let status = schema.lookup("status").unwrap();
        assert_eq!(status.data_type(), &DataType::String);
        assert!(status.is_sortable());

        let no = schema.lookup("no").unwrap();
        assert_eq!(no.column_name(), "No2");
        assert_eq!(no.data_type(), &DataType::Int(IntWidth::W32));
        assert!(!no.allowed_operators().contains(Operator::Like));
        assert!(no.allowed_operators().contains(Operator::GreaterOrEqual));

        let text = schema.lookup("text").unwrap();
        assert!(text.data_type().is_optional());
        assert!(text.allowed_operators().contains(Operator::IsNull));

        assert!(!schema.lookup("internal").unwrap().is_filterable());
    }

    #[test]
    fn test_invalid_allow_list() {
        let config: SchemaConfig = toml::from_str(
            r#"
[[fields]]
name = "no"
allow = ["eq", "between"]
"#,
        )
        .unwrap();
        let err = Schema::try_from(config).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAllowList { ref field, .. } if field == "no"));
    }

    #[test]
    fn test_schema_to_config_round_trip() {
        let config: SchemaConfig = toml::from_str(SAMPLE).unwrap();
        let schema = Schema::try_from(config.clone()).unwrap();
        let back = SchemaConfig::from(&schema);
        assert_eq!(Schema::try_from(back).unwrap(), schema);
    }
}
