//! Raw schema structs for serde deserialization.
//!
//! This module defines the minimal subset of OpenAPI 3.0/3.1 schema objects
//! the compiler consumes. Loading the surrounding document (paths,
//! operations, info) is the caller's job; what arrives here is the
//! `components.schemas` table, already isolated, and parsing it is delegated
//! entirely to serde.

use serde::Deserialize;
use std::collections::HashMap;

/// The named top-level schemas of a document, keyed by component name.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct SchemaTable {
    pub schemas: HashMap<String, Schema>,
}

impl SchemaTable {
    /// Parse a schema table from the JSON object under `components.schemas`.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse schema table: {e}"))
    }
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Short human-readable name.
    pub title: Option<String>,

    /// Longer human-readable description.
    pub description: Option<String>,

    /// Example value, arbitrary JSON.
    pub example: Option<serde_json::Value>,

    /// Properties for object types.
    pub properties: Option<HashMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values (strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Union type (any of these schemas).
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    /// Union type (exactly one of these schemas).
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    /// Intersection type (all of these schemas combined).
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Negated schema.
    pub not: Option<Box<Schema>>,

    /// Additional properties for object types (for dictionary types).
    pub additional_properties: Option<AdditionalProperties>,

    /// Format hint (e.g., date-time, uri).
    pub format: Option<String>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

impl Schema {
    /// Check if this schema is nullable (null in anyOf, type array, or the
    /// 3.0 nullable flag).
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }

        if let Some(any_of) = &self.any_of {
            for schema in any_of {
                if let Some(SchemaType::Single(t)) = &schema.schema_type
                    && t == "null"
                {
                    return true;
                }
            }
        }

        if let Some(SchemaType::Multiple(types)) = &self.schema_type
            && types.iter().any(|t| t == "null")
        {
            return true;
        }

        false
    }

    /// The non-null members of an anyOf that includes null.
    pub fn non_null_any_of(&self) -> Option<Vec<&Schema>> {
        let any_of = self.any_of.as_ref()?;
        let members: Vec<&Schema> = any_of
            .iter()
            .filter(|schema| {
                !matches!(&schema.schema_type, Some(SchemaType::Single(t)) if t == "null")
            })
            .collect();
        if members.len() < any_of.len() {
            Some(members)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let table = SchemaTable::from_json(
            r#"{"Pet": {"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}}}"#,
        )
        .unwrap();
        let pet = table.schemas.get("Pet").unwrap();
        assert!(matches!(&pet.schema_type, Some(SchemaType::Single(t)) if t == "object"));
        assert_eq!(pet.required.as_deref(), Some(&["name".to_string()][..]));
    }

    #[test]
    fn test_nullable_type_array() {
        let table =
            SchemaTable::from_json(r#"{"Tag": {"type": ["string", "null"]}}"#).unwrap();
        assert!(table.schemas.get("Tag").unwrap().is_nullable());
    }

    #[test]
    fn test_nullable_any_of() {
        let table = SchemaTable::from_json(
            r#"{"Tag": {"anyOf": [{"type": "string"}, {"type": "null"}]}}"#,
        )
        .unwrap();
        let tag = table.schemas.get("Tag").unwrap();
        assert!(tag.is_nullable());
        let members = tag.non_null_any_of().unwrap();
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_parse_error() {
        assert!(SchemaTable::from_json("not json").is_err());
    }
}
