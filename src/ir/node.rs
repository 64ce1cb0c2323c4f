//! Lowered schema graph.
//!
//! The raw serde structs in `document` mirror the wire format of OpenAPI
//! 3.0 and 3.1, which spell the same ideas several ways (`nullable: true`,
//! `type: ["string", "null"]`, `anyOf: [T, {type: "null"}]`). Lowering
//! collapses all of that into one canonical [`SchemaNode`] shape so the
//! compiler only ever sees a single nullability flag and a single tagged
//! kind per node.

use std::collections::{BTreeSet, HashMap};

use crate::document::{AdditionalProperties, EnumValue, Schema, SchemaTable, SchemaType};

/// Metadata shared by every schema node.
#[derive(Debug, Clone, Default)]
pub struct SchemaMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub example: Option<serde_json::Value>,
    pub nullable: bool,
}

/// One node of the lowered schema graph. Read-only once built.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub meta: SchemaMeta,
    pub kind: SchemaKind,
}

/// The kind-specific payload of a schema node.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    Boolean,
    Integer,
    Number,
    String {
        format: Option<String>,
        enum_values: Vec<String>,
    },
    Object {
        /// Property name/schema pairs, sorted by name.
        properties: Vec<(String, SchemaNode)>,
        required: BTreeSet<String>,
        additional: Option<MapValues>,
    },
    Array {
        items: Option<Box<SchemaNode>>,
    },
    AllOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    Not,
    /// A `$ref`, kept verbatim until resolution.
    Reference(String),
    /// An unconstrained "any" schema.
    Fragment,
}

/// Value constraint of an open map (`additionalProperties`).
#[derive(Debug, Clone)]
pub enum MapValues {
    /// `additionalProperties: true`: values are arbitrary JSON.
    Any,
    /// `additionalProperties: {...}`: values match a schema.
    Schema(Box<SchemaNode>),
}

impl SchemaMeta {
    fn from_schema(schema: &Schema) -> Self {
        Self {
            title: schema.title.clone(),
            description: schema.description.clone(),
            example: schema.example.clone(),
            nullable: schema.is_nullable(),
        }
    }
}

impl SchemaNode {
    /// Lower a raw schema into its canonical node form.
    pub fn lower(schema: &Schema) -> Self {
        // $ref wins over everything else on the same object.
        if let Some(ref_path) = &schema.ref_path {
            return Self {
                meta: SchemaMeta::from_schema(schema),
                kind: SchemaKind::Reference(ref_path.clone()),
            };
        }

        if let Some(all_of) = &schema.all_of {
            return Self {
                meta: SchemaMeta::from_schema(schema),
                kind: SchemaKind::AllOf(all_of.iter().map(Self::lower).collect()),
            };
        }

        // anyOf with a null member is the 3.1 spelling of nullability; a
        // single remaining member collapses into that member.
        if let Some(members) = schema.non_null_any_of() {
            if members.len() == 1 {
                let mut node = Self::lower(members[0]);
                node.meta.nullable = true;
                if node.meta.title.is_none() {
                    node.meta.title = schema.title.clone();
                }
                if node.meta.description.is_none() {
                    node.meta.description = schema.description.clone();
                }
                return node;
            }
            return Self {
                meta: SchemaMeta::from_schema(schema),
                kind: SchemaKind::AnyOf(members.into_iter().map(Self::lower).collect()),
            };
        }
        if let Some(any_of) = &schema.any_of {
            return Self {
                meta: SchemaMeta::from_schema(schema),
                kind: SchemaKind::AnyOf(any_of.iter().map(Self::lower).collect()),
            };
        }

        if let Some(one_of) = &schema.one_of {
            return Self {
                meta: SchemaMeta::from_schema(schema),
                kind: SchemaKind::OneOf(one_of.iter().map(Self::lower).collect()),
            };
        }

        if schema.not.is_some() {
            return Self {
                meta: SchemaMeta::from_schema(schema),
                kind: SchemaKind::Not,
            };
        }

        let meta = SchemaMeta::from_schema(schema);
        let kind = match &schema.schema_type {
            Some(SchemaType::Single(t)) => Self::lower_typed(t, schema),
            Some(SchemaType::Multiple(types)) => {
                let non_null: Vec<&String> = types.iter().filter(|t| *t != "null").collect();
                match non_null.as_slice() {
                    [] => SchemaKind::Fragment,
                    [t] => Self::lower_typed(t, schema),
                    many => SchemaKind::OneOf(
                        many.iter()
                            .map(|t| Self {
                                meta: SchemaMeta::default(),
                                kind: Self::lower_typed(t, schema),
                            })
                            .collect(),
                    ),
                }
            }
            None => Self::lower_untyped(schema),
        };
        Self { meta, kind }
    }

    fn lower_typed(type_name: &str, schema: &Schema) -> SchemaKind {
        match type_name {
            "boolean" => SchemaKind::Boolean,
            "integer" => SchemaKind::Integer,
            "number" => SchemaKind::Number,
            "string" => SchemaKind::String {
                format: schema.format.clone(),
                enum_values: string_enum_values(schema),
            },
            "object" => Self::lower_object(schema),
            "array" => SchemaKind::Array {
                items: schema.items.as_deref().map(|s| Box::new(Self::lower(s))),
            },
            // A bare "null" type constrains nothing beyond nullability.
            _ => SchemaKind::Fragment,
        }
    }

    /// Schemas with no `type` keyword still imply a shape through their
    /// other keywords.
    fn lower_untyped(schema: &Schema) -> SchemaKind {
        if schema.properties.is_some() || schema.additional_properties.is_some() {
            return Self::lower_object(schema);
        }
        if schema.items.is_some() {
            return SchemaKind::Array {
                items: schema.items.as_deref().map(|s| Box::new(Self::lower(s))),
            };
        }
        let enum_values = string_enum_values(schema);
        if !enum_values.is_empty() {
            return SchemaKind::String {
                format: schema.format.clone(),
                enum_values,
            };
        }
        SchemaKind::Fragment
    }

    fn lower_object(schema: &Schema) -> SchemaKind {
        let mut properties: Vec<(String, SchemaNode)> = schema
            .properties
            .iter()
            .flatten()
            .map(|(name, prop)| (name.clone(), Self::lower(prop)))
            .collect();
        properties.sort_by(|(a, _), (b, _)| a.cmp(b));

        let required: BTreeSet<String> = schema
            .required
            .iter()
            .flatten()
            .cloned()
            .collect();

        let additional = match &schema.additional_properties {
            Some(AdditionalProperties::Bool(true)) => Some(MapValues::Any),
            Some(AdditionalProperties::Schema(value)) => {
                Some(MapValues::Schema(Box::new(Self::lower(value))))
            }
            Some(AdditionalProperties::Bool(false)) | None => None,
        };

        SchemaKind::Object {
            properties,
            required,
            additional,
        }
    }
}

fn string_enum_values(schema: &Schema) -> Vec<String> {
    schema
        .enum_values
        .iter()
        .flatten()
        .filter_map(|v| match v {
            EnumValue::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

/// The lowered form of a whole schema table: the component lookup table and
/// the set of top-level schemas, which are the same entries.
#[derive(Debug)]
pub struct SchemaSet {
    components: HashMap<String, SchemaNode>,
}

impl SchemaSet {
    pub fn lower(table: &SchemaTable) -> Self {
        let components = table
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), SchemaNode::lower(schema)))
            .collect();
        Self { components }
    }

    pub fn components(&self) -> &HashMap<String, SchemaNode> {
        &self.components
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.components.get(name)
    }

    /// Top-level schema names in lexicographic order, so output is stable
    /// regardless of hash iteration or completion order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::document::SchemaTable;

    fn lower_one(json: &str) -> SchemaNode {
        let table = SchemaTable::from_json(&format!(r##"{{"T": {json}}}"##)).unwrap();
        SchemaNode::lower(table.schemas.get("T").unwrap())
    }

    #[test]
    fn test_lower_nullable_any_of_collapses() {
        let node = lower_one(r##"{"anyOf": [{"type": "string"}, {"type": "null"}]}"##);
        assert!(node.meta.nullable);
        assert!(matches!(node.kind, SchemaKind::String { .. }));
    }

    #[test]
    fn test_lower_type_array() {
        let node = lower_one(r##"{"type": ["integer", "null"]}"##);
        assert!(node.meta.nullable);
        assert!(matches!(node.kind, SchemaKind::Integer));
    }

    #[test]
    fn test_lower_object_sorts_properties() {
        let node = lower_one(
            r##"{"type": "object", "properties": {"b": {"type": "string"}, "a": {"type": "integer"}}}"##,
        );
        let SchemaKind::Object { properties, .. } = &node.kind else {
            panic!("expected object");
        };
        let names: Vec<&str> = properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_lower_untyped_is_fragment() {
        let node = lower_one(r##"{"description": "anything goes"}"##);
        assert!(matches!(node.kind, SchemaKind::Fragment));
    }

    #[test]
    fn test_lower_ref() {
        let node = lower_one(r##"{"$ref": "#/components/schemas/Pet"}"##);
        assert!(matches!(node.kind, SchemaKind::Reference(path) if path.ends_with("/Pet")));
    }

    #[test]
    fn test_lower_non_string_enum_is_plain() {
        let node = lower_one(r##"{"type": "string", "enum": ["a", "b"]}"##);
        let SchemaKind::String { enum_values, .. } = &node.kind else {
            panic!("expected string");
        };
        assert_eq!(enum_values, &["a", "b"]);

        let node = lower_one(r##"{"type": "integer", "enum": [1, 2]}"##);
        assert!(matches!(node.kind, SchemaKind::Integer));
    }
}
