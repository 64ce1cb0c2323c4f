//! Mapping of leaf schema kinds to Swift primitive types.
//!
//! Everything structural (objects, compositions, enumerated strings) is
//! rejected here and belongs to the structural compiler instead.

use std::collections::HashMap;

use crate::error::CompileError;
use crate::ir::context::CompilationContext;
use crate::ir::naming::NameRules;
use crate::ir::node::{SchemaKind, SchemaNode};
use crate::ir::resolve::{is_inlinable, resolve};
use crate::ir::types::SwiftType;

/// Map a leaf schema to its Swift type.
///
/// References recurse through the resolver: inlinable targets dissolve into
/// their primitive type at the use site, anything else becomes a by-name
/// reference to the target's declaration.
pub fn simple_type(
    node: &SchemaNode,
    components: &HashMap<String, SchemaNode>,
    rules: &NameRules,
    ctx: &mut CompilationContext,
) -> Result<SwiftType, CompileError> {
    match &node.kind {
        SchemaKind::Boolean => Ok(SwiftType::Bool),
        SchemaKind::Integer => Ok(SwiftType::Int),
        SchemaKind::Number => Ok(SwiftType::Double),
        SchemaKind::String {
            format,
            enum_values,
        } => {
            if !enum_values.is_empty() {
                return Err(CompileError::UnsupportedSchemaShape {
                    detail: "enumerated string needs its own declaration".to_string(),
                });
            }
            Ok(match format.as_deref() {
                Some("date-time") => SwiftType::Date,
                Some("uri") => SwiftType::Url,
                _ => SwiftType::String,
            })
        }
        SchemaKind::Array { items } => {
            let items = items.as_deref().ok_or(CompileError::MissingArrayItemType)?;
            let item_type = simple_type(items, components, rules, ctx)?;
            Ok(SwiftType::Array(Box::new(item_type)))
        }
        SchemaKind::Reference(_) => {
            let resolved = resolve(node, components)?;
            if is_inlinable(resolved.node, components)? {
                simple_type(resolved.node, components, rules, ctx)
            } else {
                // Named enums and complex types stay a by-name reference.
                let name = resolved.name.unwrap_or_default();
                Ok(SwiftType::Named(rules.type_name(name)))
            }
        }
        SchemaKind::Fragment => {
            ctx.require_json_fallback();
            Ok(SwiftType::Json)
        }
        SchemaKind::Object { .. } => Err(CompileError::UnsupportedSchemaShape {
            detail: "object is not a simple type".to_string(),
        }),
        SchemaKind::AllOf(_) | SchemaKind::OneOf(_) | SchemaKind::AnyOf(_) => {
            Err(CompileError::UnsupportedSchemaShape {
                detail: "composition is not a simple type".to_string(),
            })
        }
        SchemaKind::Not => Err(CompileError::UnsupportedSchemaShape {
            detail: "schema negation has no type representation".to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::node::SchemaMeta;

    fn node(kind: SchemaKind) -> SchemaNode {
        SchemaNode {
            meta: SchemaMeta::default(),
            kind,
        }
    }

    fn string_node(format: Option<&str>) -> SchemaNode {
        node(SchemaKind::String {
            format: format.map(str::to_string),
            enum_values: vec![],
        })
    }

    fn map(
        n: &SchemaNode,
        components: &HashMap<String, SchemaNode>,
    ) -> Result<SwiftType, CompileError> {
        let rules = NameRules::default();
        let mut ctx = CompilationContext::new();
        simple_type(n, components, &rules, &mut ctx)
    }

    #[test]
    fn test_primitives() {
        let components = HashMap::new();
        assert_eq!(map(&node(SchemaKind::Boolean), &components).unwrap(), SwiftType::Bool);
        assert_eq!(map(&node(SchemaKind::Integer), &components).unwrap(), SwiftType::Int);
        assert_eq!(map(&node(SchemaKind::Number), &components).unwrap(), SwiftType::Double);
    }

    #[test]
    fn test_string_formats() {
        let components = HashMap::new();
        assert_eq!(map(&string_node(None), &components).unwrap(), SwiftType::String);
        assert_eq!(
            map(&string_node(Some("date-time")), &components).unwrap(),
            SwiftType::Date
        );
        assert_eq!(map(&string_node(Some("uri")), &components).unwrap(), SwiftType::Url);
        assert_eq!(map(&string_node(Some("email")), &components).unwrap(), SwiftType::String);
    }

    #[test]
    fn test_array_of_simple() {
        let components = HashMap::new();
        let arr = node(SchemaKind::Array {
            items: Some(Box::new(node(SchemaKind::Integer))),
        });
        assert_eq!(
            map(&arr, &components).unwrap(),
            SwiftType::Array(Box::new(SwiftType::Int))
        );
    }

    #[test]
    fn test_array_missing_items() {
        let components = HashMap::new();
        let arr = node(SchemaKind::Array { items: None });
        assert!(matches!(
            map(&arr, &components),
            Err(CompileError::MissingArrayItemType)
        ));
    }

    #[test]
    fn test_reference_inlined_when_simple() {
        let mut components = HashMap::new();
        components.insert("Email".to_string(), string_node(None));
        let reference = node(SchemaKind::Reference(
            "#/components/schemas/Email".to_string(),
        ));
        assert_eq!(map(&reference, &components).unwrap(), SwiftType::String);
    }

    #[test]
    fn test_reference_named_when_complex() {
        let mut components = HashMap::new();
        components.insert(
            "status_kind".to_string(),
            node(SchemaKind::String {
                format: None,
                enum_values: vec!["on".into(), "off".into()],
            }),
        );
        let reference = node(SchemaKind::Reference(
            "#/components/schemas/status_kind".to_string(),
        ));
        assert_eq!(
            map(&reference, &components).unwrap(),
            SwiftType::Named("StatusKind".into())
        );
    }

    #[test]
    fn test_fragment_sets_fallback_flag() {
        let components = HashMap::new();
        let rules = NameRules::default();
        let mut ctx = CompilationContext::new();
        let ty = simple_type(&node(SchemaKind::Fragment), &components, &rules, &mut ctx).unwrap();
        assert_eq!(ty, SwiftType::Json);
        assert!(ctx.needs_json_fallback());
    }

    #[test]
    fn test_structural_rejected() {
        let components = HashMap::new();
        let obj = node(SchemaKind::Object {
            properties: vec![],
            required: std::collections::BTreeSet::new(),
            additional: None,
        });
        assert!(matches!(
            map(&obj, &components),
            Err(CompileError::UnsupportedSchemaShape { .. })
        ));
    }
}
