//! Reference resolution against the component table.

use std::collections::{HashMap, HashSet};

use crate::error::CompileError;
use crate::ir::node::{SchemaKind, SchemaNode};

/// The only reference target form this compiler understands.
const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// A schema with any reference indirection stripped off.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub node: &'a SchemaNode,
    /// The component name of the last reference followed, if any.
    pub name: Option<&'a str>,
    pub is_reference: bool,
}

/// Extract the component name from a `$ref` path.
///
/// External (cross-document) references and non-schema targets are
/// unsupported rather than silently misread.
pub fn reference_name(ref_path: &str) -> Result<&str, CompileError> {
    if let Some(name) = ref_path.strip_prefix(COMPONENTS_PREFIX) {
        return Ok(name);
    }
    if ref_path.starts_with('#') {
        return Err(CompileError::UnsupportedFeature {
            detail: format!("reference target `{ref_path}` is not a component schema"),
        });
    }
    Err(CompileError::UnsupportedFeature {
        detail: format!("external reference `{ref_path}`"),
    })
}

/// Dereference `node` against `components`, following alias chains.
///
/// Non-reference nodes pass through untouched. A chain that never reaches a
/// structural node is a cycle and fails.
pub fn resolve<'a>(
    node: &'a SchemaNode,
    components: &'a HashMap<String, SchemaNode>,
) -> Result<Resolved<'a>, CompileError> {
    let SchemaKind::Reference(_) = &node.kind else {
        return Ok(Resolved {
            node,
            name: None,
            is_reference: false,
        });
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = node;
    let mut last_name = None;
    while let SchemaKind::Reference(ref_path) = &current.kind {
        let name = reference_name(ref_path)?;
        if !seen.insert(name) {
            return Err(CompileError::UnsupportedFeature {
                detail: format!("reference cycle through component schema `{name}`"),
            });
        }
        current = components
            .get(name)
            .ok_or_else(|| CompileError::UnresolvedReference {
                name: name.to_string(),
            })?;
        last_name = Some(name);
    }

    Ok(Resolved {
        node: current,
        name: last_name,
        is_reference: true,
    })
}

/// Whether a node can be rendered as a primitive/simple alias at the use
/// site, so a reference to it is inlined instead of forcing callers to
/// depend on a pointless single-line named type.
pub fn is_inlinable(
    node: &SchemaNode,
    components: &HashMap<String, SchemaNode>,
) -> Result<bool, CompileError> {
    match &node.kind {
        SchemaKind::Boolean | SchemaKind::Integer | SchemaKind::Number | SchemaKind::Fragment => {
            Ok(true)
        }
        SchemaKind::String { enum_values, .. } => Ok(enum_values.is_empty()),
        SchemaKind::Array { items } => match items {
            Some(items) => is_inlinable(items, components),
            None => Ok(false),
        },
        SchemaKind::Reference(_) => {
            let resolved = resolve(node, components)?;
            is_inlinable(resolved.node, components)
        }
        SchemaKind::Object { .. }
        | SchemaKind::AllOf(_)
        | SchemaKind::OneOf(_)
        | SchemaKind::AnyOf(_)
        | SchemaKind::Not => Ok(false),
    }
}
