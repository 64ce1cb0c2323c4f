//! The structural compiler.
//!
//! This is the central recursion: given a named schema node it decides
//! whether the node needs a standalone declaration and builds it, compiling
//! nested complex children along the way. Simple shapes dissolve into
//! inline type expressions through the simple-type mapper; references stay
//! by-name so the output remains a tree even when the schema graph has
//! cycles.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{trace, warn};

use crate::error::CompileError;
use crate::ir::context::{CompilationContext, Diagnostic};
use crate::ir::naming::NameRules;
use crate::ir::node::{MapValues, SchemaKind, SchemaNode};
use crate::ir::resolve::resolve;
use crate::ir::simple::simple_type;
use crate::ir::types::{CompiledType, Doc, EnumCase, Field, SwiftType, Variant};

/// Which composition semantics a union declaration carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnionShape {
    /// oneOf: exactly one variant, first decode match wins.
    Tagged,
    /// anyOf: all variants independently optional.
    Open,
}

/// Compiles schema nodes against one immutable component table.
#[derive(Debug)]
pub struct Compiler<'a> {
    components: &'a HashMap<String, SchemaNode>,
    rules: &'a NameRules,
}

impl<'a> Compiler<'a> {
    pub fn new(components: &'a HashMap<String, SchemaNode>, rules: &'a NameRules) -> Self {
        Self { components, rules }
    }

    /// Compile one named schema node.
    ///
    /// Returns no declarations when the node is fully handled inline at its
    /// use sites. A top-level array of a complex item is the one case that
    /// returns two: the `<Name>Item` declaration next to its alias.
    pub fn compile(
        &self,
        name: &str,
        node: &'a SchemaNode,
        level: usize,
        ctx: &mut CompilationContext,
    ) -> Result<Vec<CompiledType>, CompileError> {
        trace!(name, level, "compiling schema node");
        match &node.kind {
            SchemaKind::Boolean | SchemaKind::Integer | SchemaKind::Number => Ok(Vec::new()),
            SchemaKind::String { enum_values, .. } => {
                if enum_values.is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![self.compile_enumeration(name, node, enum_values)])
                }
            }
            SchemaKind::Object {
                properties,
                required,
                additional,
            } => {
                if properties.is_empty() {
                    Ok(vec![self.compile_map_alias(
                        name,
                        node,
                        additional.as_ref(),
                        ctx,
                    )?])
                } else {
                    let props: Vec<(&str, &SchemaNode)> = properties
                        .iter()
                        .map(|(key, prop)| (key.as_str(), prop))
                        .collect();
                    Ok(vec![self.compile_record(
                        name, node, &props, required, level, ctx,
                    )?])
                }
            }
            SchemaKind::Array { items } => {
                self.compile_array(name, node, items.as_deref(), level, ctx)
            }
            SchemaKind::AllOf(members) => {
                Ok(vec![self.compile_all_of(name, node, members, level, ctx)?])
            }
            SchemaKind::OneOf(members) => Ok(vec![self.compile_union(
                name,
                node,
                members,
                level,
                ctx,
                UnionShape::Tagged,
            )?]),
            SchemaKind::AnyOf(members) => Ok(vec![self.compile_union(
                name,
                node,
                members,
                level,
                ctx,
                UnionShape::Open,
            )?]),
            SchemaKind::Not => Err(CompileError::UnsupportedSchemaShape {
                detail: "schema negation has no type representation".to_string(),
            }),
            // Handled as an inline alias or named reference by the caller.
            SchemaKind::Reference(_) => Ok(Vec::new()),
            SchemaKind::Fragment => {
                ctx.require_json_fallback();
                Ok(Vec::new())
            }
        }
    }

    fn compile_enumeration(
        &self,
        name: &str,
        node: &SchemaNode,
        values: &[String],
    ) -> CompiledType {
        let mut used = HashSet::new();
        let cases = values
            .iter()
            .map(|value| EnumCase {
                identifier: disambiguate(self.rules.field_name(value), &mut used),
                // The wire value stays verbatim even when it is not a valid
                // bare identifier.
                wire_value: value.clone(),
            })
            .collect();
        CompiledType::Enumeration {
            name: name.to_string(),
            doc: Doc::from_meta(&node.meta),
            cases,
        }
    }

    /// An object with no properties is a dictionary, not a record.
    fn compile_map_alias(
        &self,
        name: &str,
        node: &'a SchemaNode,
        additional: Option<&'a MapValues>,
        ctx: &mut CompilationContext,
    ) -> Result<CompiledType, CompileError> {
        let target = match additional {
            Some(MapValues::Schema(value)) => {
                match simple_type(value, self.components, self.rules, ctx) {
                    Ok(value_type) => SwiftType::Dictionary(Box::new(value_type)),
                    Err(err) if !err.is_fatal() => {
                        ctx.push(Diagnostic {
                            schema: name.to_string(),
                            property: None,
                            message: format!("map values fall back to AnyJSON: {err}"),
                        });
                        ctx.require_json_fallback();
                        SwiftType::Dictionary(Box::new(SwiftType::Json))
                    }
                    Err(err) => return Err(err),
                }
            }
            Some(MapValues::Any) | None => {
                ctx.require_json_fallback();
                SwiftType::Dictionary(Box::new(SwiftType::Json))
            }
        };
        Ok(CompiledType::Alias {
            name: name.to_string(),
            doc: Doc::from_meta(&node.meta),
            target,
        })
    }

    fn compile_record(
        &self,
        name: &str,
        node: &SchemaNode,
        properties: &[(&'a str, &'a SchemaNode)],
        required: &BTreeSet<String>,
        level: usize,
        ctx: &mut CompilationContext,
    ) -> Result<CompiledType, CompileError> {
        // Lexicographic field order keeps output stable across runs.
        let mut props = properties.to_vec();
        props.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut fields = Vec::new();
        let mut nested = Vec::new();
        for (key, prop) in props {
            // A required-but-nullable field and an optional field both
            // admit absence of a meaningful value.
            let optional = !required.contains(key) || prop.meta.nullable;
            match self.use_site_type(key, prop, level, ctx, &mut nested) {
                Ok(ty) => fields.push(Field {
                    identifier: self.rules.field_name(key),
                    wire_key: key.to_string(),
                    ty,
                    optional,
                    doc: Doc::from_meta(&prop.meta),
                }),
                Err(err) if !err.is_fatal() => {
                    warn!(schema = name, property = key, %err, "dropping field");
                    ctx.push(Diagnostic {
                        schema: name.to_string(),
                        property: Some(key.to_string()),
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(CompiledType::Record {
            name: name.to_string(),
            doc: Doc::from_meta(&node.meta),
            fields,
            nested,
        })
    }

    /// The Swift type for a property or member at its use site, compiling a
    /// nested declaration when the schema is structural.
    fn use_site_type(
        &self,
        key: &str,
        node: &'a SchemaNode,
        level: usize,
        ctx: &mut CompilationContext,
        nested: &mut Vec<CompiledType>,
    ) -> Result<SwiftType, CompileError> {
        if self.is_structural(node) {
            let child_name = self.rules.type_name(key);
            let decls = self.compile(&child_name, node, level + 1, ctx)?;
            let ty = decls
                .last()
                .map(|decl| SwiftType::Named(decl.name().to_string()))
                .ok_or_else(|| CompileError::UnsupportedSchemaShape {
                    detail: "structural schema produced no declaration".to_string(),
                })?;
            nested.extend(decls);
            Ok(ty)
        } else {
            simple_type(node, self.components, self.rules, ctx)
        }
    }

    /// Whether this node needs a standalone declaration, as opposed to an
    /// inline type expression. References never do: the simple mapper
    /// inlines them or names their existing declaration.
    fn is_structural(&self, node: &SchemaNode) -> bool {
        match &node.kind {
            SchemaKind::Object { .. }
            | SchemaKind::AllOf(_)
            | SchemaKind::OneOf(_)
            | SchemaKind::AnyOf(_) => true,
            SchemaKind::String { enum_values, .. } => !enum_values.is_empty(),
            SchemaKind::Array { items } => match items {
                Some(items) => self.is_structural(items),
                // The missing-item error surfaces through the simple mapper.
                None => false,
            },
            _ => false,
        }
    }

    fn compile_array(
        &self,
        name: &str,
        node: &'a SchemaNode,
        items: Option<&'a SchemaNode>,
        level: usize,
        ctx: &mut CompilationContext,
    ) -> Result<Vec<CompiledType>, CompileError> {
        let Some(items) = items else {
            return Err(CompileError::MissingArrayItemType);
        };

        // Simple items (including references, which inline or stay by-name)
        // need only the alias.
        if !self.is_structural(items) {
            let item_type = simple_type(items, self.components, self.rules, ctx)?;
            return Ok(vec![CompiledType::Alias {
                name: name.to_string(),
                doc: Doc::from_meta(&node.meta),
                target: SwiftType::Array(Box::new(item_type)),
            }]);
        }

        let item_name = format!("{name}Item");
        let mut decls = self.compile(&item_name, items, level + 1, ctx)?;
        let item = decls
            .last()
            .ok_or_else(|| CompileError::UnsupportedSchemaShape {
                detail: "array item schema produced no declaration".to_string(),
            })?;
        let target = SwiftType::Array(Box::new(SwiftType::Named(item.name().to_string())));
        decls.push(CompiledType::Alias {
            name: name.to_string(),
            doc: Doc::from_meta(&node.meta),
            target,
        });
        Ok(decls)
    }

    /// allOf models composition by flattening member properties into one
    /// record at compile time.
    fn compile_all_of(
        &self,
        name: &str,
        node: &SchemaNode,
        members: &'a [SchemaNode],
        level: usize,
        ctx: &mut CompilationContext,
    ) -> Result<CompiledType, CompileError> {
        let mut merged: Vec<(&str, &SchemaNode)> = Vec::new();
        let mut required = BTreeSet::new();
        self.flatten_all_of(members, &mut merged, &mut required)?;
        self.compile_record(name, node, &merged, &required, level, ctx)
    }

    /// Flatten member properties, following references and nested allOf.
    /// Property-name collisions between members surface as an error instead
    /// of silently resolving to one side.
    fn flatten_all_of(
        &self,
        members: &'a [SchemaNode],
        merged: &mut Vec<(&'a str, &'a SchemaNode)>,
        required: &mut BTreeSet<String>,
    ) -> Result<(), CompileError> {
        for member in members {
            let resolved = resolve(member, self.components)?;
            match &resolved.node.kind {
                SchemaKind::Object {
                    properties,
                    required: member_required,
                    ..
                } => {
                    for (key, prop) in properties {
                        if merged.iter().any(|(k, _)| *k == key.as_str()) {
                            return Err(CompileError::UnsupportedSchemaShape {
                                detail: format!(
                                    "property `{key}` appears in more than one allOf member"
                                ),
                            });
                        }
                        merged.push((key.as_str(), prop));
                    }
                    required.extend(member_required.iter().cloned());
                }
                SchemaKind::AllOf(inner) => self.flatten_all_of(inner, merged, required)?,
                _ => {
                    return Err(CompileError::UnsupportedSchemaShape {
                        detail: "allOf member is not an object schema".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn compile_union(
        &self,
        name: &str,
        node: &'a SchemaNode,
        members: &'a [SchemaNode],
        level: usize,
        ctx: &mut CompilationContext,
        shape: UnionShape,
    ) -> Result<CompiledType, CompileError> {
        let mut variants = Vec::new();
        let mut nested = Vec::new();
        let mut used = HashSet::new();
        // Branches without a natural primitive name get Object, Object2 and
        // so on; the counter keeps sibling order stable and reproducible.
        let mut object_count = 0usize;

        for member in members {
            let (stem, payload) = if self.is_structural(member) {
                object_count += 1;
                let suffix = if object_count == 1 {
                    "Object".to_string()
                } else {
                    format!("Object{object_count}")
                };
                let child_name = format!("{name}{suffix}");
                let decls = self.compile(&child_name, member, level + 1, ctx)?;
                let last = decls
                    .last()
                    .ok_or_else(|| CompileError::UnsupportedSchemaShape {
                        detail: "union member produced no declaration".to_string(),
                    })?;
                let payload = SwiftType::Named(last.name().to_string());
                nested.extend(decls);
                (suffix, payload)
            } else {
                let payload = simple_type(member, self.components, self.rules, ctx)?;
                (payload.variant_stem().to_string(), payload)
            };
            let identifier = disambiguate(self.rules.field_name(&stem), &mut used);
            variants.push(Variant {
                identifier,
                payload,
            });
        }

        let doc = Doc::from_meta(&node.meta);
        Ok(match shape {
            UnionShape::Tagged => CompiledType::TaggedUnion {
                name: name.to_string(),
                doc,
                variants,
                nested,
            },
            UnionShape::Open => CompiledType::OpenComposite {
                name: name.to_string(),
                doc,
                variants,
                nested,
            },
        })
    }
}

/// Keep an identifier unique among its siblings with an incrementing
/// counter, preserving a trailing backtick escape.
fn disambiguate(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = if let Some(stripped) = base.strip_suffix('`') {
            format!("{stripped}{n}`")
        } else {
            format!("{base}{n}")
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
