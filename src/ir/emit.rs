//! Swift source emission via the Emit trait.
//!
//! Rendering is purely mechanical: every decision (names, optionality,
//! nesting, variant order) was already made by the compiler. Nested
//! declarations render inside their parent's lexical scope, one indent
//! level deeper.

use crate::ir::types::{CompiledType, Doc, Field, Variant};

/// Trait for emitting Swift code from compiled declarations.
pub trait Emit {
    /// Render at the given indentation depth (4 spaces per level).
    fn emit_indented(&self, indent: usize) -> String;

    /// Render at top level.
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

/// The generic JSON fallback type, emitted once per run when any schema
/// required it.
pub const ANY_JSON_DECL: &str = r#"/// A JSON value of arbitrary shape.
enum AnyJSON: Codable, Equatable {
    case object([String: AnyJSON])
    case array([AnyJSON])
    case string(String)
    case number(Double)
    case bool(Bool)
    case null

    init(from decoder: Decoder) throws {
        let container = try decoder.singleValueContainer()
        if container.decodeNil() { self = .null; return }
        if let value = try? container.decode(Bool.self) { self = .bool(value); return }
        if let value = try? container.decode(Double.self) { self = .number(value); return }
        if let value = try? container.decode(String.self) { self = .string(value); return }
        if let value = try? container.decode([String: AnyJSON].self) { self = .object(value); return }
        if let value = try? container.decode([AnyJSON].self) { self = .array(value); return }
        throw DecodingError.dataCorruptedError(in: container, debugDescription: "invalid JSON value")
    }

    func encode(to encoder: Encoder) throws {
        var container = encoder.singleValueContainer()
        switch self {
        case .object(let value):
            try container.encode(value)
        case .array(let value):
            try container.encode(value)
        case .string(let value):
            try container.encode(value)
        case .number(let value):
            try container.encode(value)
        case .bool(let value):
            try container.encode(value)
        case .null:
            try container.encodeNil()
        }
    }
}
"#;

impl Emit for CompiledType {
    fn emit_indented(&self, indent: usize) -> String {
        match self {
            Self::Alias { name, doc, target } => {
                let pad = pad(indent);
                let mut out = String::new();
                emit_doc(doc, &mut out, &pad);
                out.push_str(&format!("{pad}typealias {name} = {}\n", target.render()));
                out
            }
            Self::Record {
                name,
                doc,
                fields,
                nested,
            } => emit_record(name, doc, fields, nested, indent),
            Self::Enumeration { name, doc, cases } => {
                let pad = pad(indent);
                let mut out = String::new();
                emit_doc(doc, &mut out, &pad);
                out.push_str(&format!("{pad}enum {name}: String, Codable {{\n"));
                for case in cases {
                    out.push_str(&format!(
                        "{pad}    case {} = \"{}\"\n",
                        case.identifier,
                        escape_string(&case.wire_value)
                    ));
                }
                out.push_str(&format!("{pad}}}\n"));
                out
            }
            Self::TaggedUnion {
                name,
                doc,
                variants,
                nested,
            } => emit_tagged_union(name, doc, variants, nested, indent),
            Self::OpenComposite {
                name,
                doc,
                variants,
                nested,
            } => emit_open_composite(name, doc, variants, nested, indent),
        }
    }
}

fn pad(indent: usize) -> String {
    "    ".repeat(indent)
}

/// Escape a string for a Swift string literal.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Emit doc comment lines from title/description/example metadata.
/// Examples that duplicate the title or are empty are skipped.
fn emit_doc(doc: &Doc, out: &mut String, pad: &str) {
    let title = doc.title.as_deref().filter(|t| !t.is_empty());
    if let Some(title) = title {
        out.push_str(&format!("{pad}/// {title}\n"));
    }
    if let Some(description) = doc.description.as_deref().filter(|d| !d.is_empty())
        && Some(description) != title
    {
        for line in description.lines() {
            out.push_str(&format!("{pad}/// {line}\n"));
        }
    }
    if let Some(example) = &doc.example {
        let rendered = match example {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() || Some(s.as_str()) == title => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        if let Some(rendered) = rendered {
            out.push_str(&format!("{pad}/// Example: {rendered}\n"));
        }
    }
}

fn field_type(field: &Field) -> String {
    if field.optional {
        format!("{}?", field.ty.render())
    } else {
        field.ty.render()
    }
}

fn emit_properties(fields: &[Field], out: &mut String, pad: &str) {
    for field in fields {
        emit_doc(&field.doc, out, pad);
        out.push_str(&format!("{pad}let {}: {}\n", field.identifier, field_type(field)));
    }
}

/// Memberwise initializer; classes do not synthesize one.
fn emit_init(fields: &[Field], out: &mut String, pad: &str) {
    let params: Vec<String> = fields
        .iter()
        .map(|field| {
            let default = if field.optional { " = nil" } else { "" };
            format!("{}: {}{default}", field.identifier, field_type(field))
        })
        .collect();
    out.push_str(&format!("{pad}init({}) {{\n", params.join(", ")));
    for field in fields {
        out.push_str(&format!(
            "{pad}    self.{} = {}\n",
            field.identifier, field.identifier
        ));
    }
    out.push_str(&format!("{pad}}}\n"));
}

/// The coding-key table is only spelled out when some identifier differs
/// from its wire key; it then lists every field so re-encoding reproduces
/// the original wire keys exactly.
fn emit_coding_keys(fields: &[Field], out: &mut String, pad: &str) {
    if fields.iter().all(Field::matches_wire_key) {
        return;
    }
    out.push('\n');
    out.push_str(&format!("{pad}private enum CodingKeys: String, CodingKey {{\n"));
    for field in fields {
        if field.matches_wire_key() {
            out.push_str(&format!("{pad}    case {}\n", field.identifier));
        } else {
            out.push_str(&format!(
                "{pad}    case {} = \"{}\"\n",
                field.identifier,
                escape_string(&field.wire_key)
            ));
        }
    }
    out.push_str(&format!("{pad}}}\n"));
}

fn emit_nested(nested: &[CompiledType], out: &mut String, indent: usize) {
    for decl in nested {
        out.push('\n');
        out.push_str(&decl.emit_indented(indent));
    }
}

fn emit_record(
    name: &str,
    doc: &Doc,
    fields: &[Field],
    nested: &[CompiledType],
    indent: usize,
) -> String {
    let pad = pad(indent);
    let inner = format!("{pad}    ");
    let mut out = String::new();
    emit_doc(doc, &mut out, &pad);
    // A class rather than a struct: reference semantics give
    // self-referential fields the indirection they need.
    out.push_str(&format!("{pad}final class {name}: Codable {{\n"));
    emit_properties(fields, &mut out, &inner);
    if !fields.is_empty() {
        out.push('\n');
        emit_init(fields, &mut out, &inner);
        emit_coding_keys(fields, &mut out, &inner);
    }
    emit_nested(nested, &mut out, indent + 1);
    out.push_str(&format!("{pad}}}\n"));
    out
}

fn emit_tagged_union(
    name: &str,
    doc: &Doc,
    variants: &[Variant],
    nested: &[CompiledType],
    indent: usize,
) -> String {
    let pad = pad(indent);
    let inner = format!("{pad}    ");
    let mut out = String::new();
    emit_doc(doc, &mut out, &pad);
    out.push_str(&format!("{pad}indirect enum {name}: Codable {{\n"));
    for variant in variants {
        out.push_str(&format!(
            "{inner}case {}({})\n",
            variant.identifier,
            variant.payload.render()
        ));
    }

    // Decoding commits to the first variant that decodes, in declaration
    // order; ambiguous payloads resolve to the earlier variant.
    out.push('\n');
    out.push_str(&format!("{inner}init(from decoder: Decoder) throws {{\n"));
    out.push_str(&format!(
        "{inner}    let container = try decoder.singleValueContainer()\n"
    ));
    for variant in variants {
        out.push_str(&format!(
            "{inner}    if let value = try? container.decode({}.self) {{ self = .{}(value); return }}\n",
            variant.payload.render(),
            variant.identifier
        ));
    }
    out.push_str(&format!(
        "{inner}    throw DecodingError.dataCorruptedError(in: container, debugDescription: \"no variant of {name} matched\")\n"
    ));
    out.push_str(&format!("{inner}}}\n"));

    out.push('\n');
    out.push_str(&format!("{inner}func encode(to encoder: Encoder) throws {{\n"));
    out.push_str(&format!("{inner}    switch self {{\n"));
    for variant in variants {
        out.push_str(&format!(
            "{inner}    case .{}(let value):\n",
            variant.identifier
        ));
        out.push_str(&format!("{inner}        try value.encode(to: encoder)\n"));
    }
    out.push_str(&format!("{inner}    }}\n"));
    out.push_str(&format!("{inner}}}\n"));

    emit_nested(nested, &mut out, indent + 1);
    out.push_str(&format!("{pad}}}\n"));
    out
}

fn emit_open_composite(
    name: &str,
    doc: &Doc,
    variants: &[Variant],
    nested: &[CompiledType],
    indent: usize,
) -> String {
    let pad = pad(indent);
    let inner = format!("{pad}    ");
    let mut out = String::new();
    emit_doc(doc, &mut out, &pad);
    out.push_str(&format!("{pad}final class {name}: Codable {{\n"));
    for variant in variants {
        out.push_str(&format!(
            "{inner}let {}: {}?\n",
            variant.identifier,
            variant.payload.render()
        ));
    }

    // Every member decodes independently and best-effort; none is required
    // to succeed.
    out.push('\n');
    out.push_str(&format!("{inner}init(from decoder: Decoder) throws {{\n"));
    out.push_str(&format!(
        "{inner}    let container = try decoder.singleValueContainer()\n"
    ));
    for variant in variants {
        out.push_str(&format!(
            "{inner}    {} = try? container.decode({}.self)\n",
            variant.identifier,
            variant.payload.render()
        ));
    }
    out.push_str(&format!("{inner}}}\n"));

    out.push('\n');
    out.push_str(&format!("{inner}func encode(to encoder: Encoder) throws {{\n"));
    for variant in variants {
        out.push_str(&format!(
            "{inner}    if let value = {} {{ try value.encode(to: encoder) }}\n",
            variant.identifier
        ));
    }
    out.push_str(&format!("{inner}}}\n"));

    emit_nested(nested, &mut out, indent + 1);
    out.push_str(&format!("{pad}}}\n"));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::types::{EnumCase, SwiftType};

    fn field(identifier: &str, wire_key: &str, ty: SwiftType, optional: bool) -> Field {
        Field {
            identifier: identifier.to_string(),
            wire_key: wire_key.to_string(),
            ty,
            optional,
            doc: Doc::default(),
        }
    }

    #[test]
    fn test_emit_alias() {
        let decl = CompiledType::Alias {
            name: "PetList".into(),
            doc: Doc::default(),
            target: SwiftType::Array(Box::new(SwiftType::Named("Pet".into()))),
        };
        assert_eq!(decl.emit(), "typealias PetList = [Pet]\n");
    }

    #[test]
    fn test_emit_enumeration() {
        let decl = CompiledType::Enumeration {
            name: "Reaction".into(),
            doc: Doc::default(),
            cases: vec![
                EnumCase {
                    identifier: "plus1".into(),
                    wire_value: "+1".into(),
                },
                EnumCase {
                    identifier: "laugh".into(),
                    wire_value: "laugh".into(),
                },
            ],
        };
        let expected = "enum Reaction: String, Codable {\n    case plus1 = \"+1\"\n    case laugh = \"laugh\"\n}\n";
        assert_eq!(decl.emit(), expected);
    }

    #[test]
    fn test_emit_record_without_coding_keys() {
        let decl = CompiledType::Record {
            name: "Pet".into(),
            doc: Doc::default(),
            fields: vec![
                field("name", "name", SwiftType::String, false),
                field("tag", "tag", SwiftType::String, true),
            ],
            nested: vec![],
        };
        let out = decl.emit();
        assert!(out.contains("final class Pet: Codable {"));
        assert!(out.contains("    let name: String\n"));
        assert!(out.contains("    let tag: String?\n"));
        assert!(out.contains("    init(name: String, tag: String? = nil) {"));
        assert!(!out.contains("CodingKeys"));
    }

    #[test]
    fn test_emit_record_with_coding_keys() {
        let decl = CompiledType::Record {
            name: "User".into(),
            doc: Doc::default(),
            fields: vec![
                field("fullName", "full_name", SwiftType::String, false),
                field("age", "age", SwiftType::Int, true),
            ],
            nested: vec![],
        };
        let out = decl.emit();
        assert!(out.contains("private enum CodingKeys: String, CodingKey {"));
        assert!(out.contains("        case fullName = \"full_name\"\n"));
        assert!(out.contains("        case age\n"));
    }

    #[test]
    fn test_emit_tagged_union_cascade_order() {
        let decl = CompiledType::TaggedUnion {
            name: "Value".into(),
            doc: Doc::default(),
            variants: vec![
                Variant {
                    identifier: "card".into(),
                    payload: SwiftType::Named("Card".into()),
                },
                Variant {
                    identifier: "string".into(),
                    payload: SwiftType::String,
                },
            ],
            nested: vec![],
        };
        let out = decl.emit();
        assert!(out.contains("indirect enum Value: Codable {"));
        let card = out
            .find("if let value = try? container.decode(Card.self)")
            .unwrap();
        let string = out
            .find("if let value = try? container.decode(String.self)")
            .unwrap();
        assert!(card < string, "decode cascade must follow declaration order");
        assert!(out.contains("throw DecodingError.dataCorruptedError"));
    }

    #[test]
    fn test_emit_open_composite() {
        let decl = CompiledType::OpenComposite {
            name: "Contact".into(),
            doc: Doc::default(),
            variants: vec![
                Variant {
                    identifier: "email".into(),
                    payload: SwiftType::Named("Email".into()),
                },
                Variant {
                    identifier: "phone".into(),
                    payload: SwiftType::Named("Phone".into()),
                },
            ],
            nested: vec![],
        };
        let out = decl.emit();
        assert!(out.contains("let email: Email?"));
        assert!(out.contains("email = try? container.decode(Email.self)"));
        assert!(out.contains("if let value = phone { try value.encode(to: encoder) }"));
    }

    #[test]
    fn test_emit_nested_indentation() {
        let nested = CompiledType::Enumeration {
            name: "Status".into(),
            doc: Doc::default(),
            cases: vec![EnumCase {
                identifier: "placed".into(),
                wire_value: "placed".into(),
            }],
        };
        let decl = CompiledType::Record {
            name: "Order".into(),
            doc: Doc::default(),
            fields: vec![field("status", "status", SwiftType::Named("Status".into()), true)],
            nested: vec![nested],
        };
        let out = decl.emit();
        assert!(out.contains("    enum Status: String, Codable {\n"));
        assert!(out.contains("        case placed = \"placed\"\n"));
    }

    #[test]
    fn test_emit_doc_comments() {
        let decl = CompiledType::Alias {
            name: "Labels".into(),
            doc: Doc {
                title: Some("Labels".into()),
                description: Some("Free-form labels.".into()),
                example: Some(serde_json::json!({"env": "prod"})),
            },
            target: SwiftType::Dictionary(Box::new(SwiftType::String)),
        };
        let out = decl.emit();
        assert!(out.starts_with("/// Labels\n/// Free-form labels.\n"));
        assert!(out.contains("/// Example: {\"env\":\"prod\"}\n"));
    }

    #[test]
    fn test_emit_doc_skips_duplicate_example() {
        let decl = CompiledType::Alias {
            name: "Name".into(),
            doc: Doc {
                title: Some("Name".into()),
                description: None,
                example: Some(serde_json::Value::String("Name".into())),
            },
            target: SwiftType::String,
        };
        assert_eq!(decl.emit(), "/// Name\ntypealias Name = String\n");
    }
}
