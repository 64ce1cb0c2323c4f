//! Swift IR types for code generation.
//!
//! This module defines the compiler's output representation:
//! - [`SwiftType`]: use-site type expressions (primitives, arrays,
//!   dictionaries, named references)
//! - [`CompiledType`]: standalone declarations (records, enumerations,
//!   unions, aliases) with their nested child declarations

use crate::ir::node::SchemaMeta;

/// A use-site Swift type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwiftType {
    Bool,
    Int,
    Double,
    String,
    /// `date-time` formatted strings.
    Date,
    /// `uri` formatted strings.
    Url,
    /// Array type: `[T]`
    Array(Box<SwiftType>),
    /// String-keyed dictionary: `[String: T]`
    Dictionary(Box<SwiftType>),
    /// By-name reference to a declared type. The indirection is what lets
    /// self-referential schemas compile (the declaration table owns the
    /// target; nothing is embedded).
    Named(String),
    /// The generic JSON fallback type.
    Json,
}

impl SwiftType {
    /// Render as Swift source.
    pub fn render(&self) -> String {
        match self {
            Self::Bool => "Bool".to_string(),
            Self::Int => "Int".to_string(),
            Self::Double => "Double".to_string(),
            Self::String => "String".to_string(),
            Self::Date => "Date".to_string(),
            Self::Url => "URL".to_string(),
            Self::Array(inner) => format!("[{}]", inner.render()),
            Self::Dictionary(value) => format!("[String: {}]", value.render()),
            Self::Named(name) => name.clone(),
            Self::Json => "AnyJSON".to_string(),
        }
    }

    /// A lowercase stem for naming a union variant holding this type.
    pub fn variant_stem(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::String => "string",
            Self::Date => "date",
            Self::Url => "url",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "map",
            Self::Named(name) => name,
            Self::Json => "json",
        }
    }
}

/// Documentation attached to a declaration or field.
#[derive(Debug, Clone, Default)]
pub struct Doc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub example: Option<serde_json::Value>,
}

impl Doc {
    pub fn from_meta(meta: &SchemaMeta) -> Self {
        Self {
            title: meta.title.clone(),
            description: meta.description.clone(),
            example: meta.example.clone(),
        }
    }
}

/// One stored property of a record.
///
/// `identifier` is a valid Swift identifier; `wire_key` is the original
/// schema property name verbatim. When the two differ (ignoring backtick
/// escaping) the emitted declaration carries a CodingKeys table.
#[derive(Debug, Clone)]
pub struct Field {
    pub identifier: String,
    pub wire_key: String,
    pub ty: SwiftType,
    pub optional: bool,
    pub doc: Doc,
}

impl Field {
    /// Whether the identifier maps back to the wire key without an explicit
    /// CodingKeys entry. Backticks only escape, they do not rename.
    pub fn matches_wire_key(&self) -> bool {
        self.identifier.trim_matches('`') == self.wire_key
    }
}

/// One case of an enumeration, with its wire value kept verbatim.
#[derive(Debug, Clone)]
pub struct EnumCase {
    pub identifier: String,
    pub wire_value: String,
}

/// One variant of a tagged union or open composite.
#[derive(Debug, Clone)]
pub struct Variant {
    pub identifier: String,
    pub payload: SwiftType,
}

/// A standalone compiled declaration.
#[derive(Debug, Clone)]
pub enum CompiledType {
    /// Transparent rename of a simple type; never carries children.
    Alias {
        name: String,
        doc: Doc,
        target: SwiftType,
    },
    /// A product type.
    Record {
        name: String,
        doc: Doc,
        fields: Vec<Field>,
        nested: Vec<CompiledType>,
    },
    /// A closed set of string raw values.
    Enumeration {
        name: String,
        doc: Doc,
        cases: Vec<EnumCase>,
    },
    /// oneOf: exactly one variant holds at decode time, first match wins.
    TaggedUnion {
        name: String,
        doc: Doc,
        variants: Vec<Variant>,
        nested: Vec<CompiledType>,
    },
    /// anyOf: any subset of variants may decode; all independently optional.
    OpenComposite {
        name: String,
        doc: Doc,
        variants: Vec<Variant>,
        nested: Vec<CompiledType>,
    },
}

impl CompiledType {
    pub fn name(&self) -> &str {
        match self {
            Self::Alias { name, .. }
            | Self::Record { name, .. }
            | Self::Enumeration { name, .. }
            | Self::TaggedUnion { name, .. }
            | Self::OpenComposite { name, .. } => name,
        }
    }
}
