//! Error kinds produced while compiling schemas.

use thiserror::Error;

/// Failure compiling a schema node.
///
/// `UnresolvedReference` and `UnsupportedFeature` abort the enclosing
/// top-level schema; `UnsupportedSchemaShape` and `MissingArrayItemType` are
/// contained at the field or array node that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A `$ref` names a component schema that does not exist.
    #[error("unresolved reference to component schema `{name}`")]
    UnresolvedReference { name: String },

    /// The schema uses a feature with no representation here (external
    /// references, reference cycles without structure).
    #[error("unsupported feature: {detail}")]
    UnsupportedFeature { detail: String },

    /// The schema shape cannot be rendered as a type at this position.
    #[error("unsupported schema shape: {detail}")]
    UnsupportedSchemaShape { detail: String },

    /// An array schema carries no item schema.
    #[error("array schema has no item schema")]
    MissingArrayItemType,
}

impl CompileError {
    /// Whether this failure must abort the whole top-level schema, as
    /// opposed to being contained at field granularity.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. } | Self::UnsupportedFeature { .. }
        )
    }
}
