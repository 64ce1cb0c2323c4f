//! Intermediate representation for schema-to-Swift compilation.
//!
//! The pipeline is layered so each stage stays testable on its own:
//! 1. Lowering: raw serde schema structs -> canonical [`node::SchemaNode`]s
//! 2. Compilation: schema nodes -> [`types::CompiledType`] declaration trees
//! 3. Emission: declaration trees -> Swift source via the [`emit::Emit`] trait
//!
//! All schema corner cases (nullability spellings, reference chains,
//! composition semantics) are resolved during lowering and compilation;
//! emission is purely mechanical string building.
//!
//! ## Module Structure
//!
//! - `node`: the lowered schema graph and the lowering pass
//! - `naming`: identifier normalization (casing, acronyms, reserved words)
//! - `resolve`: `$ref` resolution and the inlining policy
//! - `simple`: leaf schema kinds -> Swift primitive types
//! - `compile`: the structural compiler (records, enums, unions, aliases)
//! - `context`: per-run diagnostics and the generic-JSON fallback flag
//! - `types`: the compiled declaration tree
//! - `emit`: declaration trees -> Swift source strings

pub mod compile;
pub mod context;
pub mod emit;
pub mod naming;
pub mod node;
pub mod resolve;
pub mod simple;
pub mod types;
