#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Compile OpenAPI component schemas into Swift Codable models.
//!
//! The pipeline is:
//! 1. Parse: the `components.schemas` JSON object -> [`SchemaTable`] (serde)
//! 2. Lower: raw schemas -> canonical schema nodes (nullability collapsed)
//! 3. Compile: schema nodes -> declaration trees, one per top-level schema
//! 4. Emit: declaration trees -> Swift source in lexicographic order
//!
//! Loading the surrounding document and writing files are the caller's
//! concern; this crate performs no I/O.

use rayon::prelude::*;
use tracing::{debug, warn};

pub mod document;
pub mod error;
pub mod ir;

pub use document::SchemaTable;
pub use error::CompileError;
pub use ir::context::Diagnostic;

use crate::ir::compile::Compiler;
use crate::ir::context::CompilationContext;
use crate::ir::emit::{ANY_JSON_DECL, Emit};
use crate::ir::naming::NameRules;
use crate::ir::node::SchemaSet;
use crate::ir::types::CompiledType;

/// Options controlling a generation run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Acronyms to upper-case in addition to the defaults.
    pub added_acronyms: Vec<String>,
    /// Default acronyms to stop upper-casing.
    pub ignored_acronyms: Vec<String>,
}

/// The result of one generation run.
#[derive(Debug)]
pub struct Generated {
    /// Swift source: one declaration per top-level schema in lexicographic
    /// order, plus the generic-JSON helper when some schema required it.
    pub source: String,
    /// Problems contained during compilation (dropped fields, aborted
    /// schemas). The output is well-formed even when this is non-empty.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile every named schema in the table into Swift declarations.
///
/// Schema content never fails the run as a whole: a schema that cannot
/// compile is skipped with a diagnostic and its siblings are unaffected.
pub fn generate(table: &SchemaTable, options: &Options) -> Generated {
    let set = SchemaSet::lower(table);
    let rules = NameRules::new(&options.added_acronyms, &options.ignored_acronyms);
    let compiler = Compiler::new(set.components(), &rules);
    let names = set.sorted_names();

    // Top-level schemas are independent: each call reads the shared
    // immutable table and writes only its own context, so they fan out
    // freely. The order-preserving collect keeps output deterministic
    // regardless of completion order.
    let compiled: Vec<(Vec<CompiledType>, CompilationContext)> = names
        .par_iter()
        .map(|name| {
            let mut ctx = CompilationContext::new();
            let Some(node) = set.get(name) else {
                return (Vec::new(), ctx);
            };
            match compiler.compile(&rules.type_name(name), node, 0, &mut ctx) {
                Ok(decls) => (decls, ctx),
                Err(err) => {
                    warn!(schema = *name, %err, "schema failed to compile");
                    ctx.push(Diagnostic {
                        schema: (*name).to_string(),
                        property: None,
                        message: err.to_string(),
                    });
                    (Vec::new(), ctx)
                }
            }
        })
        .collect();

    let mut merged = CompilationContext::new();
    let mut source = String::from("import Foundation\n");
    for (decls, ctx) in compiled {
        merged.merge(ctx);
        for decl in decls {
            source.push('\n');
            source.push_str(&decl.emit());
        }
    }
    if merged.needs_json_fallback() {
        source.push('\n');
        source.push_str(ANY_JSON_DECL);
    }

    let diagnostics = merged.into_diagnostics();
    debug!(
        schemas = names.len(),
        diagnostics = diagnostics.len(),
        "generated Swift declarations"
    );
    Generated {
        source,
        diagnostics,
    }
}
