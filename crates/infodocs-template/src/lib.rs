//! infodocs-template
//!
//! The directive interpreter for certificate templates. A template is plain
//! HTML with `{{...}}` directives:
//!
//! - `{{path}}` substitutes the value at a dotted path (`spa.name`).
//! - `{{#if path}} A {{else}} B {{/if}}` picks a branch by truthiness.
//! - `{{#each path}} ... {{/each}}` repeats its body per sequence item. A
//!   mapping item becomes the lookup scope of the body; a scalar item is
//!   available as `{{this}}`.
//!
//! Blocks nest. Lookups never fail: a missing value renders as an empty
//! string, and unknown or unbalanced tags are dropped from the output.

pub mod error;
mod eval;
mod lexer;
mod parser;
pub mod value;

pub use error::TemplateError;
pub use parser::Node;

use serde_json::Value;

/// Parse `source` into a node tree.
pub fn parse(source: &str) -> Result<Vec<Node>, TemplateError> {
    if source.trim().is_empty() {
        return Err(TemplateError::Empty);
    }
    Ok(parser::parse(lexer::tokenize(source)))
}

/// Render `source` against `context`.
pub fn render(source: &str, context: &Value) -> Result<String, TemplateError> {
    let nodes = parse(source)?;
    Ok(eval::render_nodes(&nodes, context))
}
