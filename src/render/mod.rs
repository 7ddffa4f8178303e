//! Rendering module for converting parsed statements to output formats.

mod json;
mod text;
mod tree;

pub use json::{grammar_to_json, to_json, JsonFormat};
pub use text::to_ledger_text;
pub use tree::to_tree_text;
