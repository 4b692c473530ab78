//! ctxfix AST - Syntax tree for Go source files
//!
//! This crate defines the node types produced by the parser, spans for
//! source locations, a printer for synthesized nodes, and [`SourceFile`],
//! which applies tree mutations as text edits on the original source.

mod span;
mod expr;
mod stmt;
mod decl;
mod printer;
mod source;
mod visit;

pub use span::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use printer::*;
pub use source::*;
pub use visit::*;
