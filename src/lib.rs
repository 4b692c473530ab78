//! ctxfix - Thread a cancellation context through Go call chains
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use ctxfix_ast as ast;
pub use ctxfix_fixer as fixer;
pub use ctxfix_graph as graph;
pub use ctxfix_lexer as lexer;
pub use ctxfix_parser as parser;
