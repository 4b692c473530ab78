//! ctxfix Fixer - Locate key functions and thread the token through chains
//!
//! The pipeline scans a source tree, builds the call graph, finds every
//! function calling the sentinel with a placeholder argument, walks callers
//! back to entry points, and rewrites each chain so the token is created at
//! its source and passed down to the key function.

mod config;
mod error;
mod format;
pub mod locate;
mod pipeline;
mod report;
mod rewrite;
pub mod scan;
mod strip;
mod visit;
mod workspace;

pub use config::*;
pub use error::*;
pub use format::*;
pub use locate::{locate, KeyFunction};
pub use pipeline::*;
pub use report::*;
pub use rewrite::*;
pub use scan::{ScanFailure, ScanOutput};
pub use strip::*;
pub use visit::visit_calls_mut;
pub use workspace::*;
