//! ctxfix Graph - Call graph ingestion and reverse reachability
//!
//! This crate turns a raw call graph (from a JSON dump or from parsed source)
//! into normalized caller relations, then answers "which chains of callers
//! lead to this function" for the fixer.

mod chain;
mod descriptor;
mod entry;
mod error;
mod ingest;
pub mod names;
mod policy;
mod raw;
mod source;
mod tree;

pub use chain::*;
pub use descriptor::*;
pub use entry::*;
pub use error::*;
pub use ingest::*;
pub use policy::*;
pub use raw::*;
pub use source::*;
pub use tree::*;
