//! Error types for call graph loading and ingestion

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read call graph {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid call graph {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An edge names a function id the graph does not define
    #[error("edge references unknown function id {id}")]
    UnknownFunction { id: usize },

    #[error("function name `{name}` has no package qualifier")]
    UnqualifiedName { name: String },
}
