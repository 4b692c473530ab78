//! Error types for locating and rewriting

use std::path::PathBuf;
use std::time::Duration;

use ctxfix_graph::GraphError;
use ctxfix_parser::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixError>;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A chain names a function that no file declares
    #[error("cannot resolve {function} in {path}")]
    GraphInconsistency { function: String, path: PathBuf },

    #[error("formatter `{command}` failed on {path}: {reason}")]
    Formatter {
        command: String,
        path: PathBuf,
        reason: String,
    },

    #[error("formatter `{command}` timed out after {timeout:?} on {path}")]
    FormatterTimeout {
        command: String,
        path: PathBuf,
        timeout: Duration,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
