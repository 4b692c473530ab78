//! Fixer configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ctxfix_graph::{EdgePolicy, EntryPoints, DEFAULT_MAX_NODES};
use serde::{Deserialize, Serialize};

use crate::{FixError, Result};

/// The two-part callee whose placeholder argument is being repaired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentinel {
    pub qualifier: String,
    pub name: String,
}

impl Default for Sentinel {
    fn default() -> Self {
        Self {
            qualifier: "context".to_string(),
            name: "WithCancel".to_string(),
        }
    }
}

/// The value threaded through every function of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    /// Parameter and local name
    pub name: String,
    /// Parameter type
    pub ty: String,
    /// Initializer used when the token is created as a local
    pub init: String,
}

impl Default for TokenSpec {
    fn default() -> Self {
        Self {
            name: "ctx".to_string(),
            ty: "context.Context".to_string(),
            init: "context.Background()".to_string(),
        }
    }
}

/// How the outermost function of a chain gets the token when it is not an
/// entry point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFallback {
    /// Add the token parameter; callers outside the chain must then pass it
    #[default]
    Parameter,
    /// Create the token locally, as at an entry point
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    pub sentinel: Sentinel,
    /// Identifier standing in for the missing token
    pub placeholder: String,
    pub token: TokenSpec,
    pub entry_points: EntryPoints,
    pub source_fallback: SourceFallback,
    pub policy: EdgePolicy,
    /// Source file suffix
    pub suffix: String,
    /// Package path prefix of the root directory; read from `go.mod` when unset
    pub module: Option<String>,
    /// JSON call graph dump; the graph is built from source when unset
    pub call_graph: Option<PathBuf>,
    /// Commands run on each modified file; `{file}` is replaced by its path
    pub formatters: Vec<String>,
    pub format_timeout_ms: u64,
    pub max_tree_nodes: usize,
    pub dry_run: bool,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            sentinel: Sentinel::default(),
            placeholder: "nil".to_string(),
            token: TokenSpec::default(),
            entry_points: EntryPoints::default(),
            source_fallback: SourceFallback::default(),
            policy: EdgePolicy::default(),
            suffix: ".go".to_string(),
            module: None,
            call_graph: None,
            formatters: vec!["gofmt -w {file}".to_string(), "goimports -w {file}".to_string()],
            format_timeout_ms: 1000,
            max_tree_nodes: DEFAULT_MAX_NODES,
            dry_run: false,
        }
    }
}

impl FixerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| FixError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| FixError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.token.name) {
            return Err(FixError::Config(format!(
                "token name `{}` is not an identifier",
                self.token.name
            )));
        }
        if !is_identifier(&self.placeholder) {
            return Err(FixError::Config(format!(
                "placeholder `{}` is not an identifier",
                self.placeholder
            )));
        }
        if self.sentinel.qualifier.is_empty() || self.sentinel.name.is_empty() {
            return Err(FixError::Config("sentinel needs a qualifier and a name".into()));
        }
        if self.max_tree_nodes == 0 {
            return Err(FixError::Config("max_tree_nodes must be positive".into()));
        }
        Ok(())
    }

    pub fn format_timeout(&self) -> Duration {
        Duration::from_millis(self.format_timeout_ms)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_default() {
        let config: FixerConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, FixerConfig::default());
        assert_eq!(config.token.name, "ctx");
        assert_eq!(config.sentinel.qualifier, "context");
        assert_eq!(config.format_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"source_fallback": "local", "policy": {{"limit": ["example.com/app"]}}, "dry_run": true}}"#
        )
        .expect("write");

        let config = FixerConfig::load(file.path()).expect("load");
        assert_eq!(config.source_fallback, SourceFallback::Local);
        assert_eq!(config.policy.limit, vec!["example.com/app".to_string()]);
        assert!(config.policy.exclude_synthetic);
        assert!(config.dry_run);
    }

    #[test]
    fn test_validate_rejects_bad_token_name() {
        let mut config = FixerConfig::default();
        config.token.name = "my ctx".into();
        assert!(matches!(config.validate(), Err(FixError::Config(_))));
    }
}
