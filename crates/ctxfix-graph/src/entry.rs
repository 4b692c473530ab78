//! Program entry point patterns

use serde::{Deserialize, Serialize};

use crate::FunctionDescriptor;

/// Patterns naming the functions a program starts from.
///
/// A pattern is `package.Name`; the package half may be `*` to match any
/// package, as in `*.init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryPoints(Vec<String>);

impl Default for EntryPoints {
    fn default() -> Self {
        Self(vec!["main.main".to_string(), "*.init".to_string()])
    }
}

impl EntryPoints {
    pub fn new(patterns: Vec<String>) -> Self {
        Self(patterns)
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, function: &FunctionDescriptor) -> bool {
        self.0.iter().any(|pattern| match pattern.split_once('.') {
            Some((package, name)) => {
                (package == "*" || package == function.package) && name == function.name
            }
            None => pattern == &function.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let entries = EntryPoints::default();
        assert!(entries.matches(&FunctionDescriptor::new("main.go", "main", "main")));
        assert!(entries.matches(&FunctionDescriptor::new("db.go", "store", "init")));
        assert!(!entries.matches(&FunctionDescriptor::new("a.go", "server", "main")));
        assert!(!entries.matches(&FunctionDescriptor::new("a.go", "main", "Run")));
    }

    #[test]
    fn test_method_pattern() {
        let entries = EntryPoints::new(vec!["server.Server@Serve".into()]);
        assert!(entries.matches(&FunctionDescriptor::new("s.go", "server", "Server@Serve")));
    }
}
