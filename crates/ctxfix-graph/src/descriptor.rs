//! Function descriptors

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A function located in a source file.
///
/// `name` is `Func` for free functions and `Receiver@Method` for methods.
/// Two descriptors are the same function when their qualified names match;
/// the file does not take part in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub file: PathBuf,
    pub package: String,
    pub name: String,
}

impl FunctionDescriptor {
    pub fn new(file: impl Into<PathBuf>, package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            package: package.into(),
            name: name.into(),
        }
    }

    /// `Package.Func` or `Package.Receiver@Method`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_method(&self) -> bool {
        self.name.contains('@')
    }

    pub fn receiver(&self) -> Option<&str> {
        self.name.split_once('@').map(|(recv, _)| recv)
    }

    /// The method half of `Receiver@Method`, or the plain function name
    pub fn method_name(&self) -> &str {
        self.name
            .split_once('@')
            .map(|(_, method)| method)
            .unwrap_or(&self.name)
    }

    /// Go exports identifiers that start with an upper-case letter
    pub fn is_exported(&self) -> bool {
        self.method_name().chars().next().is_some_and(|c| c.is_uppercase())
    }
}

impl PartialEq for FunctionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package && self.name == other.name
    }
}

impl Eq for FunctionDescriptor {}

impl Hash for FunctionDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for FunctionDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FunctionDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.package, &self.name).cmp(&(&other.package, &other.name))
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_file() {
        let a = FunctionDescriptor::new("a.go", "server", "Server@Run");
        let b = FunctionDescriptor::new("b.go", "server", "Server@Run");
        assert_eq!(a, b);
        assert_eq!(a.qualified_name(), "server.Server@Run");
    }

    #[test]
    fn test_method_parts() {
        let f = FunctionDescriptor::new("a.go", "server", "Server@Run");
        assert!(f.is_method());
        assert_eq!(f.receiver(), Some("Server"));
        assert_eq!(f.method_name(), "Run");
        assert!(f.is_exported());

        let g = FunctionDescriptor::new("a.go", "server", "helper");
        assert!(!g.is_method());
        assert_eq!(g.method_name(), "helper");
        assert!(!g.is_exported());
    }
}
