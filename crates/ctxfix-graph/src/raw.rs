//! The raw call graph consumed from a whole-program analysis

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{names, FunctionDescriptor, GraphError};

/// A function node as reported by the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFunction {
    pub id: usize,
    /// Analysis node string, e.g. `(*example.com/app/server.Server).Run`
    pub name: String,
    /// Import path of the declaring package; empty for synthesized wrappers
    #[serde(default)]
    pub package_path: String,
    /// Name from the package clause
    #[serde(default)]
    pub package_name: String,
    /// Declaring file; `None` when the function has no source position
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub exported: bool,
    /// Compiler generated (wrappers, bound-method thunks)
    #[serde(default)]
    pub synthetic: bool,
    /// Declared in the standard library
    #[serde(default)]
    pub std: bool,
}

fn default_true() -> bool {
    true
}

impl RawFunction {
    /// The descriptor this node is known by after ingestion
    pub fn descriptor(&self) -> Result<FunctionDescriptor, GraphError> {
        let name = match names::short_name_in(&self.name, &self.package_path) {
            Some(name) => name,
            None => names::short_name(&self.name)?.1,
        };
        let package = if self.package_name.is_empty() {
            names::short_name(&self.name)?.0
        } else {
            self.package_name.clone()
        };
        Ok(FunctionDescriptor::new(
            self.file.clone().unwrap_or_default(),
            package,
            name,
        ))
    }

    /// Whether the declaring file sits under a vendored dependency tree
    pub fn is_vendored(&self) -> bool {
        self.file
            .as_deref()
            .is_some_and(|f| f.components().any(|c| c.as_os_str() == "vendor"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub caller: usize,
    pub callee: usize,
    /// Call through a synthesized wrapper
    #[serde(default)]
    pub synthetic: bool,
}

/// Directed call edges between analysis nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCallGraph {
    pub functions: Vec<RawFunction>,
    pub edges: Vec<RawEdge>,
}

impl RawCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function, assigning it the next free id
    pub fn add_function(&mut self, mut function: RawFunction) -> usize {
        let id = self.functions.len();
        function.id = id;
        self.functions.push(function);
        id
    }

    pub fn add_edge(&mut self, caller: usize, callee: usize) {
        self.edges.push(RawEdge {
            caller,
            callee,
            synthetic: false,
        });
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let text = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| GraphError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Adjacency lookups; fails if an edge names an unknown function
    pub fn index(&self) -> Result<GraphIndex<'_>, GraphError> {
        let by_id: HashMap<usize, &RawFunction> =
            self.functions.iter().map(|f| (f.id, f)).collect();
        let mut incoming: HashMap<usize, Vec<&RawEdge>> = HashMap::new();
        let mut outgoing: HashMap<usize, Vec<&RawEdge>> = HashMap::new();

        for edge in &self.edges {
            for id in [edge.caller, edge.callee] {
                if !by_id.contains_key(&id) {
                    return Err(GraphError::UnknownFunction { id });
                }
            }
            outgoing.entry(edge.caller).or_default().push(edge);
            incoming.entry(edge.callee).or_default().push(edge);
        }

        Ok(GraphIndex {
            by_id,
            incoming,
            outgoing,
        })
    }
}

/// Borrowed adjacency view over a [`RawCallGraph`]
pub struct GraphIndex<'a> {
    by_id: HashMap<usize, &'a RawFunction>,
    incoming: HashMap<usize, Vec<&'a RawEdge>>,
    outgoing: HashMap<usize, Vec<&'a RawEdge>>,
}

impl<'a> GraphIndex<'a> {
    pub fn function(&self, id: usize) -> Option<&'a RawFunction> {
        self.by_id.get(&id).copied()
    }

    pub fn incoming(&self, id: usize) -> &[&'a RawEdge] {
        self.incoming.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn outgoing(&self, id: usize) -> &[&'a RawEdge] {
        self.outgoing.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Synthetic edges: explicit wrapper calls, callers without a package,
    /// or compiler generated callees
    pub fn is_synthetic(&self, edge: &RawEdge) -> bool {
        let caller = self.function(edge.caller);
        let callee = self.function(edge.callee);
        edge.synthetic
            || caller.map_or(true, |f| f.package_path.is_empty())
            || callee.map_or(true, |f| f.synthetic)
    }
}

/// Anything that can produce a raw call graph
pub trait CallGraphProvider {
    fn call_graph(&self) -> Result<RawCallGraph, GraphError>;
}

/// Reads a JSON dump written by an external analysis
pub struct JsonGraphProvider {
    path: PathBuf,
}

impl JsonGraphProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CallGraphProvider for JsonGraphProvider {
    fn call_graph(&self) -> Result<RawCallGraph, GraphError> {
        RawCallGraph::load(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DUMP: &str = r#"{
        "functions": [
            {"id": 0, "name": "example.com/app.main", "package_path": "example.com/app",
             "package_name": "main", "file": "main.go"},
            {"id": 1, "name": "(*example.com/app/server.Server).Run",
             "package_path": "example.com/app/server", "package_name": "server",
             "file": "server/server.go"}
        ],
        "edges": [{"caller": 0, "callee": 1}]
    }"#;

    #[test]
    fn test_load_json_dump() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(DUMP.as_bytes()).expect("write");

        let graph = JsonGraphProvider::new(file.path())
            .call_graph()
            .expect("load");
        assert_eq!(graph.functions.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.functions[0].exported);

        let run = graph.functions[1].descriptor().expect("descriptor");
        assert_eq!(run.qualified_name(), "server.Server@Run");
        assert_eq!(run.file, PathBuf::from("server/server.go"));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("write");
        let err = JsonGraphProvider::new(file.path()).call_graph().unwrap_err();
        assert!(matches!(err, GraphError::Json { .. }));
    }

    #[test]
    fn test_index_rejects_unknown_ids() {
        let mut graph = RawCallGraph::new();
        graph.add_edge(0, 7);
        assert!(matches!(
            graph.index(),
            Err(GraphError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_vendored_file() {
        let f = RawFunction {
            id: 0,
            name: "example.com/app/vendor/lib.F".into(),
            package_path: "example.com/app/vendor/lib".into(),
            package_name: "lib".into(),
            file: Some(PathBuf::from("app/vendor/lib/f.go")),
            exported: true,
            synthetic: false,
            std: false,
        };
        assert!(f.is_vendored());
    }

    #[test]
    fn test_generic_receiver_descriptor_uses_base_name() {
        let f = RawFunction {
            id: 0,
            name: "(*example.com/app/pool.Pool[T]).Drain".into(),
            package_path: "example.com/app/pool".into(),
            package_name: "pool".into(),
            file: Some(PathBuf::from("pool/pool.go")),
            exported: true,
            synthetic: false,
            std: false,
        };
        let descriptor = f.descriptor().expect("descriptor");
        assert_eq!(descriptor.qualified_name(), "pool.Pool@Drain");
    }
}
