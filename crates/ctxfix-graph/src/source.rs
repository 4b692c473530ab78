//! A syntactic call graph built from parsed source
//!
//! Resolution is by name only:
//! - `F()` calls the function `F` of the same package
//! - `alias.F()` calls `F` in the scanned package the import points to
//! - `x.M()` calls every method named `M` declared in the same package, or
//!   when there is none, every scanned method named `M`
//!
//! Calls into packages outside the scanned tree produce no edge. Calls made
//! inside function literals belong to the enclosing declaration.

use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};

use ctxfix_ast::{walk_block, DeclarationKind, Expr, ExprKind, File};

use crate::{names, CallGraphProvider, GraphError, RawCallGraph, RawFunction};

/// The shape of a callee expression
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallSite {
    /// `F(...)`
    Local(String),
    /// `q.F(...)`; `q` is an import alias or a value
    Qualified { qualifier: String, name: String },
    /// `expr.M(...)` on anything other than a plain identifier
    Method(String),
}

#[derive(Debug, Clone)]
pub struct FunctionSummary {
    pub name: String,
    /// Receiver base type and whether it is a pointer
    pub receiver: Option<(String, bool)>,
    pub calls: BTreeSet<CallSite>,
}

impl FunctionSummary {
    /// `Func` or `Receiver@Method`
    pub fn key_name(&self) -> String {
        match &self.receiver {
            Some((ty, _)) => format!("{}@{}", ty, self.name),
            None => self.name.clone(),
        }
    }
}

/// What the graph builder needs to know about one file
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub path: PathBuf,
    pub package_path: String,
    pub package_name: String,
    /// Local import name to import path
    pub imports: HashMap<String, String>,
    pub functions: Vec<FunctionSummary>,
}

/// Import path of the package in `dir`, given the module path and the
/// directory relative to the module root
pub fn package_path(module: &str, relative_dir: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !module.is_empty() {
        parts.push(module.trim_end_matches('/').to_string());
    }
    parts.extend(relative_dir.components().filter_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    }));
    parts.join("/")
}

/// Collect declarations and call sites of a parsed file
pub fn summarize(path: &Path, package_path: &str, file: &File) -> FileSummary {
    let imports = file
        .imports
        .iter()
        .filter_map(|spec| spec.local_name().map(|name| (name.to_string(), spec.path.clone())))
        .collect();

    let functions = file
        .declarations
        .iter()
        .filter_map(|decl| match &decl.kind {
            DeclarationKind::Function(func) => Some(func),
            DeclarationKind::Other { .. } => None,
        })
        .map(|func| {
            let mut calls = BTreeSet::new();
            if let Some(body) = &func.body {
                walk_block(body, &mut |expr| {
                    if let Some(call) = expr.as_call() {
                        if let Some(site) = call_site(&call.callee) {
                            calls.insert(site);
                        }
                    }
                });
            }
            FunctionSummary {
                name: func.name.name.clone(),
                receiver: func
                    .receiver
                    .as_ref()
                    .map(|r| (r.type_name.clone(), r.pointer)),
                calls,
            }
        })
        .collect();

    FileSummary {
        path: path.to_path_buf(),
        package_path: package_path.to_string(),
        package_name: file.package.name.clone(),
        imports,
        functions,
    }
}

fn call_site(callee: &Expr) -> Option<CallSite> {
    match &callee.unparen().kind {
        ExprKind::Ident(name) => Some(CallSite::Local(name.clone())),
        ExprKind::Selector { object, field } => match object.unparen().as_ident() {
            Some(qualifier) => Some(CallSite::Qualified {
                qualifier: qualifier.to_string(),
                name: field.name.clone(),
            }),
            None => Some(CallSite::Method(field.name.clone())),
        },
        // Explicit instantiation: `F[int](x)`
        ExprKind::Index { object, .. } => call_site(object),
        _ => None,
    }
}

/// Builds a [`RawCallGraph`] from file summaries
#[derive(Debug, Default)]
pub struct SourceGraphProvider {
    files: Vec<FileSummary>,
}

impl SourceGraphProvider {
    pub fn new(files: Vec<FileSummary>) -> Self {
        Self { files }
    }

    pub fn add(&mut self, summary: FileSummary) {
        self.files.push(summary);
    }

    pub fn files(&self) -> &[FileSummary] {
        &self.files
    }
}

impl CallGraphProvider for SourceGraphProvider {
    fn call_graph(&self) -> Result<RawCallGraph, GraphError> {
        let mut raw = RawCallGraph::new();
        let mut by_key: HashMap<(&str, String), usize> = HashMap::new();
        let mut methods: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
        let mut any_methods: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut ids: Vec<Vec<usize>> = Vec::with_capacity(self.files.len());

        for file in &self.files {
            let mut file_ids = Vec::with_capacity(file.functions.len());
            for func in &file.functions {
                let receiver = func.receiver.as_ref().map(|(ty, ptr)| (ty.as_str(), *ptr));
                let id = raw.add_function(RawFunction {
                    id: 0,
                    name: names::node_name(&file.package_path, receiver, &func.name),
                    package_path: file.package_path.clone(),
                    package_name: file.package_name.clone(),
                    file: Some(file.path.clone()),
                    exported: func.name.chars().next().is_some_and(|c| c.is_uppercase()),
                    synthetic: false,
                    std: false,
                });
                by_key
                    .entry((file.package_path.as_str(), func.key_name()))
                    .or_insert(id);
                if func.receiver.is_some() {
                    methods
                        .entry((file.package_path.as_str(), func.name.as_str()))
                        .or_default()
                        .push(id);
                    any_methods.entry(func.name.as_str()).or_default().push(id);
                }
                file_ids.push(id);
            }
            ids.push(file_ids);
        }

        for (file, file_ids) in self.files.iter().zip(&ids) {
            let package = file.package_path.as_str();
            let method_targets = |name: &str| -> Vec<usize> {
                methods
                    .get(&(package, name))
                    .or_else(|| any_methods.get(name))
                    .cloned()
                    .unwrap_or_default()
            };
            for (func, &caller) in file.functions.iter().zip(file_ids) {
                for site in &func.calls {
                    let targets: Vec<usize> = match site {
                        CallSite::Local(name) => {
                            by_key.get(&(package, name.clone())).copied().into_iter().collect()
                        }
                        CallSite::Qualified { qualifier, name } => match file.imports.get(qualifier) {
                            Some(path) => by_key
                                .get(&(path.as_str(), name.clone()))
                                .copied()
                                .into_iter()
                                .collect(),
                            None => method_targets(name),
                        },
                        CallSite::Method(name) => method_targets(name),
                    };
                    for callee in targets {
                        raw.add_edge(caller, callee);
                    }
                }
            }
        }

        Ok(raw)
    }
}
