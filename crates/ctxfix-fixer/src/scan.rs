//! Parallel source scan
//!
//! Source files are grouped by directory (one Go package per directory) and
//! each package is parsed, summarized for the call graph and searched for key
//! functions on the rayon pool. Each task merges its results once under a
//! lock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ctxfix_graph::{package_path, summarize, FileSummary};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::locate::{locate_in_file, merge};
use crate::{FixError, FixerConfig, KeyFunction, Result};

/// A file the scan could not use
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ScanOutput {
    pub module: String,
    pub summaries: Vec<FileSummary>,
    pub keys: Vec<KeyFunction>,
    pub failures: Vec<ScanFailure>,
}

impl ScanOutput {
    fn append(&mut self, other: ScanOutput) {
        self.summaries.extend(other.summaries);
        self.keys.extend(other.keys);
        self.failures.extend(other.failures);
    }
}

/// Package path of `root`: the configured module, the `module` line of
/// `go.mod`, or the directory name
pub fn module_path(root: &Path, configured: Option<&str>) -> String {
    if let Some(module) = configured {
        return module.to_string();
    }
    if let Ok(go_mod) = std::fs::read_to_string(root.join("go.mod")) {
        let module = go_mod.lines().find_map(|line| {
            line.trim()
                .strip_prefix("module")
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(|rest| rest.trim().trim_matches('"').to_string())
        });
        if let Some(module) = module.filter(|m| !m.is_empty()) {
            return module;
        }
    }
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string())
}

fn skip_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

/// Source files under `root` grouped by directory, vendored trees and test
/// files excluded
pub fn package_dirs(root: &Path, suffix: &str) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>> {
    let test_suffix = format!("_test{}", suffix);
    let mut packages: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !skip_dir(e))
    {
        let entry = entry.map_err(|source| FixError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(suffix) || name.ends_with(&test_suffix) {
            continue;
        }
        let path = entry.into_path();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        packages.entry(dir).or_default().push(path);
    }
    Ok(packages)
}

fn scan_file(
    path: &Path,
    package_path: &str,
    config: &FixerConfig,
) -> Result<(FileSummary, Vec<KeyFunction>)> {
    let text = std::fs::read_to_string(path).map_err(|source| FixError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = ctxfix_parser::parse(&text).map_err(|source| FixError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((
        summarize(path, package_path, &file),
        locate_in_file(path, &file, config),
    ))
}

/// Parse every package under `root`. Files that fail to read or parse are
/// reported and skipped.
pub fn scan(root: &Path, config: &FixerConfig) -> Result<ScanOutput> {
    let module = module_path(root, config.module.as_deref());
    let packages = package_dirs(root, &config.suffix)?;
    info!("scanning {} packages of module {}", packages.len(), module);

    let merged = Mutex::new(ScanOutput::default());
    packages.par_iter().for_each(|(dir, files)| {
        let relative = dir.strip_prefix(root).unwrap_or(dir.as_path());
        let package = package_path(&module, relative);
        let mut local = ScanOutput::default();

        for path in files {
            match scan_file(path, &package, config) {
                Ok((summary, keys)) => {
                    local.summaries.push(summary);
                    local.keys.extend(keys);
                }
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    local.failures.push(ScanFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!("package {}: {} files", package, files.len());
        merged.lock().append(local);
    });

    let mut output = merged.into_inner();
    output.module = module;
    output.summaries.sort_by(|a, b| a.path.cmp(&b.path));
    output.failures.sort_by(|a, b| a.path.cmp(&b.path));
    output.keys = merge(std::mem::take(&mut output.keys));
    info!(
        "scanned {} files, {} key functions, {} failures",
        output.summaries.len(),
        output.keys.len(),
        output.failures.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, text: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, text).expect("write");
    }

    #[test]
    fn test_module_path_from_go_mod() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(dir.path(), "go.mod", "module example.com/app\n\ngo 1.21\n");
        assert_eq!(module_path(dir.path(), None), "example.com/app");
        assert_eq!(module_path(dir.path(), Some("other")), "other");
    }

    #[test]
    fn test_scan_skips_vendor_tests_and_broken_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path();
        write(root, "go.mod", "module example.com/app\n");
        write(root, "main.go", "package main\n\nfunc main() {\n\tserver.Start()\n}\n");
        write(root, "main_test.go", "package main\n\nfunc TestX() {}\n");
        write(
            root,
            "server/server.go",
            "package server\n\nfunc Start() {\n\tcontext.WithCancel(nil)\n}\n",
        );
        write(root, "vendor/lib/lib.go", "package lib\n\nfunc L() {\n\tcontext.WithCancel(nil)\n}\n");
        write(root, "broken/broken.go", "package broken\n\nfunc {\n");

        let output = scan(root, &FixerConfig::default()).expect("scan");
        assert_eq!(output.module, "example.com/app");
        assert_eq!(output.summaries.len(), 2);
        assert_eq!(output.summaries[1].package_path, "example.com/app/server");
        assert_eq!(output.keys.len(), 1);
        assert_eq!(output.keys[0].function.qualified_name(), "server.Start");
        assert_eq!(output.failures.len(), 1);
        assert!(output.failures[0].path.ends_with("broken/broken.go"));
    }
}
