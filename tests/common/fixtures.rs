use std::fs;
use std::path::{Path, PathBuf};

use ctxfix_fixer::FixerConfig;
use tempfile::TempDir;

/// Path to a fixture project under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copy a fixture project into a fresh temporary directory
pub fn copy_fixture(name: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    copy_tree(&fixture_path(name), dir.path());
    dir
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("Failed to create directory");
    for entry in fs::read_dir(from).expect(&format!("Failed to read {}", from.display())) {
        let entry = entry.expect("Failed to read directory entry");
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("Failed to copy fixture file");
        }
    }
}

/// Write a file under `root`, creating parent directories
pub fn write_file(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, text).expect("Failed to write file");
}

pub fn read_file(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect(&format!("Failed to read {}", relative))
}

/// Default configuration without external formatters
pub fn test_config() -> FixerConfig {
    FixerConfig {
        formatters: Vec::new(),
        ..FixerConfig::default()
    }
}
