//! Removal of canonical import comments (`package x // import "path"`)

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{FixError, Result};

const IMPORT_COMMENT: &str = r#" // import "([\s\S]*?)""#;

pub struct ImportCommentStripper {
    pattern: Regex,
}

impl ImportCommentStripper {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(IMPORT_COMMENT).map_err(|e| FixError::Config(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub fn strip<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, "")
    }

    /// Strip every file under `root` ending in `suffix`; returns the files
    /// that changed
    pub fn strip_tree(&self, root: &Path, suffix: &str, dry_run: bool) -> Result<Vec<PathBuf>> {
        let mut changed = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| FixError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() || !entry.file_name().to_string_lossy().ends_with(suffix) {
                continue;
            }

            let path = entry.path();
            let text = std::fs::read_to_string(path).map_err(|source| FixError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let Cow::Owned(stripped) = self.strip(&text) else {
                continue;
            };
            if !dry_run {
                std::fs::write(path, stripped).map_err(|source| FixError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            debug!("stripped import comment from {}", path.display());
            changed.push(path.to_path_buf());
        }
        info!("{} files with import comments", changed.len());
        Ok(changed)
    }
}

/// Strip canonical import comments from every source file under `root`
pub fn strip_import_comments(root: &Path, suffix: &str, dry_run: bool) -> Result<Vec<PathBuf>> {
    ImportCommentStripper::new()?.strip_tree(root, suffix, dry_run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_text() {
        let stripper = ImportCommentStripper::new().expect("regex");
        assert_eq!(
            stripper.strip("package server // import \"example.com/app/server\"\n"),
            "package server\n"
        );
        assert!(matches!(stripper.strip("package server\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_tree() {
        let dir = tempfile::tempdir().expect("temp dir");
        let with = dir.path().join("a.go");
        let without = dir.path().join("b.go");
        let other = dir.path().join("notes.txt");
        std::fs::write(&with, "package a // import \"x/a\"\n\nfunc F() {}\n").expect("write");
        std::fs::write(&without, "package a\n").expect("write");
        std::fs::write(&other, "package a // import \"x/a\"\n").expect("write");

        let dry = strip_import_comments(dir.path(), ".go", true).expect("dry run");
        assert_eq!(dry, vec![with.clone()]);
        assert!(std::fs::read_to_string(&with).expect("read").contains("// import"));

        let changed = strip_import_comments(dir.path(), ".go", false).expect("strip");
        assert_eq!(changed, vec![with.clone()]);
        assert_eq!(
            std::fs::read_to_string(&with).expect("read"),
            "package a\n\nfunc F() {}\n"
        );
        assert!(std::fs::read_to_string(&other).expect("read").contains("// import"));
    }
}
