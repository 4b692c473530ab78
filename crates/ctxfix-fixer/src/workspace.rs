//! In-memory file texts for the rewrite phase
//!
//! Files are read on first use and every link edit replaces the current text.
//! Nothing touches the disk until [`Workspace::write`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ctxfix_ast::SourceFile;
use ctxfix_graph::FunctionDescriptor;
use tracing::debug;

use crate::{FixError, Result};

#[derive(Debug)]
struct FileText {
    original: String,
    current: String,
}

#[derive(Debug, Default)]
pub struct Workspace {
    root: PathBuf,
    files: BTreeMap<PathBuf, FileText>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    /// Absolute path of the file declaring `function`
    pub fn path_of(&self, function: &FunctionDescriptor) -> Result<PathBuf> {
        let file = function.file();
        if file.as_os_str().is_empty() {
            return Err(FixError::GraphInconsistency {
                function: function.qualified_name(),
                path: PathBuf::new(),
            });
        }
        Ok(if file.is_relative() {
            self.root.join(file)
        } else {
            file.to_path_buf()
        })
    }

    /// Current text of `path`, loading it on first use
    pub fn text(&mut self, path: &Path) -> Result<&str> {
        if !self.files.contains_key(path) {
            let text = std::fs::read_to_string(path).map_err(|source| FixError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            self.files.insert(
                path.to_path_buf(),
                FileText {
                    original: text.clone(),
                    current: text,
                },
            );
        }
        Ok(self
            .files
            .get(path)
            .map(|f| f.current.as_str())
            .unwrap_or_default())
    }

    /// Parse the current text of `path`
    pub fn source(&mut self, path: &Path) -> Result<SourceFile> {
        let text = self.text(path)?.to_string();
        ctxfix_parser::parse_source(path, text).map_err(|source| FixError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn update(&mut self, path: &Path, text: String) {
        if let Some(file) = self.files.get_mut(path) {
            file.current = text;
        }
    }

    /// Files whose text differs from what was read
    pub fn modified(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|(_, f)| f.current != f.original)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Write every modified file back; returns the paths written
    pub fn write(&self) -> Result<Vec<PathBuf>> {
        let modified = self.modified();
        for path in &modified {
            if let Some(file) = self.files.get(path) {
                std::fs::write(path, &file.current).map_err(|source| FixError::Write {
                    path: path.clone(),
                    source,
                })?;
                debug!("wrote {}", path.display());
            }
        }
        Ok(modified)
    }
}
