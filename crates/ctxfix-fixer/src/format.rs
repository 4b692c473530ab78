//! External formatter invocation
//!
//! Each configured command runs once per modified file with a deadline; a
//! command still running at the deadline is killed.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::{FixError, Result};

#[derive(Debug, Clone)]
pub struct Formatter {
    commands: Vec<String>,
    timeout: Duration,
}

impl Formatter {
    pub fn new(commands: Vec<String>, timeout: Duration) -> Self {
        Self { commands, timeout }
    }

    /// Run every command on `path`, stopping at the first failure
    pub fn format(&self, path: &Path) -> Result<()> {
        for command in &self.commands {
            self.run(command, path)?;
        }
        Ok(())
    }

    /// Format each file; failures are logged and returned, never fatal
    pub fn format_all(&self, paths: &[impl AsRef<Path>]) -> Vec<FixError> {
        let mut failures = Vec::new();
        for path in paths {
            if let Err(e) = self.format(path.as_ref()) {
                warn!("{}", e);
                failures.push(e);
            }
        }
        failures
    }

    fn run(&self, command: &str, path: &Path) -> Result<()> {
        let file = path.to_string_lossy();
        let mut words = command.split_whitespace().map(|w| w.replace("{file}", &file));
        let Some(program) = words.next() else {
            return Ok(());
        };
        let fail = |reason: String| FixError::Formatter {
            command: command.to_string(),
            path: path.to_path_buf(),
            reason,
        };

        let mut child = Command::new(&program)
            .args(words)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| fail(e.to_string()))?;

        match child.wait_timeout(self.timeout).map_err(|e| fail(e.to_string()))? {
            Some(status) if status.success() => {
                debug!("{} {}", program, path.display());
                Ok(())
            }
            Some(status) => Err(fail(format!("exited with {}", status))),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(FixError::FormatterTimeout {
                    command: command.to_string(),
                    path: path.to_path_buf(),
                    timeout: self.timeout,
                })
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn formatter(command: &str, timeout_ms: u64) -> Formatter {
        Formatter::new(vec![command.to_string()], Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_success_and_file_substitution() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("a.go");
        std::fs::write(&path, "package a\n").expect("write");
        assert!(formatter("test -f {file}", 5000).format(&path).is_ok());
        assert!(matches!(
            formatter("test -d {file}", 5000).format(&path),
            Err(FixError::Formatter { .. })
        ));
    }

    #[test]
    fn test_missing_program_is_formatter_error() {
        let result = formatter("ctxfix-no-such-formatter {file}", 1000).format(Path::new("a.go"));
        assert!(matches!(result, Err(FixError::Formatter { .. })));
    }

    #[test]
    fn test_timeout_kills_process() {
        let result = formatter("sleep 5", 50).format(Path::new("a.go"));
        assert!(matches!(result, Err(FixError::FormatterTimeout { .. })));
    }

    #[test]
    fn test_format_all_collects_failures() {
        let f = Formatter::new(vec!["false".to_string()], Duration::from_secs(5));
        let failures = f.format_all(&[Path::new("a.go"), Path::new("b.go")]);
        assert_eq!(failures.len(), 2);
    }
}
