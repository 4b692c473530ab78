//! Run diagnostics

use std::fmt;
use std::path::PathBuf;

use ctxfix_graph::{BuildStats, FunctionDescriptor};
use serde::Serialize;

use crate::{ChainReport, ChainStatus, ScanFailure};

/// Chains found for one key function and what happened to each
#[derive(Debug, Clone, Serialize)]
pub struct KeyReport {
    pub key: FunctionDescriptor,
    pub sites: usize,
    /// The reachability tree hit the node bound
    pub truncated: bool,
    pub chains: Vec<ChainReport>,
}

impl KeyReport {
    pub fn fixed(&self) -> impl Iterator<Item = &ChainReport> {
        self.chains
            .iter()
            .filter(|c| matches!(c.status, ChainStatus::Fixed | ChainStatus::AlreadyFixed))
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ChainReport> {
        self.chains
            .iter()
            .filter(|c| matches!(c.status, ChainStatus::Skipped | ChainStatus::Errored))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub fixed: usize,
    pub already_fixed: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl Tally {
    pub fn record(&mut self, status: ChainStatus) {
        match status {
            ChainStatus::Fixed => self.fixed += 1,
            ChainStatus::AlreadyFixed => self.already_fixed += 1,
            ChainStatus::Skipped => self.skipped += 1,
            ChainStatus::Errored => self.errored += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.fixed + self.already_fixed + self.skipped + self.errored
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FixReport {
    pub module: String,
    pub dry_run: bool,
    pub graph: BuildStats,
    pub keys: Vec<KeyReport>,
    pub scan_failures: Vec<ScanFailure>,
    /// Files written back (or that would be, in a dry run)
    pub modified: Vec<PathBuf>,
    pub format_failures: Vec<String>,
}

impl FixReport {
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for chain in self.keys.iter().flat_map(|k| &k.chains) {
            tally.record(chain.status);
        }
        tally
    }
}

impl fmt::Display for FixReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "{}: {} chains", key.key, key.chains.len())?;
            if key.truncated {
                write!(f, " (tree truncated)")?;
            }
            writeln!(f)?;
            for chain in key.fixed() {
                writeln!(f, "  fixed      {}", chain.chain)?;
            }
            for chain in key.unresolved() {
                let label = match chain.status {
                    ChainStatus::Errored => "errored",
                    _ => "skipped",
                };
                writeln!(f, "  {:<10} {}", label, chain.chain)?;
            }
        }

        for failure in &self.scan_failures {
            writeln!(f, "not parsed: {}: {}", failure.path.display(), failure.error)?;
        }
        for failure in &self.format_failures {
            writeln!(f, "not formatted: {}", failure)?;
        }

        let tally = self.tally();
        let verb = if self.dry_run { "would modify" } else { "modified" };
        write!(
            f,
            "{} fixed, {} already fixed, {} skipped, {} errored; {} {} files",
            tally.fixed,
            tally.already_fixed,
            tally.skipped,
            tally.errored,
            verb,
            self.modified.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxfix_graph::Chain;

    fn chain(status: ChainStatus, names: &[&str]) -> ChainReport {
        ChainReport {
            chain: Chain::new(
                names
                    .iter()
                    .map(|n| FunctionDescriptor::new("x.go", "p", *n))
                    .collect(),
            ),
            status,
            links: Vec::new(),
        }
    }

    #[test]
    fn test_tally_and_display() {
        let report = FixReport {
            keys: vec![KeyReport {
                key: FunctionDescriptor::new("x.go", "p", "K"),
                sites: 1,
                truncated: false,
                chains: vec![
                    chain(ChainStatus::Fixed, &["main", "K"]),
                    chain(ChainStatus::Skipped, &["Other", "K"]),
                ],
            }],
            modified: vec![PathBuf::from("x.go")],
            ..FixReport::default()
        };

        let tally = report.tally();
        assert_eq!(tally.fixed, 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.total(), 2);

        let text = report.to_string();
        assert!(text.contains("p.K: 2 chains"));
        assert!(text.contains("fixed      p.main -> p.K"));
        assert!(text.contains("skipped    p.Other -> p.K"));
        assert!(text.ends_with("1 fixed, 0 already fixed, 1 skipped, 0 errored; modified 1 files"));
    }
}
