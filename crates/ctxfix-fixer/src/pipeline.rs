//! The fix pipeline
//!
//! Phases run in order: scan (parallel) → call graph → reachability trees and
//! chains → rewrite (serial) → write and format.

use std::path::Path;

use ctxfix_graph::{
    build_with_stats, enumerate, BuildStats, CallGraph, CallGraphProvider, Chain,
    JsonGraphProvider, ReachabilityTree, SourceGraphProvider,
};
use tracing::info;

use crate::scan::{scan, ScanOutput};
use crate::{FixReport, FixerConfig, Formatter, KeyFunction, KeyReport, Result, Rewriter, Workspace};

/// Scan results plus the normalized call graph
#[derive(Debug)]
pub struct Analysis {
    pub scan: ScanOutput,
    pub graph: CallGraph,
    pub stats: BuildStats,
}

/// Chains leading to one key function
#[derive(Debug, Clone)]
pub struct KeyChains {
    pub key: KeyFunction,
    pub chains: Vec<Chain>,
    pub truncated: bool,
}

/// Scan `root` and build the filtered call graph
pub fn analyze(root: &Path, config: &FixerConfig) -> Result<Analysis> {
    config.validate()?;
    let mut scan = scan(root, config)?;

    let raw = match &config.call_graph {
        Some(path) => {
            info!("loading call graph from {}", path.display());
            JsonGraphProvider::new(path).call_graph()?
        }
        None => SourceGraphProvider::new(std::mem::take(&mut scan.summaries)).call_graph()?,
    };
    let (graph, stats) = build_with_stats(&config.entry_points, &raw, &config.policy)?;
    Ok(Analysis { scan, graph, stats })
}

/// Reachability tree and chains for every key function
pub fn key_chains(analysis: &Analysis, config: &FixerConfig) -> Vec<KeyChains> {
    analysis
        .scan
        .keys
        .iter()
        .map(|key| {
            let tree = ReachabilityTree::build(&key.function, &analysis.graph, config.max_tree_nodes);
            let chains = enumerate(&tree);
            info!("{}: {} chains", key.function, chains.len());
            KeyChains {
                key: key.clone(),
                chains,
                truncated: tree.is_truncated(),
            }
        })
        .collect()
}

/// Locate, rewrite, write back and format
pub fn run(root: &Path, config: &FixerConfig) -> Result<FixReport> {
    let analysis = analyze(root, config)?;
    let rewriter = Rewriter::new(config)?;
    let plans = key_chains(&analysis, config);

    let mut workspace = Workspace::new(root);
    let keys: Vec<KeyReport> = plans
        .into_iter()
        .map(|plan| KeyReport {
            chains: plan
                .chains
                .iter()
                .map(|chain| rewriter.fix_chain(&mut workspace, chain))
                .collect(),
            key: plan.key.function,
            sites: plan.key.sites,
            truncated: plan.truncated,
        })
        .collect();

    let modified = if config.dry_run {
        workspace.modified()
    } else {
        workspace.write()?
    };

    let format_failures = if config.dry_run {
        Vec::new()
    } else {
        Formatter::new(config.formatters.clone(), config.format_timeout())
            .format_all(modified.as_slice())
            .iter()
            .map(ToString::to_string)
            .collect()
    };

    let report = FixReport {
        module: analysis.scan.module,
        dry_run: config.dry_run,
        graph: analysis.stats,
        keys,
        scan_failures: analysis.scan.failures,
        modified,
        format_failures,
    };
    let tally = report.tally();
    info!(
        "{} chains: {} fixed, {} already fixed, {} skipped, {} errored",
        tally.total(),
        tally.fixed,
        tally.already_fixed,
        tally.skipped,
        tally.errored
    );
    Ok(report)
}
