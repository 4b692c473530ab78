//! Normalized caller relations built from a raw call graph

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{EdgePolicy, EntryPoints, FunctionDescriptor, GraphError, RawCallGraph, Verdict};

/// A caller with its distinct callees, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerRelation {
    pub caller: FunctionDescriptor,
    pub callees: Vec<FunctionDescriptor>,
}

/// Caller relations keyed by the caller's qualified name.
///
/// Read-only once built; the reverse index answers "who calls F" for the
/// tree builder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallGraph {
    relations: BTreeMap<String, CallerRelation>,
    #[serde(skip)]
    callers: BTreeMap<String, BTreeSet<String>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `caller -> callee`. Self-calls and repeated edges are ignored;
    /// returns whether the edge was new.
    pub fn insert(&mut self, caller: FunctionDescriptor, callee: FunctionDescriptor) -> bool {
        if caller == callee {
            return false;
        }

        let caller_key = caller.qualified_name();
        let relation = self
            .relations
            .entry(caller_key.clone())
            .or_insert_with(|| CallerRelation {
                caller,
                callees: Vec::new(),
            });
        if relation.callees.contains(&callee) {
            return false;
        }

        self.callers
            .entry(callee.qualified_name())
            .or_default()
            .insert(caller_key);
        relation.callees.push(callee);
        true
    }

    pub fn relations(&self) -> impl Iterator<Item = &CallerRelation> {
        self.relations.values()
    }

    pub fn relation(&self, caller: &str) -> Option<&CallerRelation> {
        self.relations.get(caller)
    }

    /// Every caller with an edge into `callee`, ordered by qualified name
    pub fn callers_of<'a>(
        &'a self,
        callee: &FunctionDescriptor,
    ) -> impl Iterator<Item = &'a FunctionDescriptor> + 'a {
        self.callers
            .get(&callee.qualified_name())
            .into_iter()
            .flatten()
            .filter_map(move |key| self.relations.get(key))
            .map(|relation| &relation.caller)
    }

    pub fn contains_edge(&self, caller: &FunctionDescriptor, callee: &FunctionDescriptor) -> bool {
        self.relations
            .get(&caller.qualified_name())
            .is_some_and(|r| r.callees.contains(callee))
    }

    /// Number of callers
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.relations.values().map(|r| r.callees.len()).sum()
    }
}

/// What happened to the raw edges during [`build_with_stats`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub edges: usize,
    pub kept: usize,
    pub duplicates: usize,
    pub self_calls: usize,
    pub unreachable: usize,
    pub dropped: BTreeMap<Verdict, usize>,
}

/// Build the normalized graph, keeping only edges whose caller is reachable
/// from an entry point and that pass `policy`.
pub fn build(
    entry_points: &EntryPoints,
    raw: &RawCallGraph,
    policy: &EdgePolicy,
) -> Result<CallGraph, GraphError> {
    build_with_stats(entry_points, raw, policy).map(|(graph, _)| graph)
}

pub fn build_with_stats(
    entry_points: &EntryPoints,
    raw: &RawCallGraph,
    policy: &EdgePolicy,
) -> Result<(CallGraph, BuildStats), GraphError> {
    let index = raw.index()?;

    let mut descriptors: HashMap<usize, FunctionDescriptor> = HashMap::new();
    for function in &raw.functions {
        match function.descriptor() {
            Ok(descriptor) => {
                descriptors.insert(function.id, descriptor);
            }
            Err(e) => debug!("skipping node: {}", e),
        }
    }

    let reachable = reachable_from_entries(entry_points, raw, &descriptors);

    let mut graph = CallGraph::new();
    let mut stats = BuildStats::default();

    for edge in &raw.edges {
        stats.edges += 1;

        if let Some(reachable) = &reachable {
            if !reachable.contains(&edge.caller) {
                stats.unreachable += 1;
                continue;
            }
        }

        let verdict = policy.evaluate(&index, edge);
        if !verdict.is_keep() {
            *stats.dropped.entry(verdict).or_default() += 1;
            continue;
        }

        let (Some(caller), Some(callee)) = (descriptors.get(&edge.caller), descriptors.get(&edge.callee))
        else {
            continue;
        };

        if caller == callee {
            stats.self_calls += 1;
            continue;
        }

        if graph.insert(caller.clone(), callee.clone()) {
            debug!("call edge: {} -> {}", caller, callee);
            stats.kept += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    info!(
        "{}/{} edges kept across {} callers",
        stats.kept,
        stats.edges,
        graph.len()
    );
    Ok((graph, stats))
}

/// Raw node ids reachable from any entry point, or `None` to keep everything
fn reachable_from_entries(
    entry_points: &EntryPoints,
    raw: &RawCallGraph,
    descriptors: &HashMap<usize, FunctionDescriptor>,
) -> Option<HashSet<usize>> {
    if entry_points.is_empty() {
        return None;
    }

    let mut queue: VecDeque<usize> = raw
        .functions
        .iter()
        .filter(|f| descriptors.get(&f.id).is_some_and(|d| entry_points.matches(d)))
        .map(|f| f.id)
        .collect();

    if queue.is_empty() {
        warn!(
            "no function matches entry points {:?}; keeping every caller",
            entry_points.patterns()
        );
        return None;
    }

    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for edge in &raw.edges {
        outgoing.entry(edge.caller).or_default().push(edge.callee);
    }

    let mut seen: HashSet<usize> = queue.iter().copied().collect();
    while let Some(id) = queue.pop_front() {
        for &next in outgoing.get(&id).into_iter().flatten() {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    Some(seen)
}
