//! Edge filter policy applied while the graph is built

use serde::{Deserialize, Serialize};

use crate::{GraphIndex, RawEdge, RawFunction};

/// Which edges of the raw graph reach the normalized graph.
///
/// Prefix lists match against package import paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePolicy {
    /// Drop edges touching the standard library
    pub exclude_std: bool,
    /// Drop edges through compiler-generated functions
    pub exclude_synthetic: bool,
    /// Drop edges whose callee is not exported
    pub exclude_unexported: bool,
    /// Keep only edges into, out of, or passing through this package
    pub focus: Option<String>,
    /// Edges touching these prefixes are kept regardless of `limit`/`ignore`
    pub include: Vec<String>,
    /// Both endpoints must be under one of these prefixes
    pub limit: Vec<String>,
    /// Edges touching these prefixes are dropped
    pub ignore: Vec<String>,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        Self {
            exclude_std: false,
            exclude_synthetic: true,
            exclude_unexported: false,
            focus: None,
            include: Vec::new(),
            limit: Vec::new(),
            ignore: Vec::new(),
        }
    }
}

/// Outcome of evaluating one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Keep,
    Vendored,
    NoPosition,
    Synthetic,
    Unfocused,
    Std,
    Unexported,
    OutsideLimit,
    Ignored,
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        *self == Verdict::Keep
    }
}

impl EdgePolicy {
    /// Decide whether `edge` belongs in the normalized graph.
    /// Checks run in a fixed order; the first that fails decides.
    pub fn evaluate(&self, index: &GraphIndex<'_>, edge: &RawEdge) -> Verdict {
        let (Some(caller), Some(callee)) = (index.function(edge.caller), index.function(edge.callee))
        else {
            return Verdict::NoPosition;
        };

        if caller.is_vendored() || callee.is_vendored() {
            return Verdict::Vendored;
        }
        if caller.file.is_none() || callee.file.is_none() {
            return Verdict::NoPosition;
        }

        if self.exclude_synthetic && index.is_synthetic(edge) {
            return Verdict::Synthetic;
        }

        if let Some(focus) = &self.focus {
            if !is_focused(index, caller, callee, focus) {
                return Verdict::Unfocused;
            }
        }

        if self.exclude_std && (caller.std || callee.std) {
            return Verdict::Std;
        }

        if self.exclude_unexported && !callee.exported {
            return Verdict::Unexported;
        }

        let included = !self.include.is_empty()
            && (matches_any(&self.include, caller) || matches_any(&self.include, callee));
        if !included {
            if !self.limit.is_empty()
                && (!matches_any(&self.limit, caller) || !matches_any(&self.limit, callee))
            {
                return Verdict::OutsideLimit;
            }
            if !self.ignore.is_empty()
                && (matches_any(&self.ignore, caller) || matches_any(&self.ignore, callee))
            {
                return Verdict::Ignored;
            }
        }

        Verdict::Keep
    }
}

fn matches_any(prefixes: &[String], function: &RawFunction) -> bool {
    prefixes
        .iter()
        .any(|p| function.package_path.starts_with(p.as_str()))
}

/// An edge is focused when either end is in the focus package, or when the
/// caller is called from the focus package and the callee calls back into it.
fn is_focused(index: &GraphIndex<'_>, caller: &RawFunction, callee: &RawFunction, focus: &str) -> bool {
    if caller.package_path == focus || callee.package_path == focus {
        return true;
    }

    let in_focus = |id: usize| index.function(id).is_some_and(|f| f.package_path == focus);
    let from_focused = index
        .incoming(caller.id)
        .iter()
        .any(|e| !index.is_synthetic(e) && in_focus(e.caller));
    let to_focused = index
        .outgoing(callee.id)
        .iter()
        .any(|e| !index.is_synthetic(e) && in_focus(e.callee));

    from_focused && to_focused
}
