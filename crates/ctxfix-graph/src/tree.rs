//! Reverse reachability trees
//!
//! The tree is rooted at a key function; the children of a node are the
//! functions that call it. Nodes live in an arena and point at their parent,
//! so a path back to the root is a walk up parent links.
//!
//! A caller is skipped only when it already appears on the path from the
//! current node to the root. The same function may therefore appear in
//! several branches (a diamond `M -> B -> K`, `M -> C -> K` puts `M` under
//! both `B` and `C`), which gives one chain per acyclic path.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::{CallGraph, FunctionDescriptor};

/// Default bound on the number of nodes in one tree
pub const DEFAULT_MAX_NODES: usize = 10_000;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub function: FunctionDescriptor,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
}

impl TreeNode {
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ReachabilityTree {
    nodes: Vec<TreeNode>,
    truncated: bool,
}

impl ReachabilityTree {
    /// Breadth-first expansion over callers of `key`
    pub fn build(key: &FunctionDescriptor, graph: &CallGraph, max_nodes: usize) -> Self {
        let mut tree = Self {
            nodes: vec![TreeNode {
                function: key.clone(),
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
            truncated: false,
        };

        let mut frontier = VecDeque::from([0usize]);
        'expand: while let Some(index) = frontier.pop_front() {
            let function = tree.nodes[index].function.clone();
            for caller in graph.callers_of(&function) {
                if tree.on_path(index, caller) {
                    debug!("cycle guard: {} already on path from {}", caller, key);
                    continue;
                }
                if tree.nodes.len() >= max_nodes {
                    tree.truncated = true;
                    break 'expand;
                }
                let child = tree.nodes.len();
                tree.nodes.push(TreeNode {
                    function: caller.clone(),
                    parent: Some(index),
                    children: Vec::new(),
                    depth: tree.nodes[index].depth + 1,
                });
                tree.nodes[index].children.push(child);
                frontier.push_back(child);
            }
        }

        if tree.truncated {
            warn!(
                "reachability tree for {} truncated at {} nodes",
                key, max_nodes
            );
        }
        tree
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether expansion stopped at the node bound
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Functions from `index` up to and including the root
    pub fn path_to_root(&self, index: usize) -> PathToRoot<'_> {
        PathToRoot {
            tree: self,
            next: Some(index),
        }
    }

    fn on_path(&self, index: usize, function: &FunctionDescriptor) -> bool {
        self.path_to_root(index).any(|f| f == function)
    }
}

/// Iterator over the ancestors of a node, the node itself first
pub struct PathToRoot<'a> {
    tree: &'a ReachabilityTree,
    next: Option<usize>,
}

impl<'a> Iterator for PathToRoot<'a> {
    type Item = &'a FunctionDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.nodes.get(self.next?)?;
        self.next = node.parent;
        Some(&node.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(name: &str) -> FunctionDescriptor {
        FunctionDescriptor::new(format!("{}.go", name), "p", name)
    }

    fn graph(edges: &[(&str, &str)]) -> CallGraph {
        let mut graph = CallGraph::new();
        for (caller, callee) in edges {
            graph.insert(f(caller), f(callee));
        }
        graph
    }

    #[test]
    fn test_root_only_when_uncalled() {
        let tree = ReachabilityTree::build(&f("K"), &CallGraph::new(), DEFAULT_MAX_NODES);
        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_terminal());
    }

    #[test]
    fn test_linear_chain() {
        let tree = ReachabilityTree::build(
            &f("K"),
            &graph(&[("Main", "B"), ("B", "K")]),
            DEFAULT_MAX_NODES,
        );
        assert_eq!(tree.len(), 3);
        let leaf = tree.nodes().iter().position(|n| n.is_terminal()).expect("leaf");
        let path: Vec<&str> = tree.path_to_root(leaf).map(|d| d.name.as_str()).collect();
        assert_eq!(path, vec!["Main", "B", "K"]);
    }

    #[test]
    fn test_cycle_terminates() {
        // A calls B, B calls A, A calls K
        let tree = ReachabilityTree::build(
            &f("K"),
            &graph(&[("A", "B"), ("B", "A"), ("A", "K")]),
            DEFAULT_MAX_NODES,
        );
        let names: Vec<&str> = tree.nodes().iter().map(|n| n.function.name.as_str()).collect();
        assert_eq!(names, vec!["K", "A", "B"]);
    }

    #[test]
    fn test_diamond_keeps_both_paths() {
        let tree = ReachabilityTree::build(
            &f("K"),
            &graph(&[("M", "B"), ("M", "C"), ("B", "K"), ("C", "K")]),
            DEFAULT_MAX_NODES,
        );
        let m_nodes = tree.nodes().iter().filter(|n| n.function.name == "M").count();
        assert_eq!(m_nodes, 2);
        assert_eq!(tree.root().children.len(), 2);
    }

    #[test]
    fn test_truncation() {
        let tree = ReachabilityTree::build(
            &f("K"),
            &graph(&[("A", "K"), ("B", "K"), ("C", "K")]),
            2,
        );
        assert!(tree.is_truncated());
        assert_eq!(tree.len(), 2);
    }
}
