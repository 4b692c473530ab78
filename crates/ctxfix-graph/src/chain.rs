//! Chains: root-to-terminal paths of a reachability tree

use std::fmt;

use serde::Serialize;

use crate::{FunctionDescriptor, ReachabilityTree};

/// Functions from the outermost caller down to the key function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Chain {
    functions: Vec<FunctionDescriptor>,
}

impl Chain {
    pub fn new(functions: Vec<FunctionDescriptor>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    /// The outermost function
    pub fn source(&self) -> Option<&FunctionDescriptor> {
        self.functions.first()
    }

    pub fn key(&self) -> Option<&FunctionDescriptor> {
        self.functions.last()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

/// One chain per terminal node, in depth-first order
pub fn enumerate(tree: &ReachabilityTree) -> Vec<Chain> {
    let mut chains = Vec::new();
    if tree.is_empty() {
        return chains;
    }

    let mut stack = vec![0usize];
    while let Some(index) = stack.pop() {
        let Some(node) = tree.node(index) else {
            continue;
        };
        if node.is_terminal() {
            chains.push(Chain::new(tree.path_to_root(index).cloned().collect()));
        } else {
            stack.extend(node.children.iter().rev());
        }
    }
    chains
}
