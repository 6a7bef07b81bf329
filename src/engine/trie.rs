//! The pattern trie.
//!
//! All patterns are merged into one rooted tree. Each edge is keyed by an
//! interned token symbol; the full literal token text keys the edge, so the
//! `#` and `^` wildcards are distinct edges and `$WORD` is a distinct edge
//! from `WORD`. Patterns sharing a token prefix share the node chain for
//! that prefix.
//!
//! Nodes live in an arena (`Vec<Node>`), so ownership is strictly top-down:
//! the trie owns every node, children are plain indices, and the parent
//! back-reference is a non-owning index used only to tell the root apart.
//! Index 0 is always the root.
//!
//! The trie is built once during the build phase and read-only afterwards;
//! every query-phase method takes `&self`.

use super::interner::{Sym, WordSet};
use crate::{CategoryId, KindSet, NodeKind};
use std::collections::HashMap;

/// Arena index of a node. The root is always `0`.
pub(crate) type NodeId = usize;

#[derive(Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    /// Non-owning back-reference; `None` only for the root.
    pub parent: Option<NodeId>,
    pub children: HashMap<Sym, NodeId>,
    /// The category completed at this node, if any pattern ends here.
    pub terminal: Option<CategoryId>,
}

/// Pre-interned symbols for the four wildcard edge keys.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WildSyms {
    /// `#` (priority zero-or-more)
    pub pri_zero: Sym,
    /// `_` (priority one-or-more)
    pub pri_one: Sym,
    /// `^` (zero-or-more)
    pub zero: Sym,
    /// `*` (one-or-more)
    pub one: Sym,
}

#[derive(Debug)]
pub(crate) struct Trie {
    nodes: Vec<Node>,
    pub wild: WildSyms,
}

/// Error raised when a pattern ends on a node that already completes a
/// different category. The first inserted category keeps the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Collision {
    pub winner: CategoryId,
}

impl Trie {
    /// Create an empty trie, interning the wildcard symbols up front so the
    /// matcher never has to allocate to find them.
    pub fn new(words: &mut WordSet) -> Self {
        let wild = WildSyms {
            pri_zero: words.intern("#"),
            pri_one: words.intern("_"),
            zero: words.intern("^"),
            one: words.intern("*"),
        };
        let root = Node { kind: NodeKind::Root, parent: None, children: HashMap::new(), terminal: None };
        Trie { nodes: vec![root], wild }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Insert one tokenized pattern, attaching `category` to its terminal
    /// node. The walk is iterative; depth is bounded by the pattern length.
    ///
    /// Structurally idempotent: identical pattern text reaches the same node.
    /// If that node already completes a different category, the earlier one
    /// wins and the collision is reported to the caller.
    pub fn insert(&mut self, words: &WordSet, tokens: &[Sym], category: CategoryId) -> Result<(), Collision> {
        debug_assert!(!tokens.is_empty(), "empty patterns are rejected before insertion");
        let mut at = self.root();
        for &sym in tokens {
            at = match self.nodes[at].children.get(&sym).copied() {
                Some(child) => child,
                None => {
                    let kind = NodeKind::classify(words.resolve(sym));
                    let id = self.nodes.len();
                    self.nodes.push(Node { kind, parent: Some(at), children: HashMap::new(), terminal: None });
                    self.nodes[at].children.insert(sym, id);
                    id
                }
            };
        }
        match self.nodes[at].terminal {
            Some(winner) if winner != category => Err(Collision { winner }),
            _ => {
                self.nodes[at].terminal = Some(category);
                Ok(())
            }
        }
    }

    /// Total nodes excluding the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Total terminal nodes (complete patterns).
    pub fn terminal_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.terminal.is_some()).count()
    }

    /// Structural counters for introspection and tests.
    pub fn stats(&self, words: &WordSet) -> TrieStats {
        let mut wildcards = KindSet::empty();
        for node in &self.nodes {
            wildcards |= node.kind.flag();
        }

        // Depth via an explicit stack; the arena gives no depth directly.
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child in self.nodes[id].children.values() {
                stack.push((child, depth + 1));
            }
        }

        TrieStats {
            nodes: self.node_count(),
            terminals: self.terminal_count(),
            words: words.len(),
            max_depth,
            wildcards,
        }
    }
}

/// Structural counters over a built trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieStats {
    /// Total nodes, root excluded.
    pub nodes: usize,
    /// Nodes at which a complete pattern ends.
    pub terminals: usize,
    /// Unique words interned (wildcard symbols included).
    pub words: usize,
    /// Longest pattern in tokens.
    pub max_depth: usize,
    /// Wildcard and priority-word kinds present anywhere in the trie.
    pub wildcards: crate::KindSet,
}
