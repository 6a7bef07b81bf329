//! Trie construction and matching engine.
//!
//! This module is the operational core of the crate. Everything else (the
//! loader, the public [`crate::Engine`] surface, the CLI) is glue around it.
//!
//! ## How the parts work together
//!
//! Building and querying are two strict phases:
//!
//! ```text
//! build phase (single-threaded, once at startup)
//!
//!   pattern text ── tokenizer::tokenize_pattern ──┐
//!                   (interns into WordSet)        │
//!                                                 v
//!                                         Trie::insert
//!                                           - classify token -> NodeKind
//!                                           - walk/create edge chain
//!                                           - mark terminal + category
//!
//! query phase (trie and word set immutable, concurrent matches safe)
//!
//!   utterance ── tokenizer::tokenize_query ──┐
//!                (read-only symbol lookup)   │
//!                                            v
//!                                    matcher::search
//!                                      - explicit-stack DFS
//!                                      - branch kinds in priority order
//!                                      - wildcard self-expansion
//!                                      - bounded capture route
//!                                            │
//!                                            v
//!                                 (CategoryId, capture spans)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `interner.rs`: the long-lived word set; pattern tokens and trie edges
//!   reference interned symbols, never re-allocated text.
//! - `tokenizer.rs`: case folding and whitespace splitting for patterns
//!   (interning) and queries (read-only resolution).
//! - `trie.rs`: arena-backed node graph, insertion, structural diagnostics.
//! - `matcher.rs`: the prioritized backtracking search.
//! - `metrics.rs`: timing and step counters for runs.
//!
//! ## Debugging
//!
//! Set `PATTER_DEBUG_MATCH=1` to print a trace of branch decisions during
//! search.

#[path = "engine/interner.rs"]
mod interner;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/tokenizer.rs"]
mod tokenizer;
#[path = "engine/trie.rs"]
mod trie;

pub(crate) use interner::{Sym, WordSet};
pub(crate) use matcher::search;
pub(crate) use tokenizer::{tokenize_pattern, tokenize_query};
pub(crate) use trie::Trie;

pub use metrics::MatchMetrics;
pub use trie::TrieStats;
