extern crate self as patter;

#[macro_use]
mod macros;
mod api;
mod engine;
pub mod loader;

pub use api::{Engine, InsertError, MatchDetails, MatchError, MatchOutcome, Options, Session};
pub use engine::{MatchMetrics, TrieStats};
pub use loader::{LoadError, LoadReport};

// --- Internal types ---------------------------------------------------------

/// Rule identifier (index into the engine's category vector).
pub type CategoryId = usize;

/// Maximum number of wildcard spans a single match may record.
///
/// A successful match that would need more spans fails with
/// [`MatchError::CaptureOverflow`] instead of truncating silently.
pub const MAX_CAPTURE_SLOTS: usize = 8;

/// Classification of a trie node, checked in strict priority order during
/// search: `$word`, `#`, `_`, literal word, `^`, `*`.
///
/// The `#`/`_` pair outranks literal words and the `^`/`*` pair; within each
/// pair the zero-or-more form is tried first. `Root` exists only for the trie
/// root and is never matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `$WORD`: literal word with override priority over everything else.
    PriorityWord,
    /// `#`: zero or more tokens, tried before literal words.
    PriorityZeroPlus,
    /// `_`: one or more tokens, tried before literal words.
    PriorityOnePlus,
    /// Exact word match.
    Word,
    /// `^`: zero or more tokens, tried after literal words.
    ZeroPlus,
    /// `*`: one or more tokens, lowest priority.
    OnePlus,
    /// Sentinel for the trie root; never matched, never terminal.
    Root,
}

impl NodeKind {
    /// Classify a pattern token by its leading symbol.
    pub(crate) fn classify(token: &str) -> NodeKind {
        match token.chars().next() {
            Some('$') => NodeKind::PriorityWord,
            Some('#') => NodeKind::PriorityZeroPlus,
            Some('_') => NodeKind::PriorityOnePlus,
            Some('^') => NodeKind::ZeroPlus,
            Some('*') => NodeKind::OnePlus,
            _ => NodeKind::Word,
        }
    }

    /// True for the four wildcard kinds that may self-expand across tokens.
    pub(crate) fn is_wildcard(self) -> bool {
        matches!(
            self,
            NodeKind::PriorityZeroPlus | NodeKind::PriorityOnePlus | NodeKind::ZeroPlus | NodeKind::OnePlus
        )
    }

    /// The `KindSet` bit for this kind. Plain words and the root carry none.
    pub(crate) fn flag(self) -> KindSet {
        match self {
            NodeKind::PriorityWord => KindSet::PRIORITY_WORD,
            NodeKind::PriorityZeroPlus => KindSet::PRIORITY_ZERO_PLUS,
            NodeKind::PriorityOnePlus => KindSet::PRIORITY_ONE_PLUS,
            NodeKind::ZeroPlus => KindSet::ZERO_PLUS,
            NodeKind::OnePlus => KindSet::ONE_PLUS,
            NodeKind::Word | NodeKind::Root => KindSet::empty(),
        }
    }
}

bitflags::bitflags! {
    /// Tracks which non-word token kinds appear in a pattern or in the trie.
    ///
    /// Used for diagnostics and per-category metadata; matching itself always
    /// works on concrete trie edges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KindSet: u8 {
        const PRIORITY_WORD      = 1 << 0;
        const PRIORITY_ZERO_PLUS = 1 << 1;
        const PRIORITY_ONE_PLUS  = 1 << 2;
        const ZERO_PLUS          = 1 << 3;
        const ONE_PLUS           = 1 << 4;
    }
}

/// A graphed rule: the pattern that triggers it and the response template an
/// external renderer consumes. The engine never interprets the template.
#[derive(Debug, Clone)]
pub struct Category {
    /// Pattern text, whitespace-normalized but otherwise as loaded.
    pub pattern: String,
    /// Response template text, opaque to the engine.
    pub template: String,
    /// Topic this category was declared under, if any.
    pub topic: Option<String>,
    /// Wildcard and priority-word kinds appearing in the pattern.
    pub wildcards: KindSet,
}
