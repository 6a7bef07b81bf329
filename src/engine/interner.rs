//! Word interning.
//!
//! Every token that ever enters the engine (pattern words, wildcard symbols)
//! is stored once in a [`WordSet`] and referenced everywhere else by a cheap
//! [`Sym`]. Trie edges are keyed by `Sym`, so edge lookup is an integer hash
//! rather than a string compare, and two equal token strings always resolve
//! to the same entry.
//!
//! The set is append-only and scoped to one engine: it is populated during
//! the build phase (insertion) and only *read* during matching, which is what
//! makes concurrent query-phase matches safe without locking. A query token
//! that was never interned simply resolves to no symbol, and such a token can
//! only ever be consumed by a wildcard edge.

use std::collections::HashMap;

/// Interned word handle. Valid only for the `WordSet` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Sym(u32);

/// Append-only set of unique words.
#[derive(Debug, Default)]
pub(crate) struct WordSet {
    by_text: HashMap<Box<str>, Sym>,
    words: Vec<Box<str>>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing symbol if it is already known.
    pub fn intern(&mut self, text: &str) -> Sym {
        if let Some(&sym) = self.by_text.get(text) {
            return sym;
        }
        let sym = Sym(self.words.len() as u32);
        let owned: Box<str> = text.into();
        self.words.push(owned.clone());
        self.by_text.insert(owned, sym);
        sym
    }

    /// Read-only lookup. `None` means the word was never part of any pattern.
    pub fn lookup(&self, text: &str) -> Option<Sym> {
        self.by_text.get(text).copied()
    }

    /// The text behind a symbol.
    pub fn resolve(&self, sym: Sym) -> &str {
        &self.words[sym.0 as usize]
    }

    /// Number of unique words interned so far.
    pub fn len(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut words = WordSet::new();
        let a = words.intern("HELLO");
        let b = words.intern("WORLD");
        let c = words.intern("HELLO");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(words.len(), 2);
        assert_eq!(words.resolve(a), "HELLO");
        assert_eq!(words.resolve(b), "WORLD");
    }

    #[test]
    fn lookup_does_not_grow_the_set() {
        let mut words = WordSet::new();
        words.intern("HELLO");
        assert_eq!(words.lookup("HELLO"), Some(words.lookup("HELLO").unwrap()));
        assert_eq!(words.lookup("WORLD"), None);
        assert_eq!(words.len(), 1);
    }
}
