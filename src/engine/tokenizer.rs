//! Utterance and pattern tokenization.
//!
//! Both sides of the engine use the same normalization: fold to upper case
//! and split on whitespace. No punctuation or contraction handling is
//! performed; that gap is inherited from the pattern mini-language and must
//! not be papered over here, because patterns and utterances have to agree
//! on the exact token text.
//!
//! The two entry points differ only in how they treat the word set:
//!
//! - [`tokenize_pattern`] interns every token (build phase, `&mut WordSet`).
//! - [`tokenize_query`] resolves tokens read-only (query phase, `&WordSet`).
//!   Unknown words get no symbol and therefore can never take a literal
//!   edge; wildcards still consume them by position.

use super::interner::{Sym, WordSet};

/// Fold an utterance or pattern to the canonical case.
///
/// Note: uses `to_ascii_uppercase()` since the pattern mini-language is
/// ASCII-oriented. Locale-aware folding would have to change patterns and
/// queries together.
fn normalize(input: &str) -> String {
    input.to_ascii_uppercase()
}

/// Tokenize pattern text, interning each token.
pub(crate) fn tokenize_pattern(words: &mut WordSet, text: &str) -> Vec<Sym> {
    normalize(text).split_whitespace().map(|tok| words.intern(tok)).collect()
}

/// One normalized query token with its pre-resolved edge symbols.
///
/// `priority_sym` is the symbol for `$` + the token text, resolved once here
/// so the matcher does not allocate a lookup key at every node it visits.
#[derive(Debug, Clone)]
pub(crate) struct QueryToken {
    pub text: String,
    pub sym: Option<Sym>,
    pub priority_sym: Option<Sym>,
}

/// Tokenize an utterance against an immutable word set.
pub(crate) fn tokenize_query(words: &WordSet, text: &str) -> Vec<QueryToken> {
    normalize(text)
        .split_whitespace()
        .map(|tok| QueryToken {
            text: tok.to_string(),
            sym: words.lookup(tok),
            priority_sym: words.lookup(&format!("${tok}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_tokens_are_case_folded_and_interned() {
        let mut words = WordSet::new();
        let syms = tokenize_pattern(&mut words, "Hello   there *");
        assert_eq!(syms.len(), 3);
        assert_eq!(words.resolve(syms[0]), "HELLO");
        assert_eq!(words.resolve(syms[1]), "THERE");
        assert_eq!(words.resolve(syms[2]), "*");
        // Re-tokenizing reuses the same symbols.
        assert_eq!(tokenize_pattern(&mut words, "hello THERE"), vec![syms[0], syms[1]]);
    }

    #[test]
    fn query_tokens_resolve_without_interning() {
        let mut words = WordSet::new();
        tokenize_pattern(&mut words, "$HELLO WORLD");
        let before = words.len();

        let toks = tokenize_query(&words, "hello unknown");
        assert_eq!(words.len(), before);

        assert_eq!(toks[0].text, "HELLO");
        assert!(toks[0].sym.is_none()); // only "$HELLO" was ever interned
        assert!(toks[0].priority_sym.is_some());

        assert_eq!(toks[1].text, "UNKNOWN");
        assert!(toks[1].sym.is_none());
        assert!(toks[1].priority_sym.is_none());
    }
}
