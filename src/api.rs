use crate::engine::{self, MatchMetrics, TrieStats, WordSet};
use crate::{Category, CategoryId, KindSet, NodeKind};
use std::collections::HashMap;
use std::time::Instant;

/// Options that affect a single match call.
#[derive(Debug, Clone)]
pub struct Options {
    /// Step budget for one search: the maximum number of alternatives the
    /// matcher may explore before giving up with [`MatchError::Timeout`].
    /// Backtracking is worst-case exponential on adversarial input, so this
    /// is the safety valve against pathological utterances.
    pub max_steps: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_steps: 100_000 }
    }
}

/// Per-conversation state: named variable bindings and the capture-slot
/// buffer the matcher fills.
///
/// Owned by exactly one conversation; a match call fully resets the capture
/// buffer before use, so a session must never be shared between concurrent
/// matches. Variable bindings are opaque to the engine and exist for the
/// external template renderer.
#[derive(Debug, Clone)]
pub struct Session {
    variables: HashMap<String, String>,
    stars: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session { variables: HashMap::new(), stars: vec![String::new(); crate::MAX_CAPTURE_SLOTS] }
    }

    /// Bind a named variable for the renderer.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Look up a named variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// The capture slot at `slot` (0-based). Unfilled slots are empty.
    pub fn star(&self, slot: usize) -> &str {
        self.stars.get(slot).map(String::as_str).unwrap_or("")
    }

    /// All eight capture slots from the most recent match.
    pub fn stars(&self) -> &[String] {
        &self.stars
    }

    fn reset_stars(&mut self) {
        for star in &mut self.stars {
            star.clear();
        }
    }

    fn fill_stars(&mut self, captured: &[String]) {
        self.reset_stars();
        for (slot, text) in self.stars.iter_mut().zip(captured) {
            slot.clone_from(text);
        }
    }
}

/// A successful match: the winning rule and what its wildcards consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Handle of the matched category.
    pub category: CategoryId,
    /// The matched pattern text.
    pub pattern: String,
    /// The category's response template, for the external renderer.
    pub template: String,
    /// Wildcard capture texts in left-to-right match order.
    pub stars: Vec<String>,
}

/// Why a match call produced no outcome. All variants are recoverable; the
/// conversation driver decides what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Every branch was exhausted without reaching a terminal. A normal,
    /// expected outcome; callers typically fall back to a default rule.
    #[error("no pattern matches the input")]
    NoMatch,
    /// The winning pattern needed more than [`crate::MAX_CAPTURE_SLOTS`]
    /// wildcard spans.
    #[error("match required {spans} wildcard captures, limit is {}", crate::MAX_CAPTURE_SLOTS)]
    CaptureOverflow { spans: usize },
    /// The step budget ran out before the search finished.
    #[error("match aborted after {steps} search steps")]
    Timeout { steps: usize },
}

/// Why a category could not be added to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    /// The pattern text tokenized to nothing.
    #[error("pattern is empty")]
    EmptyPattern,
    /// Another category already ends at the same trie node. The earlier one
    /// keeps it; the new category is dropped.
    #[error("pattern collides with category {winner}, which wins")]
    TerminalCollision { winner: CategoryId },
}

/// Extra details from [`Engine::match_verbose`]: the normalized tokens the
/// matcher saw and the work counters for the run.
#[derive(Debug, Clone)]
pub struct MatchDetails {
    pub tokens: Vec<String>,
    pub budget: usize,
    pub metrics: MatchMetrics,
}

/// The graph master: every category's pattern merged into one shared trie.
///
/// Two strict phases. Build first: [`Engine::add_category`] (directly or via
/// [`crate::loader`]) interns words and grows the trie, single-threaded.
/// Query after: every match method takes `&self`, so independent
/// conversations may match concurrently without locking.
///
/// ```
/// use patter::{Engine, Options, Session};
///
/// let mut engine = Engine::new();
/// engine.add_category("MY NAME IS *", "Nice to meet you, <star/>.").unwrap();
///
/// let mut session = Session::new();
/// let out = engine.match_utterance("my name is Ada", &mut session, &Options::default()).unwrap();
/// assert_eq!(out.stars, vec!["ADA".to_string()]);
/// ```
#[derive(Debug)]
pub struct Engine {
    words: WordSet,
    trie: engine::Trie,
    categories: Vec<Category>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let mut words = WordSet::new();
        let trie = engine::Trie::new(&mut words);
        Engine { words, trie, categories: Vec::new() }
    }

    /// Graph one `(pattern, template)` rule and return its handle.
    pub fn add_category(&mut self, pattern: &str, template: &str) -> Result<CategoryId, InsertError> {
        self.add(pattern, template, None)
    }

    /// Graph a rule declared under a named topic.
    pub fn add_category_in_topic(
        &mut self,
        pattern: &str,
        template: &str,
        topic: &str,
    ) -> Result<CategoryId, InsertError> {
        self.add(pattern, template, Some(topic))
    }

    fn add(&mut self, pattern: &str, template: &str, topic: Option<&str>) -> Result<CategoryId, InsertError> {
        let tokens = engine::tokenize_pattern(&mut self.words, pattern);
        if tokens.is_empty() {
            return Err(InsertError::EmptyPattern);
        }

        let id = self.categories.len();
        self.trie
            .insert(&self.words, &tokens, id)
            .map_err(|collision| InsertError::TerminalCollision { winner: collision.winner })?;

        let mut wildcards = KindSet::empty();
        for &sym in &tokens {
            wildcards |= NodeKind::classify(self.words.resolve(sym)).flag();
        }
        self.categories.push(Category {
            pattern: self.words_joined(&tokens),
            template: template.to_string(),
            topic: topic.map(str::to_string),
            wildcards,
        });
        Ok(id)
    }

    fn words_joined(&self, tokens: &[engine::Sym]) -> String {
        tokens.iter().map(|&s| self.words.resolve(s)).collect::<Vec<_>>().join(" ")
    }

    /// The category behind a handle returned by a match or an insert.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Number of graphed categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Structural counters over the trie.
    pub fn stats(&self) -> TrieStats {
        self.trie.stats(&self.words)
    }

    /// Match one utterance, filling `session`'s capture slots on success.
    pub fn match_utterance(
        &self,
        text: &str,
        session: &mut Session,
        options: &Options,
    ) -> Result<MatchOutcome, MatchError> {
        self.match_verbose(text, session, options).0
    }

    /// Match one utterance and also return tokens and work counters for
    /// debugging and profiling. The outcome is identical to
    /// [`Engine::match_utterance`].
    pub fn match_verbose(
        &self,
        text: &str,
        session: &mut Session,
        options: &Options,
    ) -> (Result<MatchOutcome, MatchError>, MatchDetails) {
        let start = Instant::now();
        let tokens = engine::tokenize_query(&self.words, text);
        session.reset_stars();

        let mut metrics = MatchMetrics::default();
        let result = engine::search(&self.trie, &tokens, options.max_steps, &mut metrics);
        metrics.total = start.elapsed();

        let outcome = result.map(|found| {
            let stars: Vec<String> = found
                .route
                .iter()
                .map(|span| {
                    tokens[span.start..span.end].iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ")
                })
                .collect();
            session.fill_stars(&stars);
            let category = &self.categories[found.category];
            MatchOutcome {
                category: found.category,
                pattern: category.pattern.clone(),
                template: category.template.clone(),
                stars,
            }
        });

        let details = MatchDetails {
            tokens: tokens.into_iter().map(|t| t.text).collect(),
            budget: options.max_steps,
            metrics,
        };
        (outcome, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_engine() -> Engine {
        let mut engine = Engine::new();
        for (pattern, template) in categories![
            "MY NAME IS *"  => "Nice to meet you.",
            "HOW ARE YOU"   => "Fine, thanks.",
            "$HELP #"       => "Help is on the way.",
        ] {
            engine.add_category(pattern, template).unwrap();
        }
        engine
    }

    #[test]
    fn session_slots_are_reset_and_filled_per_match() {
        let engine = seeded_engine();
        let mut session = Session::new();
        let options = Options::default();

        let out = engine.match_utterance("my name is Ada Lovelace", &mut session, &options).unwrap();
        assert_eq!(out.stars, vec!["ADA LOVELACE".to_string()]);
        assert_eq!(session.star(0), "ADA LOVELACE");
        assert_eq!(session.star(1), "");
        assert_eq!(session.stars().len(), crate::MAX_CAPTURE_SLOTS);

        // A later match without captures clears the earlier slots.
        engine.match_utterance("how are you", &mut session, &options).unwrap();
        assert_eq!(session.star(0), "");

        // A failed match also leaves the buffer reset.
        assert!(engine.match_utterance("nothing here", &mut session, &options).is_err());
        assert!(session.stars().iter().all(String::is_empty));
    }

    #[test]
    fn variables_are_opaque_to_matching() {
        let engine = seeded_engine();
        let mut session = Session::new();
        session.set_variable("name", "Ada");

        engine.match_utterance("how are you", &mut session, &Options::default()).unwrap();
        assert_eq!(session.variable("name"), Some("Ada"));
        assert_eq!(session.variable("missing"), None);
    }

    #[test]
    fn outcome_carries_template_and_normalized_pattern() {
        let engine = seeded_engine();
        let mut session = Session::new();

        let out = engine.match_utterance("HELP me please", &mut session, &Options::default()).unwrap();
        assert_eq!(out.pattern, "$HELP #");
        assert_eq!(out.template, "Help is on the way.");
        assert_eq!(out.stars, vec!["ME PLEASE".to_string()]);
        assert_eq!(engine.category(out.category).unwrap().template, out.template);
    }

    #[test]
    fn category_metadata_records_wildcard_kinds() {
        let engine = seeded_engine();
        assert_eq!(engine.category(0).unwrap().wildcards, KindSet::ONE_PLUS);
        assert_eq!(engine.category(1).unwrap().wildcards, KindSet::empty());
        assert_eq!(
            engine.category(2).unwrap().wildcards,
            KindSet::PRIORITY_WORD | KindSet::PRIORITY_ZERO_PLUS
        );
    }

    #[test]
    fn insert_rejects_empty_and_colliding_patterns() {
        let mut engine = seeded_engine();
        assert_eq!(engine.add_category("   ", "whatever"), Err(InsertError::EmptyPattern));
        assert_eq!(
            engine.add_category("how ARE you", "other"),
            Err(InsertError::TerminalCollision { winner: 1 })
        );
        // The rejected category got no handle.
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn verbose_match_reports_tokens_and_work() {
        let engine = seeded_engine();
        let mut session = Session::new();
        let (outcome, details) = engine.match_verbose("my name is Grace", &mut session, &Options::default());

        assert!(outcome.is_ok());
        assert_eq!(details.tokens, vec!["MY", "NAME", "IS", "GRACE"]);
        assert!(details.metrics.steps > 0);
        assert!(details.metrics.steps <= details.budget);
        assert!(details.metrics.peak_stack > 0);
    }

    #[test]
    fn concurrent_matches_share_one_engine() {
        let engine = std::sync::Arc::new(seeded_engine());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = std::sync::Arc::clone(&engine);
                std::thread::spawn(move || {
                    let mut session = Session::new();
                    let out = engine
                        .match_utterance("my name is Ada", &mut session, &Options::default())
                        .unwrap();
                    assert_eq!(out.stars, vec!["ADA".to_string()]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
