//! The backtracking matcher.
//!
//! A match is a depth-first search over the trie driven by a cursor into the
//! query tokens. At every node the branch kinds are tried in a fixed
//! priority order:
//!
//! ```text
//! tokens remaining                      end of input
//! ─────────────────────────            ─────────────────────────
//! 1. $<token>   consume 1              1. # edge    consume 0
//! 2. # edge     consume 0              2. ^ edge    consume 0
//! 3. _ edge     consume 1              3. terminal? -> success
//! 4. <token>    consume 1
//! 5. ^ edge     consume 0
//! 6. * edge     consume 1
//! 7. self-expansion (wildcard nodes only): consume 1, retry same node
//! ```
//!
//! Self-expansion is how a wildcard greedily grows across several tokens one
//! at a time, always after every deeper branch from the current node has
//! failed. The first terminal reached in this order is the match.
//!
//! ## Explicit stack
//!
//! The search uses a frame stack instead of native recursion, so adversarial
//! inputs cannot blow the call stack; alternatives are pushed in reverse
//! priority order and popped LIFO, which reproduces the recursive order
//! exactly. Each frame owns its capture route, so backtracking is simply
//! dropping a frame. Total work is capped by a caller-supplied step budget.
//!
//! ## Captures
//!
//! Every wildcard edge traversal appends one span to the route (empty for a
//! zero-or-more edge taken without consuming); self-expansion extends the
//! last span. A completed match with more than [`MAX_CAPTURE_SLOTS`] spans
//! fails with `CaptureOverflow` rather than truncating.
//!
//! Set `PATTER_DEBUG_MATCH=1` to trace every frame the search visits.

use super::metrics::MatchMetrics;
use super::tokenizer::QueryToken;
use super::trie::{NodeId, Trie};
use crate::{CategoryId, MAX_CAPTURE_SLOTS, MatchError};

/// Half-open token-index range a wildcard consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

/// A successful search: the completed category and its wildcard spans in
/// left-to-right match order.
#[derive(Debug, Clone)]
pub(crate) struct SearchOutcome {
    pub category: CategoryId,
    pub route: Vec<Span>,
}

/// One pending alternative: a trie position, a cursor into the query tokens,
/// and the wildcard spans recorded on the way here.
struct Frame {
    node: NodeId,
    cursor: usize,
    route: Vec<Span>,
}

/// Search step: either explore a frame or accept a terminal reached with the
/// whole input consumed. `Accept` is pushed below the trailing zero-or-more
/// alternatives so those are explored first, as the priority order demands.
enum Step {
    Enter(Frame),
    Accept { category: CategoryId, route: Vec<Span> },
}

/// Run the prioritized backtracking search.
///
/// Returns the first (highest-priority) terminal whose pattern consumes the
/// entire input, `NoMatch` if the stack drains, `Timeout` if `budget` frames
/// were popped without a result, or `CaptureOverflow` if the winning route
/// recorded too many wildcard spans.
pub(crate) fn search(
    trie: &Trie,
    tokens: &[QueryToken],
    budget: usize,
    metrics: &mut MatchMetrics,
) -> Result<SearchOutcome, MatchError> {
    let debug = std::env::var_os("PATTER_DEBUG_MATCH").is_some();

    let mut stack: Vec<Step> = vec![Step::Enter(Frame { node: trie.root(), cursor: 0, route: Vec::new() })];

    while let Some(step) = stack.pop() {
        let frame = match step {
            Step::Accept { category, route } => {
                if route.len() > MAX_CAPTURE_SLOTS {
                    return Err(MatchError::CaptureOverflow { spans: route.len() });
                }
                if debug {
                    eprintln!("[match:accept] category={category} spans={}", route.len());
                }
                return Ok(SearchOutcome { category, route });
            }
            Step::Enter(frame) => frame,
        };

        metrics.steps += 1;
        if metrics.steps > budget {
            return Err(MatchError::Timeout { steps: metrics.steps });
        }

        let node = trie.node(frame.node);
        if debug {
            let at = tokens.get(frame.cursor).map(|t| t.text.as_str()).unwrap_or("<end>");
            eprintln!("[match:visit] node={} kind={:?} cursor={} [{at}]", frame.node, node.kind, frame.cursor);
        }

        let before = stack.len();
        if frame.cursor == tokens.len() {
            // End of input: a trailing zero-or-more may still complete a
            // longer pattern, and takes precedence over this node's own
            // terminal. Pushed in reverse so `#` pops first.
            if let Some(category) = node.terminal {
                stack.push(Step::Accept { category, route: frame.route.clone() });
            }
            if let Some(&child) = node.children.get(&trie.wild.zero) {
                stack.push(enter_zero(child, &frame));
            }
            if let Some(&child) = node.children.get(&trie.wild.pri_zero) {
                stack.push(enter_zero(child, &frame));
            }
        } else {
            let token = &tokens[frame.cursor];

            // Alternatives pushed lowest-priority first so the pop order is
            // $token, #, _, literal, ^, *, then self-expansion.
            if node.kind.is_wildcard() {
                stack.push(self_expand(&frame));
            }
            if let Some(&child) = node.children.get(&trie.wild.one) {
                stack.push(enter_one(child, &frame));
            }
            if let Some(&child) = node.children.get(&trie.wild.zero) {
                stack.push(enter_zero(child, &frame));
            }
            if let Some(&child) = token.sym.and_then(|sym| node.children.get(&sym)) {
                stack.push(enter_word(child, &frame));
            }
            if let Some(&child) = node.children.get(&trie.wild.pri_one) {
                stack.push(enter_one(child, &frame));
            }
            if let Some(&child) = node.children.get(&trie.wild.pri_zero) {
                stack.push(enter_zero(child, &frame));
            }
            if let Some(&child) = token.priority_sym.and_then(|sym| node.children.get(&sym)) {
                stack.push(enter_word(child, &frame));
            }
        }

        metrics.frames += stack.len() - before;
        metrics.peak_stack = metrics.peak_stack.max(stack.len());
    }

    Err(MatchError::NoMatch)
}

/// Take a word-keyed edge (`$WORD` or literal): consume one token, no span.
fn enter_word(child: NodeId, frame: &Frame) -> Step {
    Step::Enter(Frame { node: child, cursor: frame.cursor + 1, route: frame.route.clone() })
}

/// Take a zero-or-more edge: no consumption, record an empty span that
/// self-expansion may later grow.
fn enter_zero(child: NodeId, frame: &Frame) -> Step {
    let mut route = frame.route.clone();
    route.push(Span { start: frame.cursor, end: frame.cursor });
    Step::Enter(Frame { node: child, cursor: frame.cursor, route })
}

/// Take a one-or-more edge: consume one token and open its span.
fn enter_one(child: NodeId, frame: &Frame) -> Step {
    let mut route = frame.route.clone();
    route.push(Span { start: frame.cursor, end: frame.cursor + 1 });
    Step::Enter(Frame { node: child, cursor: frame.cursor + 1, route })
}

/// Grow the current wildcard by one token and retry the same node.
fn self_expand(frame: &Frame) -> Step {
    let mut route = frame.route.clone();
    let span = route.last_mut().expect("wildcard frames always carry their own span");
    debug_assert_eq!(span.end, frame.cursor);
    span.end = frame.cursor + 1;
    Step::Enter(Frame { node: frame.node, cursor: frame.cursor + 1, route })
}

#[cfg(test)]
mod tests {
    use crate::{Engine, MatchError, Options, Session};

    fn build(patterns: &[&str]) -> Engine {
        let mut engine = Engine::new();
        for (id, pattern) in patterns.iter().enumerate() {
            let added = engine.add_category(pattern, &format!("t{id}")).unwrap();
            assert_eq!(added, id);
        }
        engine
    }

    fn matched(engine: &Engine, input: &str) -> Result<(usize, Vec<String>), MatchError> {
        let mut session = Session::new();
        engine
            .match_utterance(input, &mut session, &Options::default())
            .map(|out| (out.category, out.stars))
    }

    #[test]
    fn exact_patterns_round_trip() {
        let engine = build(&["HELLO THERE", "HELLO WORLD", "BYE"]);
        assert_eq!(matched(&engine, "hello world").unwrap().0, 1);
        assert_eq!(matched(&engine, "HELLO THERE").unwrap().0, 0);
        assert_eq!(matched(&engine, "Bye").unwrap().0, 2);
    }

    #[test]
    fn no_match_is_deterministic_and_does_not_mutate() {
        let engine = build(&["HELLO WORLD"]);
        let before = engine.stats();
        for _ in 0..3 {
            assert_eq!(matched(&engine, "SOMETHING ELSE"), Err(MatchError::NoMatch));
        }
        assert_eq!(engine.stats(), before);
        // Partial prefix is not a match either.
        assert_eq!(matched(&engine, "HELLO"), Err(MatchError::NoMatch));
    }

    #[test]
    fn priority_word_outranks_wildcards_and_literals() {
        // All three can match "HELLO WORLD"; $HELLO must win.
        let engine = build(&["_ *", "HELLO *", "$HELLO *"]);
        assert_eq!(matched(&engine, "HELLO WORLD").unwrap().0, 2);
    }

    #[test]
    fn priority_wildcards_outrank_literal_words() {
        let engine = build(&["HELLO *", "# *"]);
        assert_eq!(matched(&engine, "HELLO WORLD").unwrap().0, 1);

        let engine = build(&["HELLO *", "_ *"]);
        assert_eq!(matched(&engine, "HELLO WORLD").unwrap().0, 1);
    }

    #[test]
    fn literal_words_outrank_plain_wildcards() {
        let engine = build(&["* WORLD", "HELLO WORLD", "^ HELLO WORLD"]);
        assert_eq!(matched(&engine, "HELLO WORLD").unwrap().0, 1);
    }

    #[test]
    fn zero_or_more_matches_nothing() {
        let engine = build(&["# HELLO"]);
        let (id, stars) = matched(&engine, "HELLO").unwrap();
        assert_eq!(id, 0);
        assert_eq!(stars, vec![String::new()]);
    }

    #[test]
    fn zero_or_more_expands_over_leading_tokens() {
        let engine = build(&["# HELLO"]);
        let (_, stars) = matched(&engine, "A B HELLO").unwrap();
        assert_eq!(stars, vec!["A B".to_string()]);

        let engine = build(&["^ HELLO"]);
        assert_eq!(matched(&engine, "A B HELLO").unwrap().1, vec!["A B".to_string()]);
        assert_eq!(matched(&engine, "HELLO").unwrap().1, vec![String::new()]);
    }

    #[test]
    fn one_or_more_requires_a_token() {
        for pattern in ["_ HELLO", "* HELLO"] {
            let engine = build(&[pattern]);
            assert_eq!(matched(&engine, "A HELLO").unwrap().1, vec!["A".to_string()]);
            assert_eq!(matched(&engine, "HELLO"), Err(MatchError::NoMatch));
        }
    }

    #[test]
    fn captures_come_back_in_match_order() {
        let engine = build(&["* IS *"]);
        let (_, stars) = matched(&engine, "THE SKY IS BLUE TODAY").unwrap();
        assert_eq!(stars, vec!["THE SKY".to_string(), "BLUE TODAY".to_string()]);
    }

    #[test]
    fn wildcards_span_unknown_words() {
        // "QUUX" never appears in any pattern, so it has no interned symbol.
        let engine = build(&["I LIKE *"]);
        let (_, stars) = matched(&engine, "I LIKE QUUX").unwrap();
        assert_eq!(stars, vec!["QUUX".to_string()]);
    }

    #[test]
    fn trailing_zero_or_more_completes_at_end_of_input() {
        let engine = build(&["HELLO #"]);
        let (id, stars) = matched(&engine, "HELLO").unwrap();
        assert_eq!(id, 0);
        assert_eq!(stars, vec![String::new()]);
        assert_eq!(matched(&engine, "HELLO THERE FRIEND").unwrap().1, vec!["THERE FRIEND".to_string()]);

        // A trailing # branch is checked before this node's own terminal.
        let engine = build(&["HELLO", "HELLO #"]);
        assert_eq!(matched(&engine, "HELLO").unwrap().0, 1);
    }

    #[test]
    fn backtracking_retries_lower_priority_branches() {
        // "_ B" dead-ends on "A C"; the search must fall back to "* C".
        let engine = build(&["_ B", "* C"]);
        let (id, stars) = matched(&engine, "A C").unwrap();
        assert_eq!(id, 1);
        assert_eq!(stars, vec!["A".to_string()]);
    }

    #[test]
    fn wildcard_in_the_middle_spans_many_tokens() {
        let engine = build(&["MY NAME IS *", "MY * IS RED"]);
        let (id, stars) = matched(&engine, "MY FAVORITE CAR IS RED").unwrap();
        assert_eq!(id, 1);
        assert_eq!(stars, vec!["FAVORITE CAR".to_string()]);
    }

    #[test]
    fn nine_wildcard_spans_overflow() {
        let engine = build(&["* A * B * C * D * E * F * G * H *"]);
        let input = "x A x B x C x D x E x F x G x H x";
        assert_eq!(matched(&engine, input), Err(MatchError::CaptureOverflow { spans: 9 }));
    }

    #[test]
    fn eight_wildcard_spans_fit() {
        let engine = build(&["* A * B * C * D * E * F * G *"]);
        let (_, stars) = matched(&engine, "x A x B x C x D x E x F x G x").unwrap();
        assert_eq!(stars.len(), 8);
        assert!(stars.iter().all(|s| s == "X"));
    }

    #[test]
    fn exhausted_step_budget_times_out() {
        let engine = build(&["* * * * NEVER"]);
        let mut session = Session::new();
        let options = Options { max_steps: 16 };
        let err = engine
            .match_utterance("A B C D E F G H I J K L M", &mut session, &options)
            .unwrap_err();
        assert!(matches!(err, MatchError::Timeout { steps } if steps > 16));
    }

    #[test]
    fn empty_input_matches_nothing_but_pure_wildcards() {
        let engine = build(&["HELLO"]);
        assert_eq!(matched(&engine, ""), Err(MatchError::NoMatch));

        let engine = build(&["#"]);
        let (id, stars) = matched(&engine, "").unwrap();
        assert_eq!(id, 0);
        assert_eq!(stars, vec![String::new()]);
    }
}
