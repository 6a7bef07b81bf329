//! Search run metrics.
//!
//! A match call is pure computation, but a backtracking matcher can do wildly
//! different amounts of work for inputs of the same length. These counters
//! make that work visible:
//!
//! - `steps` is the number of frames the search popped; it is the quantity
//!   the step budget in [`crate::Options`] is enforced against.
//! - `frames` is the total number of alternatives pushed.
//! - `peak_stack` is the deepest the pending-alternative stack ever grew.
//!
//! Collection is cheap (plain integer bumps), so the hot path always records
//! them; callers that do not care simply ignore the `MatchDetails` they get
//! from the verbose entry point.

use std::time::Duration;

/// Work counters for a single match call.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchMetrics {
    /// Total elapsed wall-clock time.
    pub total: Duration,
    /// Frames popped from the search stack.
    pub steps: usize,
    /// Frames pushed onto the search stack.
    pub frames: usize,
    /// Peak size of the search stack.
    pub peak_stack: usize,
}
