//! Context budget tracking.
//!
//! Maintains a running estimate of tokens consumed and remaining per logical
//! session. Holds no cross-session memory; a fresh tracker is created for
//! every processing session.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Running token budget for one session.
///
/// Token estimates use the chars/4 proxy throughout. The budget is
/// considered exhausted once the remaining estimate falls below one
/// specialist's configured output ceiling, leaving no safety margin for
/// the next call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBudgetTracker {
    /// Total session budget, in tokens
    window_tokens: usize,

    /// Tokens consumed so far (prompts + responses)
    consumed_tokens: usize,

    /// Remaining estimate below this threshold means a continuation is due
    continuation_threshold: usize,

    /// Whether a continuation has been flagged for this session
    pub continuation_pending: bool,
}

impl ContextBudgetTracker {
    /// Create a tracker for a fresh session.
    pub fn new(window_tokens: usize, continuation_threshold: usize) -> Self {
        Self {
            window_tokens,
            consumed_tokens: 0,
            continuation_threshold,
            continuation_pending: false,
        }
    }

    /// Record one generation call by prompt and response size in characters.
    pub fn record(&mut self, prompt_chars: usize, response_chars: usize) {
        self.consumed_tokens += chars_to_tokens(prompt_chars) + chars_to_tokens(response_chars);
        if self.needs_continuation() && !self.continuation_pending {
            self.continuation_pending = true;
            warn!(
                consumed = self.consumed_tokens,
                remaining = self.remaining(),
                "Session budget nearly exhausted; continuation will be required"
            );
        }
    }

    /// Tokens consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed_tokens
    }

    /// Remaining token estimate.
    pub fn remaining(&self) -> usize {
        self.window_tokens.saturating_sub(self.consumed_tokens)
    }

    /// Whether the next specialist call no longer fits in the budget.
    pub fn needs_continuation(&self) -> bool {
        self.remaining() < self.continuation_threshold
    }
}

/// chars/4 proxy, rounded up. Same rounding as
/// `librarian_core::chunk::estimate_tokens` so the proxy stays consistent
/// with chunk token counts.
fn chars_to_tokens(chars: usize) -> usize {
    if chars == 0 {
        return 0;
    }
    (chars + 3) / 4
}

// Re-exported for callers that already hold text.
pub use librarian_core::chunk::estimate_tokens as estimate_text_tokens;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_has_full_budget() {
        let tracker = ContextBudgetTracker::new(50_000, 8_000);
        assert_eq!(tracker.remaining(), 50_000);
        assert!(!tracker.needs_continuation());
    }

    #[test]
    fn recording_reduces_remaining() {
        let mut tracker = ContextBudgetTracker::new(50_000, 8_000);
        tracker.record(4_000, 8_000); // 1000 + 2000 tokens
        assert_eq!(tracker.consumed(), 3_000);
        assert_eq!(tracker.remaining(), 47_000);
    }

    #[test]
    fn continuation_triggers_below_ceiling() {
        // remaining = 50,000; a 48,000-token response leaves 2,000 < 8,000
        let mut tracker = ContextBudgetTracker::new(50_000, 8_000);
        tracker.record(0, 192_000); // 192,000 chars = 48,000 tokens
        assert!(tracker.needs_continuation());
        assert!(tracker.continuation_pending);
    }

    #[test]
    fn continuation_boundary_is_strict() {
        let mut tracker = ContextBudgetTracker::new(50_000, 8_000);
        tracker.record(0, 168_000); // 42,000 tokens, remaining exactly 8,000
        assert!(!tracker.needs_continuation());

        tracker.record(0, 4); // one more token
        assert!(tracker.needs_continuation());
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let mut tracker = ContextBudgetTracker::new(1_000, 100);
        tracker.record(10_000, 10_000);
        assert_eq!(tracker.remaining(), 0);
    }

    #[test]
    fn estimate_text_tokens_matches_proxy() {
        assert_eq!(estimate_text_tokens("abcd"), 1);
        assert_eq!(estimate_text_tokens("abcde"), 2);
    }
}
