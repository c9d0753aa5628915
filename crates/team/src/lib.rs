//! # Librarian Team
//!
//! The orchestration layer: task planning, specialist routing, context
//! budgeting, result compilation, and the processing session state machine
//! that ties them together.
//!
//! ## Architecture
//!
//! [`ProcessingSession`] drives one request through:
//! 1. [`TaskPlanner`] — free-text request into discrete categorized tasks
//! 2. [`SpecialistRouter`] — each task to its specialist, sequentially
//! 3. [`ContextBudgetTracker`] — running token accounting per session
//! 4. [`compiler`] — joined final output, or the first pending clarification
//!
//! Sessions suspended on a clarification persist across processes via
//! [`SnapshotStore`].

pub mod budget;
pub mod compiler;
pub mod planner;
pub mod session;
pub mod snapshot;
pub mod specialists;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use budget::ContextBudgetTracker;
pub use compiler::{CompileOutcome, compile, output_truncated};
pub use planner::{TaskPlanner, plan_with_keywords};
pub use session::{
    OrchestratorConfig, PendingClarification, ProcessingSession, SessionOutcome, SessionState,
};
pub use snapshot::{SessionSnapshot, SnapshotStore};
pub use specialists::{SpecialistProfile, SpecialistRouter, is_clarification, profile_for};
