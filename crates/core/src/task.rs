//! Task and specialist domain types.
//!
//! A `Task` is one discrete unit of work produced by the planner, tagged with
//! the specialist category responsible for it. A `SpecialistResult` is the
//! outcome of routing one task through the generation capability.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The specialist responsible for a category of work.
///
/// New categories are new enum members plus a row in the specialist profile
/// table — no subclassing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistCategory {
    /// Summarization, extraction, key-point analysis
    TextAnalysis,
    /// Restructuring, reformatting, conversion
    TextTransformation,
    /// Table generation and data tabulation
    TableGeneration,
}

impl SpecialistCategory {
    /// All categories, in the fixed planning order.
    ///
    /// Multi-category requests yield one task per matched category in this
    /// order, which keeps multi-task plans deterministic.
    pub const ALL: [SpecialistCategory; 3] = [
        SpecialistCategory::TextAnalysis,
        SpecialistCategory::TextTransformation,
        SpecialistCategory::TableGeneration,
    ];
}

impl std::fmt::Display for SpecialistCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SpecialistCategory::TextAnalysis => "text-analysis",
            SpecialistCategory::TextTransformation => "text-transformation",
            SpecialistCategory::TableGeneration => "table-generation",
        };
        write!(f, "{s}")
    }
}

/// One discrete unit of work. Created once per processing request by the
/// planner; immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: String,

    /// What needs to be done
    pub description: String,

    /// Which specialist handles this task
    pub category: SpecialistCategory,

    /// IDs of tasks that must complete before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Task {
    /// Create a task with a fresh ID and no dependencies.
    pub fn new(description: impl Into<String>, category: SpecialistCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            category,
            depends_on: Vec::new(),
        }
    }
}

/// The outcome of one task execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecialistResult {
    /// The specialist produced output
    Completed { text: String },

    /// The specialist needs more information before it can proceed
    NeedsClarification { question: String },
}

impl SpecialistResult {
    pub fn is_clarification(&self) -> bool {
        matches!(self, SpecialistResult::NeedsClarification { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_get_unique_ids() {
        let a = Task::new("summarize", SpecialistCategory::TextAnalysis);
        let b = Task::new("summarize", SpecialistCategory::TextAnalysis);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn category_order_is_fixed() {
        assert_eq!(
            SpecialistCategory::ALL,
            [
                SpecialistCategory::TextAnalysis,
                SpecialistCategory::TextTransformation,
                SpecialistCategory::TableGeneration,
            ]
        );
    }

    #[test]
    fn result_serialization_tags_kind() {
        let result = SpecialistResult::NeedsClarification {
            question: "What columns?".into(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("needs_clarification"));
        assert!(json.contains("What columns?"));
    }
}
