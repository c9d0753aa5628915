//! Result compilation.
//!
//! Concatenates specialist outputs into one final answer. A single
//! unanswered clarification blocks the whole session: the first one
//! encountered in task order is returned instead of partial text.
//! Headers are the chunk merger's responsibility, not the compiler's.

use librarian_core::SpecialistResult;

/// The outcome of compiling a session's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// All tasks completed; the joined output
    Final(String),

    /// A specialist is waiting on an answer; compilation is suspended
    ClarificationPending { task_index: usize, question: String },
}

/// Compile specialist results, keyed by task order.
pub fn compile(results: &[SpecialistResult]) -> CompileOutcome {
    for (task_index, result) in results.iter().enumerate() {
        if let SpecialistResult::NeedsClarification { question } = result {
            return CompileOutcome::ClarificationPending {
                task_index,
                question: question.clone(),
            };
        }
    }

    let text = results
        .iter()
        .filter_map(|r| match r {
            SpecialistResult::Completed { text } => Some(text.as_str()),
            SpecialistResult::NeedsClarification { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    CompileOutcome::Final(text)
}

/// Markers a generation service leaves when its own output ceiling cut the
/// text off mid-stream.
const TRUNCATION_SENTINELS: [&str; 2] = ["...continue", "reply 'continue'"];

/// Whether compiled output was truncated by the service's length ceiling.
///
/// Detection looks only at the trailing region of the text so a document
/// that merely discusses continuations is not misclassified.
pub fn output_truncated(text: &str) -> bool {
    let tail: String = text
        .trim_end()
        .chars()
        .rev()
        .take(120)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let tail = tail.to_lowercase();
    TRUNCATION_SENTINELS.iter().any(|s| tail.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(text: &str) -> SpecialistResult {
        SpecialistResult::Completed { text: text.into() }
    }

    #[test]
    fn all_completed_joins_with_blank_line() {
        let results = vec![completed("first output"), completed("second output")];
        assert_eq!(
            compile(&results),
            CompileOutcome::Final("first output\n\nsecond output".into())
        );
    }

    #[test]
    fn no_headers_are_added() {
        let results = vec![completed("alpha"), completed("beta")];
        let CompileOutcome::Final(text) = compile(&results) else {
            panic!("expected final output");
        };
        assert!(!text.contains("Section"));
        assert!(!text.contains("==="));
    }

    #[test]
    fn first_clarification_blocks_compilation() {
        let results = vec![
            completed("task one done"),
            SpecialistResult::NeedsClarification { question: "What columns?".into() },
            completed("task three done"),
        ];
        assert_eq!(
            compile(&results),
            CompileOutcome::ClarificationPending {
                task_index: 1,
                question: "What columns?".into(),
            }
        );
    }

    #[test]
    fn earliest_of_several_clarifications_wins() {
        let results = vec![
            SpecialistResult::NeedsClarification { question: "first?".into() },
            SpecialistResult::NeedsClarification { question: "second?".into() },
        ];
        let CompileOutcome::ClarificationPending { task_index, question } = compile(&results)
        else {
            panic!("expected pending clarification");
        };
        assert_eq!(task_index, 0);
        assert_eq!(question, "first?");
    }

    #[test]
    fn empty_results_compile_to_empty_text() {
        assert_eq!(compile(&[]), CompileOutcome::Final(String::new()));
    }

    #[test]
    fn truncation_detected_at_tail_only() {
        assert!(output_truncated("Long output that stops here ...continue"));
        assert!(output_truncated(
            "Due to length constraints, please reply 'continue' to see the rest."
        ));
        assert!(!output_truncated(
            "...continue is mentioned early. But the text then goes on for a while \
             and ends normally with a complete conclusion paragraph that is long enough."
        ));
        assert!(!output_truncated("A complete answer."));
    }
}
