//! Specialist profiles and routing.
//!
//! Each category maps to exactly one specialist profile: a fixed system
//! instruction plus a recommended generation-length ceiling. Routing builds
//! the prompt, invokes the generation capability, and interprets the
//! response — a clarification sentinel becomes `NeedsClarification`,
//! anything else `Completed`. One retry on transient provider failures is
//! the only retry point in the core.

use librarian_core::error::{ProviderError, SpecialistError};
use librarian_core::provider::{GenerationProvider, GenerationRequest};
use librarian_core::{SpecialistCategory, SpecialistResult, Task};
use tracing::{debug, warn};

/// A specialist's fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct SpecialistProfile {
    pub category: SpecialistCategory,
    pub name: &'static str,
    pub system_instruction: &'static str,
    /// Recommended generation-length ceiling, in tokens
    pub output_ceiling: u32,
}

const TEXT_ANALYSIS_PROFILE: SpecialistProfile = SpecialistProfile {
    category: SpecialistCategory::TextAnalysis,
    name: "text analysis specialist",
    system_instruction: "\
You are a text processing specialist in a document processing team. Your \
expertise: document summarization and condensing, text analysis and \
extraction, key points identification, narrative text processing. Process \
text efficiently and accurately, maintain original meaning when summarizing, \
and ask clarifying questions when requirements are ambiguous.",
    output_ceiling: 8000,
};

const TEXT_TRANSFORMATION_PROFILE: SpecialistProfile = SpecialistProfile {
    category: SpecialistCategory::TextTransformation,
    name: "text transformation specialist",
    system_instruction: "\
You are a text transformation specialist in a document processing team. Your \
expertise: text transformation and conversion, content formatting and \
styling, document restructuring, multiple format outputs. Handle text with \
precision, maintain document structure integrity, and ask clarifying \
questions when needed.",
    output_ceiling: 8000,
};

const TABLE_GENERATION_PROFILE: SpecialistProfile = SpecialistProfile {
    category: SpecialistCategory::TableGeneration,
    name: "table generation specialist",
    system_instruction: "\
You are a table generation specialist in a document processing team. Your \
expertise: creating tables in Markdown, HTML, and CSV, complex structures \
with merged cells, data extraction and tabulation. Use Markdown for simple \
tables and HTML for complex tables with merged cells, clearly label columns \
and rows, and ask for clarification on table structure when needed.",
    output_ceiling: 4000,
};

/// Fixed lookup table: category to profile. New categories are new enum
/// members plus a row here.
pub fn profile_for(category: SpecialistCategory) -> &'static SpecialistProfile {
    match category {
        SpecialistCategory::TextAnalysis => &TEXT_ANALYSIS_PROFILE,
        SpecialistCategory::TextTransformation => &TEXT_TRANSFORMATION_PROFILE,
        SpecialistCategory::TableGeneration => &TABLE_GENERATION_PROFILE,
    }
}

/// The largest output ceiling across all profiles. The budget tracker uses
/// this as its continuation threshold.
pub fn max_output_ceiling() -> u32 {
    [
        TEXT_ANALYSIS_PROFILE,
        TEXT_TRANSFORMATION_PROFILE,
        TABLE_GENERATION_PROFILE,
    ]
    .iter()
    .map(|p| p.output_ceiling)
    .max()
    .unwrap_or(0)
}

/// Sentinel phrases a specialist uses to ask for missing information.
const CLARIFICATION_SENTINELS: [&str; 5] = [
    "i need clarification:",
    "need clarification",
    "could you clarify",
    "unclear about",
    "could you specify",
];

/// Whether a response is a clarification request rather than output.
pub fn is_clarification(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CLARIFICATION_SENTINELS.iter().any(|s| lowered.contains(s))
}

/// The result of one routed invocation, with its accounting data.
#[derive(Debug, Clone)]
pub struct RoutedInvocation {
    pub result: SpecialistResult,
    /// Prompt size in characters, for budget accounting
    pub prompt_chars: usize,
    /// Response size in characters, for budget accounting
    pub response_chars: usize,
}

/// Maps a task's category to its specialist and invokes it.
#[derive(Debug, Clone)]
pub struct SpecialistRouter {
    model: String,
    /// Configured cap applied on top of each profile's recommended ceiling
    max_output_tokens: u32,
}

impl SpecialistRouter {
    pub fn new(model: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_output_tokens,
        }
    }

    /// Route one task to its specialist.
    ///
    /// Retries once with unchanged parameters on `RateLimited` or
    /// `ServiceError`, then surfaces `SpecialistFailure` with the task index.
    /// `InvalidRequest` is not retried — resending the same request cannot
    /// succeed.
    pub async fn route(
        &self,
        provider: &dyn GenerationProvider,
        task: &Task,
        task_index: usize,
        content: &str,
        clarification: Option<&str>,
    ) -> Result<RoutedInvocation, SpecialistError> {
        let prompt = build_prompt(task, content, clarification);
        self.invoke(provider, task, task_index, prompt).await
    }

    /// Re-invoke the specialist that produced `prior_output` with a
    /// continuation instruction, to pick up where a truncated response
    /// stopped.
    pub async fn continue_output(
        &self,
        provider: &dyn GenerationProvider,
        task: &Task,
        task_index: usize,
        content: &str,
        prior_output: &str,
    ) -> Result<RoutedInvocation, SpecialistError> {
        let prompt = format!(
            "{}\n\nYour previous output was cut off. It ended with:\n...{}\n\n\
             Continue exactly where it stopped; do not repeat what was already produced.",
            build_prompt(task, content, None),
            tail_chars(prior_output, 500),
        );
        self.invoke(provider, task, task_index, prompt).await
    }

    async fn invoke(
        &self,
        provider: &dyn GenerationProvider,
        task: &Task,
        task_index: usize,
        prompt: String,
    ) -> Result<RoutedInvocation, SpecialistError> {
        let profile = profile_for(task.category);
        let ceiling = profile.output_ceiling.min(self.max_output_tokens);
        let request = GenerationRequest::new(&self.model, &prompt, profile.system_instruction, ceiling);

        debug!(specialist = profile.name, task_index, "Routing task to specialist");

        let response = match provider.generate(request.clone()).await {
            Ok(text) => text,
            Err(e @ (ProviderError::RateLimited { .. } | ProviderError::ServiceError(_))) => {
                warn!(specialist = profile.name, error = %e, "Generation failed, retrying once");
                provider
                    .generate(request)
                    .await
                    .map_err(|source| SpecialistError::Failed { task_index, source })?
            }
            Err(source) => return Err(SpecialistError::Failed { task_index, source }),
        };

        let result = if is_clarification(&response) {
            SpecialistResult::NeedsClarification { question: response.clone() }
        } else {
            SpecialistResult::Completed { text: response.clone() }
        };

        Ok(RoutedInvocation {
            result,
            prompt_chars: prompt.chars().count(),
            response_chars: response.chars().count(),
        })
    }
}

fn build_prompt(task: &Task, content: &str, clarification: Option<&str>) -> String {
    let mut prompt = format!(
        "Content to process:\n{content}\n\nTask: {}\n\n",
        task.description
    );
    if let Some(answer) = clarification {
        prompt.push_str(&format!("Clarification from the user: {answer}\n\n"));
    }
    prompt.push_str(
        "Provide the processed output directly. If you need clarification, \
         clearly state your question.",
    );
    prompt
}

/// The last `n` characters of a string.
fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    let skip = count - n;
    let byte_start = text
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[byte_start..]
}
