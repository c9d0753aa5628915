//! Task planning — turning a free-text request into discrete tasks.
//!
//! Planning is delegated to the generation capability: one call with a
//! system instruction describing the three specialist categories, parsed
//! from a JSON response. A malformed response gets one retry with a stricter
//! formatting instruction before surfacing `PlanError`. When the generation
//! service is unavailable the keyword fallback takes over.

use librarian_core::error::PlanError;
use librarian_core::provider::{GenerationProvider, GenerationRequest};
use librarian_core::{Document, SpecialistCategory, Task};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// How much of the document the planning prompt includes.
const PREVIEW_CHARS: usize = 5000;

const PLANNER_SYSTEM_PROMPT: &str = "\
You are the lead orchestrator of a document processing team. Analyze the \
user's request and break it into discrete tasks for three specialists:\n\
- text_analysis: summarization, condensing, extraction, key points \
(trigger words: summarize, analyze, extract, condense, key points)\n\
- text_transformation: restructuring, formatting, conversion \
(trigger words: restructure, format, convert, transform, reformat)\n\
- table_generation: tables, tabulation, CSV, merged cells \
(trigger words: table, tabulate, merged cell, csv, comparison table)\n\
Respond with JSON only:\n\
{\"tasks\": [{\"description\": \"what to do\", \"category\": \"text_analysis|text_transformation|table_generation\"}]}";

const STRICT_RETRY_SUFFIX: &str = "\n\nYour previous response could not be parsed. \
Respond with ONLY the JSON object, no prose, no code fences.";

/// The planner's JSON wire format.
#[derive(Debug, Deserialize)]
struct PlanResponse {
    tasks: Vec<PlannedTask>,
}

#[derive(Debug, Deserialize)]
struct PlannedTask {
    description: String,
    category: String,
}

/// Turns a free-text request into an ordered set of tasks.
#[derive(Debug, Clone)]
pub struct TaskPlanner {
    model: String,
    max_output_tokens: u32,
}

impl TaskPlanner {
    pub fn new(model: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_output_tokens,
        }
    }

    /// Plan the request against the document.
    ///
    /// One generation call, one parse retry with a stricter instruction,
    /// then `PlanError`. If the generation service itself is unavailable,
    /// falls back to keyword classification.
    pub async fn plan(
        &self,
        provider: &dyn GenerationProvider,
        request: &str,
        document: &Document,
    ) -> Result<Vec<Task>, PlanError> {
        let prompt = self.build_prompt(request, document);

        let response = match provider
            .generate(GenerationRequest::new(
                &self.model,
                &prompt,
                PLANNER_SYSTEM_PROMPT,
                self.max_output_tokens,
            ))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Planner generation call failed; using keyword fallback");
                return Ok(plan_with_keywords(request));
            }
        };

        match parse_plan(&response) {
            Ok(tasks) => Ok(tasks),
            Err(first_err) => {
                debug!(error = %first_err, "Task plan unparseable, retrying with strict formatting");
                let strict_prompt = format!("{prompt}{STRICT_RETRY_SUFFIX}");
                let retry = provider
                    .generate(GenerationRequest::new(
                        &self.model,
                        &strict_prompt,
                        PLANNER_SYSTEM_PROMPT,
                        self.max_output_tokens,
                    ))
                    .await
                    .map_err(|e| PlanError::GenerationFailed(e.to_string()))?;

                parse_plan(&retry).map_err(PlanError::Unparseable)
            }
        }
    }

    fn build_prompt(&self, request: &str, document: &Document) -> String {
        let preview: String = document.content.chars().take(PREVIEW_CHARS).collect();
        format!(
            "Document preview (first {PREVIEW_CHARS} chars):\n{preview}\n\n\
             Total document length: {} characters\n\n\
             User request: {request}",
            document.len_chars()
        )
    }
}

/// Parse a planning response, tolerating prose around the JSON object.
fn parse_plan(response: &str) -> Result<Vec<Task>, String> {
    let start = response.find('{').ok_or("no JSON object in response")?;
    let end = response.rfind('}').ok_or("no closing brace in response")?;
    if end < start {
        return Err("malformed JSON boundaries".into());
    }

    let parsed: PlanResponse =
        serde_json::from_str(&response[start..=end]).map_err(|e| e.to_string())?;

    if parsed.tasks.is_empty() {
        return Err("plan contains no tasks".into());
    }

    let mut tasks = Vec::with_capacity(parsed.tasks.len());
    for planned in parsed.tasks {
        let category = parse_category(&planned.category)
            .ok_or_else(|| format!("unknown category: {}", planned.category))?;
        tasks.push(Task::new(planned.description, category));
    }

    info!(count = tasks.len(), "Task plan created");
    Ok(tasks)
}

fn parse_category(s: &str) -> Option<SpecialistCategory> {
    match s.trim() {
        "text_analysis" => Some(SpecialistCategory::TextAnalysis),
        "text_transformation" => Some(SpecialistCategory::TextTransformation),
        "table_generation" => Some(SpecialistCategory::TableGeneration),
        _ => None,
    }
}

/// Keyword sets per category. These lists are the contract; no additional
/// heuristics are layered on top.
const ANALYSIS_KEYWORDS: [&str; 5] = ["summarize", "analyze", "extract", "condense", "key points"];
const TRANSFORMATION_KEYWORDS: [&str; 5] =
    ["restructure", "format", "convert", "transform", "reformat"];
const TABLE_KEYWORDS: [&str; 5] = ["table", "tabulate", "merged cell", "csv", "comparison table"];

/// Classify a request by keyword matching alone.
///
/// A request matching keywords from multiple sets yields multiple tasks, one
/// per matched category, in the fixed category order — this keeps multi-task
/// plans deterministic. A request matching nothing becomes a single
/// text-analysis task.
pub fn plan_with_keywords(request: &str) -> Vec<Task> {
    let lowered = request.to_lowercase();

    let matched = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    let mut tasks = Vec::new();
    for category in SpecialistCategory::ALL {
        let keywords: &[&str] = match category {
            SpecialistCategory::TextAnalysis => &ANALYSIS_KEYWORDS,
            SpecialistCategory::TextTransformation => &TRANSFORMATION_KEYWORDS,
            SpecialistCategory::TableGeneration => &TABLE_KEYWORDS,
        };
        if matched(keywords) {
            tasks.push(Task::new(request, category));
        }
    }

    if tasks.is_empty() {
        tasks.push(Task::new(request, SpecialistCategory::TextAnalysis));
    }

    debug!(count = tasks.len(), "Keyword fallback plan created");
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use librarian_core::error::ProviderError;

    #[test]
    fn keyword_fallback_single_category() {
        let tasks = plan_with_keywords("Please summarize this document");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category, SpecialistCategory::TextAnalysis);
    }

    #[test]
    fn keyword_fallback_multi_category_is_ordered() {
        let tasks = plan_with_keywords("Summarize this and create a comparison table");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].category, SpecialistCategory::TextAnalysis);
        assert_eq!(tasks[1].category, SpecialistCategory::TableGeneration);
    }

    #[test]
    fn keyword_fallback_no_match_defaults_to_analysis() {
        let tasks = plan_with_keywords("Do something unspecified with this");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category, SpecialistCategory::TextAnalysis);
    }

    #[test]
    fn keyword_fallback_all_three() {
        let tasks = plan_with_keywords("Summarize, reformat, and tabulate the data");
        assert_eq!(tasks.len(), 3);
        assert_eq!(
            tasks.iter().map(|t| t.category).collect::<Vec<_>>(),
            SpecialistCategory::ALL.to_vec()
        );
    }

    #[test]
    fn parse_plan_extracts_json_from_prose() {
        let response = r#"Here is the plan:
{"tasks": [{"description": "Summarize chapter 1", "category": "text_analysis"}]}
Let me know if you need anything else."#;
        let tasks = parse_plan(response).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Summarize chapter 1");
    }

    #[test]
    fn parse_plan_rejects_unknown_category() {
        let response = r#"{"tasks": [{"description": "x", "category": "image_generation"}]}"#;
        assert!(parse_plan(response).is_err());
    }

    #[test]
    fn parse_plan_rejects_empty_plan() {
        assert!(parse_plan(r#"{"tasks": []}"#).is_err());
        assert!(parse_plan("no json here at all").is_err());
    }

    #[tokio::test]
    async fn plan_parses_provider_response() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"tasks": [{"description": "Summarize", "category": "text_analysis"},
                          {"description": "Make a table", "category": "table_generation"}]}"#
                .into(),
        )]);
        let planner = TaskPlanner::new("test-model", 1000);
        let doc = Document::from_text("content");
        let tasks = planner.plan(&provider, "summarize and tabulate", &doc).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].category, SpecialistCategory::TableGeneration);
    }

    #[tokio::test]
    async fn plan_retries_once_on_malformed_response() {
        let provider = ScriptedProvider::new(vec![
            Ok("not json at all".into()),
            Ok(r#"{"tasks": [{"description": "Summarize", "category": "text_analysis"}]}"#.into()),
        ]);
        let planner = TaskPlanner::new("test-model", 1000);
        let doc = Document::from_text("content");
        let tasks = planner.plan(&provider, "summarize", &doc).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(provider.call_count(), 2);
        let strict = &provider.requests()[1];
        assert!(strict.prompt.contains("ONLY the JSON object"));
    }

    #[tokio::test]
    async fn plan_surfaces_error_after_two_malformed_responses() {
        let provider = ScriptedProvider::new(vec![
            Ok("garbage".into()),
            Ok("more garbage".into()),
        ]);
        let planner = TaskPlanner::new("test-model", 1000);
        let doc = Document::from_text("content");
        let result = planner.plan(&provider, "summarize", &doc).await;
        assert!(matches!(result, Err(PlanError::Unparseable(_))));
    }

    #[tokio::test]
    async fn plan_falls_back_to_keywords_when_provider_unavailable() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::ServiceError(
            "connection refused".into(),
        ))]);
        let planner = TaskPlanner::new("test-model", 1000);
        let doc = Document::from_text("content");
        let tasks = planner
            .plan(&provider, "convert this to markdown", &doc)
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category, SpecialistCategory::TextTransformation);
    }

    #[tokio::test]
    async fn plan_prompt_previews_large_documents() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"tasks": [{"description": "x", "category": "text_analysis"}]}"#.into(),
        )]);
        let planner = TaskPlanner::new("test-model", 1000);
        let doc = Document::from_text("y".repeat(20_000));
        planner.plan(&provider, "summarize", &doc).await.unwrap();

        let prompt = &provider.requests()[0].prompt;
        assert!(prompt.contains("20000 characters"));
        // Preview is capped, so the prompt stays well under the full document
        assert!(prompt.chars().count() < 6_000);
    }
}
