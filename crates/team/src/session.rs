//! The processing session state machine.
//!
//! One session drives planner → specialists → budget → compiler for a single
//! document request:
//!
//! ```text
//! Idle → Planning → Delegating → Compiling → Done
//!                       │   ▲
//!                       ▼   │ answer_clarification
//!              AwaitingClarification
//! ```
//!
//! `AwaitingClarification` is the only non-terminal pause state.
//! `continue_processing` is valid only immediately after `Done` when the
//! compiled output carries a truncation sentinel. Tasks run strictly
//! sequentially; nothing here is shared across sessions.

use librarian_core::error::{Error, SessionError};
use librarian_core::provider::GenerationProvider;
use librarian_core::{Document, SpecialistResult, Task};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::budget::ContextBudgetTracker;
use crate::compiler::{CompileOutcome, compile, output_truncated};
use crate::planner::TaskPlanner;
use crate::snapshot::SessionSnapshot;
use crate::specialists::{SpecialistRouter, max_output_ceiling};

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Planning,
    Delegating,
    AwaitingClarification,
    Compiling,
    Done,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Idle => "Idle",
            SessionState::Planning => "Planning",
            SessionState::Delegating => "Delegating",
            SessionState::AwaitingClarification => "AwaitingClarification",
            SessionState::Compiling => "Compiling",
            SessionState::Done => "Done",
        };
        write!(f, "{s}")
    }
}

/// Configuration handed to a session at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Model identifier for all generation calls
    pub model: String,

    /// Cap on any single specialist response, in tokens
    pub max_output_tokens: u32,

    /// Total session budget, in tokens
    pub context_window_tokens: usize,
}

/// A clarification the session is suspended on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClarification {
    pub task_index: usize,
    pub question: String,
}

/// What a session call handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The compiled final output
    Final(String),

    /// A specialist needs an answer before the session can complete
    ClarificationPending { task_index: usize, question: String },
}

/// One document, one request, one synchronous completion.
///
/// The session owns its task list, result list, and budget exclusively;
/// the document is read-only for the session's lifetime.
#[derive(Debug)]
pub struct ProcessingSession {
    id: String,
    config: OrchestratorConfig,
    state: SessionState,
    request: String,
    context: Option<String>,
    document: Option<Document>,
    tasks: Vec<Task>,
    results: Vec<SpecialistResult>,
    budget: ContextBudgetTracker,
    pending: Option<PendingClarification>,
    compiled_output: Option<String>,
}

impl ProcessingSession {
    /// Create a fresh session in `Idle`.
    pub fn new(config: OrchestratorConfig) -> Self {
        let threshold = max_output_ceiling().min(config.max_output_tokens) as usize;
        let budget = ContextBudgetTracker::new(config.context_window_tokens, threshold);
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            state: SessionState::Idle,
            request: String::new(),
            context: None,
            document: None,
            tasks: Vec::new(),
            results: Vec::new(),
            budget,
            pending: None,
            compiled_output: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn budget(&self) -> &ContextBudgetTracker {
        &self.budget
    }

    pub fn pending_clarification(&self) -> Option<&PendingClarification> {
        self.pending.as_ref()
    }

    pub fn compiled_output(&self) -> Option<&str> {
        self.compiled_output.as_deref()
    }

    /// Main entry point: process one request against one document.
    ///
    /// Valid only in `Idle`. Plans, delegates each task sequentially, and
    /// compiles — or suspends at the first clarification request.
    pub async fn process_document(
        &mut self,
        provider: &dyn GenerationProvider,
        request: &str,
        document: Document,
        context: Option<String>,
    ) -> Result<SessionOutcome, Error> {
        self.expect_state(SessionState::Idle)?;

        self.request = request.to_string();
        self.context = context;

        self.state = SessionState::Planning;
        info!(session = %self.id, "Planning request");

        let planner = TaskPlanner::new(&self.config.model, self.config.max_output_tokens);
        self.tasks = planner.plan(provider, &self.request, &document).await?;
        self.document = Some(document);

        self.state = SessionState::Delegating;
        self.delegate_and_compile(provider).await
    }

    /// Resume a suspended session with the user's answer.
    ///
    /// Re-invokes the specific specialist that raised the question, with the
    /// clarification appended to its prompt, then continues delegation.
    pub async fn answer_clarification(
        &mut self,
        provider: &dyn GenerationProvider,
        answer: &str,
    ) -> Result<SessionOutcome, Error> {
        self.expect_state(SessionState::AwaitingClarification)?;

        let pending = self
            .pending
            .clone()
            .ok_or_else(|| Error::Internal("awaiting clarification without a pending task".into()))?;

        // The pending index comes from an on-disk snapshot; validate it
        // against the task and result lists before touching any state.
        let task = self.tasks.get(pending.task_index).cloned().ok_or_else(|| {
            SessionError::SnapshotCorrupt(format!(
                "pending task index {} out of range for {} tasks",
                pending.task_index,
                self.tasks.len()
            ))
        })?;
        if pending.task_index >= self.results.len() {
            return Err(SessionError::SnapshotCorrupt(format!(
                "pending task index {} has no recorded result ({} results)",
                pending.task_index,
                self.results.len()
            ))
            .into());
        }

        info!(session = %self.id, task_index = pending.task_index, "Re-routing clarified task");
        self.state = SessionState::Delegating;

        let content = self.prompt_content();
        let router = self.router();
        let invocation = router
            .route(provider, &task, pending.task_index, &content, Some(answer))
            .await?;
        self.budget
            .record(invocation.prompt_chars, invocation.response_chars);

        match invocation.result {
            SpecialistResult::NeedsClarification { question } => {
                self.state = SessionState::AwaitingClarification;
                self.pending = Some(PendingClarification {
                    task_index: pending.task_index,
                    question: question.clone(),
                });
                self.results[pending.task_index] =
                    SpecialistResult::NeedsClarification { question: question.clone() };
                Ok(SessionOutcome::ClarificationPending {
                    task_index: pending.task_index,
                    question,
                })
            }
            completed => {
                self.results[pending.task_index] = completed;
                self.pending = None;
                self.delegate_and_compile(provider).await
            }
        }
    }

    /// Resume output that the generation service's own ceiling cut off.
    ///
    /// Valid only immediately after `Done` when the compiled output carries
    /// a truncation sentinel. Appends the new text to the prior output.
    pub async fn continue_processing(
        &mut self,
        provider: &dyn GenerationProvider,
    ) -> Result<String, Error> {
        let truncated = self
            .compiled_output
            .as_deref()
            .is_some_and(output_truncated);

        if self.state != SessionState::Done || !truncated {
            return Err(SessionError::InvalidState {
                expected: "Done with truncated output".into(),
                actual: self.state.to_string(),
            }
            .into());
        }

        let task = self.tasks.last().cloned().ok_or_else(|| {
            SessionError::SnapshotCorrupt("no tasks recorded for this session".into())
        })?;
        let task_index = self.tasks.len() - 1;
        let content = self.prompt_content();
        let prior = self.compiled_output.clone().unwrap_or_default();

        info!(session = %self.id, task_index, "Continuing truncated output");

        let router = self.router();
        let invocation = router
            .continue_output(provider, &task, task_index, &content, &prior)
            .await?;
        self.budget
            .record(invocation.prompt_chars, invocation.response_chars);
        self.budget.continuation_pending = false;

        let continuation = match invocation.result {
            SpecialistResult::Completed { text } => text,
            SpecialistResult::NeedsClarification { question } => {
                warn!(
                    session = %self.id,
                    task_index,
                    "Continuation call returned a clarification request instead of continued text"
                );
                question
            }
        };

        let full = format!("{}\n{}", strip_truncation_tail(&prior), continuation);
        self.compiled_output = Some(full.clone());
        Ok(full)
    }

    /// Run remaining tasks sequentially, then compile.
    async fn delegate_and_compile(
        &mut self,
        provider: &dyn GenerationProvider,
    ) -> Result<SessionOutcome, Error> {
        let router = self.router();

        while self.results.len() < self.tasks.len() {
            let task_index = self.results.len();
            let task = self.tasks[task_index].clone();
            let content = self.prompt_content();

            debug!(session = %self.id, task_index, category = %task.category, "Delegating task");
            let invocation = router
                .route(provider, &task, task_index, &content, None)
                .await?;
            self.budget
                .record(invocation.prompt_chars, invocation.response_chars);

            if let SpecialistResult::NeedsClarification { question } = &invocation.result {
                let question = question.clone();
                self.results.push(invocation.result);
                self.state = SessionState::AwaitingClarification;
                self.pending = Some(PendingClarification {
                    task_index,
                    question: question.clone(),
                });
                return Ok(SessionOutcome::ClarificationPending { task_index, question });
            }
            self.results.push(invocation.result);
        }

        self.state = SessionState::Compiling;
        match compile(&self.results) {
            CompileOutcome::Final(text) => {
                self.compiled_output = Some(text.clone());
                self.state = SessionState::Done;
                info!(session = %self.id, "Session complete");
                Ok(SessionOutcome::Final(text))
            }
            CompileOutcome::ClarificationPending { task_index, question } => {
                // A clarification that survived delegation (restored session)
                self.state = SessionState::AwaitingClarification;
                self.pending = Some(PendingClarification {
                    task_index,
                    question: question.clone(),
                });
                Ok(SessionOutcome::ClarificationPending { task_index, question })
            }
        }
    }

    /// Capture the session for cross-process persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            state: self.state,
            request: self.request.clone(),
            context: self.context.clone(),
            document: self.document.clone(),
            tasks: self.tasks.clone(),
            results: self.results.clone(),
            budget: self.budget.clone(),
            pending: self.pending.clone(),
            compiled_output: self.compiled_output.clone(),
            saved_at: chrono::Utc::now(),
        }
    }

    /// Rebuild a session from a stored snapshot.
    pub fn from_snapshot(config: OrchestratorConfig, snapshot: SessionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            config,
            state: snapshot.state,
            request: snapshot.request,
            context: snapshot.context,
            document: snapshot.document,
            tasks: snapshot.tasks,
            results: snapshot.results,
            budget: snapshot.budget,
            pending: snapshot.pending,
            compiled_output: snapshot.compiled_output,
        }
    }

    fn router(&self) -> SpecialistRouter {
        SpecialistRouter::new(&self.config.model, self.config.max_output_tokens)
    }

    /// The content block specialists see: the document, plus any extra
    /// context the caller supplied.
    fn prompt_content(&self) -> String {
        let content = self
            .document
            .as_ref()
            .map(|d| d.content.as_str())
            .unwrap_or_default();
        match &self.context {
            Some(ctx) => format!("{content}\n\nAdditional context: {ctx}"),
            None => content.to_string(),
        }
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::InvalidState {
                expected: expected.to_string(),
                actual: self.state.to_string(),
            });
        }
        Ok(())
    }
}

/// Remove a trailing truncation marker before appending continued text.
fn strip_truncation_tail(text: &str) -> &str {
    let trimmed = text.trim_end();
    trimmed
        .strip_suffix("...continue")
        .map(str::trim_end)
        .unwrap_or(trimmed)
}
