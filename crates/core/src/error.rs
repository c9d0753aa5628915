//! Error types for the Librarian domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Librarian operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Chunking errors ---
    #[error("Chunking error: {0}")]
    Chunk(#[from] ChunkError),

    // --- Planning errors ---
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    // --- Specialist errors ---
    #[error("Specialist error: {0}")]
    Specialist(#[from] SpecialistError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ChunkError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Error)]
pub enum PlanError {
    #[error("Task plan could not be parsed after retry: {0}")]
    Unparseable(String),

    #[error("Planner generation call failed: {0}")]
    GenerationFailed(String),
}

#[derive(Debug, Error)]
pub enum SpecialistError {
    #[error("Specialist for task {task_index} failed after retry: {source}")]
    Failed {
        task_index: usize,
        #[source]
        source: ProviderError,
    },
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid session state: expected {expected}, session is {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("No session snapshot found at {0}")]
    SnapshotMissing(String),

    #[error("Session snapshot could not be read: {0}")]
    SnapshotCorrupt(String),
}

/// Errors from the external generation capability.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Rate limited by provider{}", retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Invalid request rejected by provider: {0}")]
    InvalidRequest(String),

    #[error("Provider service error: {0}")]
    ServiceError(String),
}
