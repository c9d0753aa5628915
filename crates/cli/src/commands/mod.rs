//! CLI command implementations.

pub mod answer;
pub mod chunk;
pub mod continue_cmd;
pub mod process;
pub mod status;

use anyhow::Context;
use librarian_config::AppConfig;
use librarian_core::Document;
use librarian_providers::AnthropicProvider;
use librarian_team::{OrchestratorConfig, SnapshotStore};
use std::path::Path;

/// Load a plain-text document from disk. The file stem becomes the title.
pub(crate) fn load_document(path: &Path) -> anyhow::Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document at {}", path.display()))?;

    let mut document = Document::from_text(content);
    if let Some(stem) = path.file_stem() {
        document = document.with_title(stem.to_string_lossy());
    }
    Ok(document)
}

/// Build the generation provider from config. Fails without an API key.
pub(crate) fn build_provider(config: &AppConfig) -> anyhow::Result<AnthropicProvider> {
    let api_key = config.provider.api_key.clone().context(
        "No API key configured — set LIBRARIAN_API_KEY or add provider.api_key to config.toml",
    )?;
    Ok(AnthropicProvider::new(api_key).with_base_url(&config.provider.base_url))
}

pub(crate) fn orchestrator_config(config: &AppConfig) -> OrchestratorConfig {
    OrchestratorConfig {
        model: config.provider.model.clone(),
        max_output_tokens: config.limits.max_output_tokens,
        context_window_tokens: config.limits.context_window_tokens,
    }
}

pub(crate) fn snapshot_store(config: &AppConfig) -> SnapshotStore {
    SnapshotStore::new(&config.session.state_dir)
}

/// Whether an error from a resumed session invalidates its snapshot.
///
/// Running the wrong command for the session's state is caller misuse and
/// must leave the suspended session on disk so the right command can still
/// resume it. Any other error means the session's state is no longer
/// trustworthy.
pub(crate) fn discards_session(err: &librarian_core::Error) -> bool {
    use librarian_core::{Error, SessionError};
    !matches!(err, Error::Session(SessionError::InvalidState { .. }))
}
