//! `librarian process` — Run a request against a document.

use anyhow::Context;
use librarian_chunking::{ChunkResult, merge_with_headers, smart_chunk};
use librarian_config::AppConfig;
use librarian_core::Document;
use librarian_team::{ProcessingSession, SessionOutcome, output_truncated};
use std::path::Path;
use tracing::info;

use super::{build_provider, load_document, orchestrator_config, snapshot_store};

pub async fn run(file: &Path, request: &str, context: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let document = load_document(file)?;
    let provider = build_provider(&config)?;
    let store = snapshot_store(&config);

    // A new request replaces whatever session was suspended before it
    store.clear()?;

    if document.len_chars() > config.limits.chunk_size_threshold {
        info!(
            chars = document.len_chars(),
            threshold = config.limits.chunk_size_threshold,
            "Document exceeds chunking threshold, processing chunk by chunk"
        );
        return process_chunked(&config, &provider, request, &document, context).await;
    }

    let mut session = ProcessingSession::new(orchestrator_config(&config));
    let outcome = session
        .process_document(&provider, request, document, context)
        .await?;

    match outcome {
        SessionOutcome::Final(text) => {
            println!("{text}");
            if output_truncated(&text) {
                store.save(&session.snapshot())?;
                eprintln!("\n⚠️  Output appears truncated — run `librarian continue` to get the rest");
            }
        }
        SessionOutcome::ClarificationPending { question, .. } => {
            store.save(&session.snapshot())?;
            println!("❓ The team needs clarification:\n\n{question}");
            println!("\nAnswer with: librarian answer \"...\"");
        }
    }

    Ok(())
}

/// Oversized documents are chunked first; each chunk runs through its own
/// session and the outputs are merged with section headers. Clarifications
/// cannot suspend a chunked run across invocations.
async fn process_chunked(
    config: &AppConfig,
    provider: &librarian_providers::AnthropicProvider,
    request: &str,
    document: &Document,
    context: Option<String>,
) -> anyhow::Result<()> {
    let chunks = smart_chunk(&document.content, config.limits.max_chunk_size)?;
    info!(count = chunks.len(), "Document chunked");

    let mut results = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let mut session = ProcessingSession::new(orchestrator_config(config));
        let outcome = session
            .process_document(
                provider,
                request,
                Document::from_text(chunk.content),
                context.clone(),
            )
            .await?;

        match outcome {
            SessionOutcome::Final(text) => results.push(ChunkResult::new(chunk.index, text)),
            SessionOutcome::ClarificationPending { question, .. } => {
                anyhow::bail!(
                    "A specialist needs clarification while processing chunk {}: {question}\n\
                     Chunked runs cannot pause — refine the request and try again",
                    chunk.index + 1
                );
            }
        }
    }

    println!("{}", merge_with_headers(results));
    Ok(())
}
