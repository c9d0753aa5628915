//! `librarian answer` — Answer a pending clarification and resume.

use anyhow::Context;
use librarian_config::AppConfig;
use librarian_team::{ProcessingSession, SessionOutcome, output_truncated};

use super::{build_provider, discards_session, orchestrator_config, snapshot_store};

pub async fn run(answer: &str) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let provider = build_provider(&config)?;
    let store = snapshot_store(&config);

    let snapshot = store
        .load()
        .context("No suspended session to answer — run `librarian process` first")?;
    let mut session = ProcessingSession::from_snapshot(orchestrator_config(&config), snapshot);

    let outcome = match session.answer_clarification(&provider, answer).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // A failed session is not resumable; state misuse keeps it
            if discards_session(&e) {
                store.clear()?;
            }
            return Err(e.into());
        }
    };

    match outcome {
        SessionOutcome::Final(text) => {
            println!("{text}");
            if output_truncated(&text) {
                store.save(&session.snapshot())?;
                eprintln!("\n⚠️  Output appears truncated — run `librarian continue` to get the rest");
            } else {
                store.clear()?;
            }
        }
        SessionOutcome::ClarificationPending { question, .. } => {
            store.save(&session.snapshot())?;
            println!("❓ The team needs further clarification:\n\n{question}");
            println!("\nAnswer with: librarian answer \"...\"");
        }
    }

    Ok(())
}
