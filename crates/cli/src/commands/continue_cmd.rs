//! `librarian continue` — Continue output cut off by the length ceiling.

use anyhow::Context;
use librarian_config::AppConfig;
use librarian_team::{ProcessingSession, output_truncated};

use super::{build_provider, discards_session, orchestrator_config, snapshot_store};

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let provider = build_provider(&config)?;
    let store = snapshot_store(&config);

    let snapshot = store
        .load()
        .context("No session to continue — run `librarian process` first")?;
    let mut session = ProcessingSession::from_snapshot(orchestrator_config(&config), snapshot);

    let full = match session.continue_processing(&provider).await {
        Ok(full) => full,
        Err(e) => {
            // A failed session is not resumable; state misuse keeps it
            if discards_session(&e) {
                store.clear()?;
            }
            return Err(e.into());
        }
    };

    println!("{full}");

    if output_truncated(&full) {
        store.save(&session.snapshot())?;
        eprintln!("\n⚠️  Output still appears truncated — run `librarian continue` again");
    } else {
        store.clear()?;
    }

    Ok(())
}
