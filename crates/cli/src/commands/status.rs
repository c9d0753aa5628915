//! `librarian status` — Show configuration and session status.

use anyhow::Context;
use librarian_config::AppConfig;

use super::snapshot_store;

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    println!("📚 Librarian Status");
    println!("==================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Model:        {}", config.provider.model);
    println!("  Base URL:     {}", config.provider.base_url);
    println!("  API key:      {}", if config.has_api_key() { "configured" } else { "missing" });
    println!("  Output cap:   {} tokens", config.limits.max_output_tokens);
    println!("  Context:      {} tokens", config.limits.context_window_tokens);
    println!("  Chunk after:  {} chars", config.limits.chunk_size_threshold);
    println!("  Chunk bound:  {} chars", config.limits.max_chunk_size);
    println!("  State dir:    {}", config.session.state_dir.display());

    let store = snapshot_store(&config);
    if store.exists() {
        match store.load() {
            Ok(snapshot) => {
                println!("\n  Session:      {} ({})", snapshot.id, snapshot.state);
                if let Some(pending) = &snapshot.pending {
                    println!("  Waiting on:   task {} — {}", pending.task_index + 1, pending.question);
                }
            }
            Err(e) => println!("\n  ⚠️  Session snapshot unreadable: {e}"),
        }
    } else {
        println!("\n  No suspended session");
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ℹ️  No config file at {} — defaults in effect", config_path.display());
    }

    Ok(())
}
