//! `librarian chunk` — Chunk a document and report the result.

use anyhow::Context;
use librarian_chunking::{detect, estimate_pages, smart_chunk};
use librarian_config::AppConfig;
use std::path::Path;

use super::load_document;

const CHARS_PER_PAGE: usize = 3000;

pub fn run(file: &Path, max_size: Option<usize>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    let document = load_document(file)?;

    let max_chunk_size = max_size.unwrap_or(config.limits.max_chunk_size);
    let structure = detect(&document.content);
    let chunks = smart_chunk(&document.content, max_chunk_size)?;

    println!("📚 Chunk Report — {}", file.display());
    println!("==================");
    println!("  Structure:    {structure}");
    println!("  Length:       {} chars (~{} pages)",
        document.len_chars(),
        estimate_pages(&document.content, CHARS_PER_PAGE),
    );
    println!("  Chunk bound:  {max_chunk_size} chars");
    println!("  Chunks:       {}", chunks.len());
    println!();

    for chunk in &chunks {
        println!(
            "  [{}] {} — {} chars, ~{} tokens",
            chunk.index + 1,
            chunk.boundary,
            chunk.content.chars().count(),
            chunk.approx_token_count,
        );
    }

    Ok(())
}
