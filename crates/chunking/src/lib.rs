//! # Librarian Chunking
//!
//! Structure-aware splitting of oversized documents into bounded chunks, and
//! boundary-preserving reassembly of chunk-level results.
//!
//! The usual entry points are the facades:
//! - [`smart_chunk`] — detect the document structure, then chunk at the
//!   granularity it allows
//! - [`merge_with_headers`] — reassemble processed chunks with section
//!   headers
//!
//! Chunking and merging are pure, CPU-only operations with no I/O. The
//! source text is never mutated.

pub mod chunker;
pub mod detector;
pub mod merger;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, DocumentChunker};
pub use detector::detect;
pub use merger::{ChunkResult, MergedOutput, merge, merge_plain};

use librarian_core::{Chunk, ChunkError};

/// Detect the document structure, then chunk with the detected kind.
///
/// Equivalent to calling [`detect`] followed by [`DocumentChunker::chunk`];
/// provided for caller convenience.
pub fn smart_chunk(text: &str, max_chunk_size: usize) -> Result<Vec<Chunk>, ChunkError> {
    let chunker = DocumentChunker::new(max_chunk_size)?;
    Ok(chunker.chunk(text, detect(text)))
}

/// Merge processed chunk results into one document with section headers.
pub fn merge_with_headers(results: Vec<ChunkResult>) -> String {
    merge(results).text
}

/// Estimate the number of pages in a document by character count.
pub fn estimate_pages(content: &str, chars_per_page: usize) -> usize {
    let chars_per_page = chars_per_page.max(1);
    (content.chars().count() / chars_per_page).max(1)
}
