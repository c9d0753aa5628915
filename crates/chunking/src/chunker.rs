//! Size-bounded, structure-aware document splitting.
//!
//! Splits at the granularity the detected structure allows (pages, chapters,
//! or paragraphs) and greedily packs consecutive units into chunks under the
//! configured character bound. A single unit exceeding the bound alone
//! becomes a `ForcedSplit` chunk; only paragraphs are split further, at
//! sentence boundaries.

use librarian_core::{BoundaryKind, Chunk, ChunkError, StructureKind};
use tracing::debug;

use crate::detector::{is_chapter_heading, is_page_marker};

/// Default chunk bound: 8000 characters (≈2000 tokens).
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 8000;

/// Structure-aware document chunker.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    max_chunk_size: usize,
}

impl DocumentChunker {
    /// Create a chunker with the given character bound.
    ///
    /// Fails with `InvalidConfiguration` when the bound is zero.
    pub fn new(max_chunk_size: usize) -> Result<Self, ChunkError> {
        if max_chunk_size == 0 {
            return Err(ChunkError::InvalidConfiguration(
                "max_chunk_size must be positive".into(),
            ));
        }
        Ok(Self { max_chunk_size })
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Split `text` into ordered chunks for the given structure kind.
    ///
    /// Chunk indices are assigned in strict content order starting at 0;
    /// no chunk is empty. Concatenating the chunk contents in index order
    /// reproduces the input modulo whitespace normalization at split points.
    pub fn chunk(&self, text: &str, kind: StructureKind) -> Vec<Chunk> {
        let chunks = match kind {
            StructureKind::PageMarked => {
                self.pack_units(split_at_lines(text, is_page_marker), "\n", BoundaryKind::PageBoundary)
            }
            StructureKind::ChapterMarked => self.pack_units(
                split_at_lines(text, is_chapter_heading),
                "\n",
                BoundaryKind::ChapterBoundary,
            ),
            StructureKind::Unstructured => self.chunk_paragraphs(text),
        };
        debug!(kind = %kind, count = chunks.len(), "Chunked document");
        chunks
    }

    /// Greedily pack consecutive units into chunks under the bound.
    ///
    /// The bound is inclusive: a unit that brings the running total to
    /// exactly `max_chunk_size` is included. A unit exceeding the bound
    /// alone becomes its own `ForcedSplit` chunk.
    fn pack_units(&self, units: Vec<String>, joiner: &str, boundary: BoundaryKind) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut current = String::new();

        let mut flush = |content: &mut String, chunks: &mut Vec<Chunk>, kind: BoundaryKind| {
            if !content.is_empty() {
                chunks.push(Chunk::new(chunks.len(), std::mem::take(content), kind));
            }
        };

        for unit in units {
            let unit_len = unit.chars().count();
            if unit_len == 0 {
                continue;
            }

            if unit_len > self.max_chunk_size {
                // Oversized single unit: close the running chunk, then emit
                // the unit on its own marked as a forced split.
                flush(&mut current, &mut chunks, boundary);
                chunks.push(Chunk::new(chunks.len(), unit, BoundaryKind::ForcedSplit));
                continue;
            }

            let cost = if current.is_empty() {
                unit_len
            } else {
                unit_len + joiner.chars().count()
            };

            if current.chars().count() + cost > self.max_chunk_size {
                flush(&mut current, &mut chunks, boundary);
                current = unit;
            } else {
                if !current.is_empty() {
                    current.push_str(joiner);
                }
                current.push_str(&unit);
            }
        }

        flush(&mut current, &mut chunks, boundary);
        chunks
    }

    /// Paragraph-granularity chunking for unstructured text.
    ///
    /// Oversized paragraphs are split at the nearest sentence boundary at or
    /// before the bound; the resulting pieces are emitted as `ForcedSplit`
    /// chunks of their own.
    fn chunk_paragraphs(&self, text: &str) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut current = String::new();

        let mut flush = |content: &mut String, chunks: &mut Vec<Chunk>| {
            if !content.is_empty() {
                chunks.push(Chunk::new(
                    chunks.len(),
                    std::mem::take(content),
                    BoundaryKind::ParagraphBoundary,
                ));
            }
        };

        for para in text.split("\n\n") {
            let para_len = para.chars().count();
            if para.trim().is_empty() {
                continue;
            }

            if para_len > self.max_chunk_size {
                flush(&mut current, &mut chunks);
                for piece in split_at_sentences(para, self.max_chunk_size) {
                    chunks.push(Chunk::new(chunks.len(), piece, BoundaryKind::ForcedSplit));
                }
                continue;
            }

            let cost = if current.is_empty() { para_len } else { para_len + 2 };
            if current.chars().count() + cost > self.max_chunk_size {
                flush(&mut current, &mut chunks);
                current = para.to_string();
            } else {
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(para);
            }
        }

        flush(&mut current, &mut chunks);
        chunks
    }
}

impl Default for DocumentChunker {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// Split text into units at lines matching `is_boundary`.
///
/// A boundary line opens a new unit and stays attached to it, so no content
/// is lost. Content before the first boundary becomes the first unit.
fn split_at_lines(text: &str, is_boundary: fn(&str) -> bool) -> Vec<String> {
    let mut units: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        if is_boundary(line) && !current.is_empty() {
            units.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        units.push(current);
    }
    units
}

/// Split an oversized paragraph at sentence boundaries.
///
/// Each piece is the longest prefix ending in a sentence terminator at or
/// before `max_size` characters. If no terminator falls inside the bound
/// the rest stays together as one oversized piece.
fn split_at_sentences(paragraph: &str, max_size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = paragraph.trim_start();

    while rest.chars().count() > max_size {
        match last_sentence_end_within(rest, max_size) {
            Some(byte_end) => {
                let (piece, tail) = rest.split_at(byte_end);
                pieces.push(piece.to_string());
                rest = tail.trim_start();
            }
            None => break,
        }
    }

    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

/// Byte offset just past the last sentence terminator within the first
/// `max_chars` characters, or None if there is no terminator in range.
fn last_sentence_end_within(text: &str, max_chars: usize) -> Option<usize> {
    let mut result = None;
    let mut prev: Option<char> = None;

    for (count, (byte_idx, c)) in text.char_indices().enumerate() {
        if count >= max_chars {
            break;
        }
        if let Some(p) = prev {
            if matches!(p, '.' | '!' | '?') && c.is_whitespace() {
                result = Some(byte_idx);
            }
        }
        prev = Some(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bound_is_invalid() {
        assert!(matches!(
            DocumentChunker::new(0),
            Err(ChunkError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn small_page_marked_document_is_one_chunk() {
        let text = "--- Page 1 ---\nA\n--- Page 2 ---\nB";
        let chunker = DocumentChunker::new(100).unwrap();
        let chunks = chunker.chunk(text, StructureKind::PageMarked);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
        assert_eq!(chunks[0].boundary, BoundaryKind::PageBoundary);
    }

    #[test]
    fn pages_split_when_bound_exceeded() {
        let page = format!("--- Page 1 ---\n{}", "x".repeat(50));
        let page2 = format!("--- Page 2 ---\n{}", "y".repeat(50));
        let text = format!("{page}\n{page2}");
        let chunker = DocumentChunker::new(70).unwrap();
        let chunks = chunker.chunk(&text, StructureKind::PageMarked);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.contains("Page 1"));
        assert!(chunks[1].content.contains("Page 2"));
    }

    #[test]
    fn oversized_page_becomes_forced_split() {
        let big = format!("--- Page 1 ---\n{}", "x".repeat(200));
        let text = format!("{big}\n--- Page 2 ---\nsmall");
        let chunker = DocumentChunker::new(100).unwrap();
        let chunks = chunker.chunk(&text, StructureKind::PageMarked);
        assert_eq!(chunks[0].boundary, BoundaryKind::ForcedSplit);
        assert!(chunks[0].content.chars().count() > 100);
        assert_eq!(chunks[1].boundary, BoundaryKind::PageBoundary);
    }

    #[test]
    fn inclusive_bound_packs_exact_fit() {
        // Two units of 10 chars joined with "\n\n" = 22 chars total
        let text = format!("{}\n\n{}", "a".repeat(10), "b".repeat(10));
        let chunker = DocumentChunker::new(22).unwrap();
        let chunks = chunker.chunk(&text, StructureKind::Unstructured);
        assert_eq!(chunks.len(), 1);

        let chunker = DocumentChunker::new(21).unwrap();
        let chunks = chunker.chunk(&text, StructureKind::Unstructured);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn indices_are_sequential_from_zero() {
        let text = (0..10)
            .map(|i| format!("Paragraph number {i} with some filler text."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let chunker = DocumentChunker::new(60).unwrap();
        let chunks = chunker.chunk(&text, StructureKind::Unstructured);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(!chunk.content.is_empty());
        }
    }

    #[test]
    fn round_trip_preserves_content() {
        let text = "--- Page 1 ---\nalpha beta\n--- Page 2 ---\ngamma delta\n--- Page 3 ---\nepsilon";
        let chunker = DocumentChunker::new(30).unwrap();
        let chunks = chunker.chunk(text, StructureKind::PageMarked);
        assert!(chunks.len() > 1);
        let rejoined = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn token_counts_respect_bound_unless_forced() {
        let text = (0..20)
            .map(|i| format!("Sentence {i} keeps the paragraphs modest in size."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let bound = 120;
        let chunker = DocumentChunker::new(bound).unwrap();
        for chunk in chunker.chunk(&text, StructureKind::Unstructured) {
            if chunk.boundary != BoundaryKind::ForcedSplit {
                assert!(chunk.approx_token_count <= bound.div_ceil(4) + 1);
                assert!(chunk.content.chars().count() <= bound);
            }
        }
    }

    #[test]
    fn oversized_paragraph_splits_at_sentence_boundary() {
        let para = "First sentence here. Second sentence follows. Third one closes.";
        let chunker = DocumentChunker::new(30).unwrap();
        let chunks = chunker.chunk(para, StructureKind::Unstructured);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.boundary, BoundaryKind::ForcedSplit);
        }
        assert!(chunks[0].content.ends_with('.'));
    }

    #[test]
    fn oversized_paragraph_without_sentences_stays_whole() {
        let para = "x".repeat(300);
        let chunker = DocumentChunker::new(100).unwrap();
        let chunks = chunker.chunk(&para, StructureKind::Unstructured);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].boundary, BoundaryKind::ForcedSplit);
        assert_eq!(chunks[0].content, para);
    }

    #[test]
    fn chapter_mode_splits_at_headings() {
        let text = "Chapter 1\nThe beginning of things.\nChapter 2\nThe middle part.\nChapter 3\nThe end.";
        let chunker = DocumentChunker::new(40).unwrap();
        let chunks = chunker.chunk(text, StructureKind::ChapterMarked);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].content.starts_with("Chapter 1"));
        assert_eq!(chunks[0].boundary, BoundaryKind::ChapterBoundary);
    }

    #[test]
    fn blank_paragraphs_are_skipped() {
        let text = "first\n\n\n\nsecond";
        let chunker = DocumentChunker::new(100).unwrap();
        let chunks = chunker.chunk(text, StructureKind::Unstructured);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "first\n\nsecond");
    }
}
