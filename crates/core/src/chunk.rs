//! Chunk domain types.
//!
//! A `Chunk` is one bounded, ordered slice of a larger document, tagged with
//! how its boundary was determined. Chunks of one chunking operation,
//! concatenated in index order, reconstruct the original content modulo
//! whitespace normalization at split points.

use serde::{Deserialize, Serialize};

/// One bounded slice of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the chunk sequence, starting at 0
    pub index: usize,

    /// The slice content. Never empty.
    pub content: String,

    /// Token estimate for the content (chars / 4, rounded up)
    pub approx_token_count: usize,

    /// How the boundary of this chunk was determined
    pub boundary: BoundaryKind,
}

impl Chunk {
    /// Build a chunk, deriving the token estimate from the content.
    pub fn new(index: usize, content: impl Into<String>, boundary: BoundaryKind) -> Self {
        let content = content.into();
        let approx_token_count = estimate_tokens(&content);
        Self {
            index,
            content,
            approx_token_count,
            boundary,
        }
    }
}

/// How a chunk's boundary was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Split at a page marker
    PageBoundary,
    /// Split at a chapter heading
    ChapterBoundary,
    /// Split at a blank-line paragraph break
    ParagraphBoundary,
    /// A single indivisible unit exceeded the size bound
    ForcedSplit,
}

impl std::fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BoundaryKind::PageBoundary => "page",
            BoundaryKind::ChapterBoundary => "chapter",
            BoundaryKind::ParagraphBoundary => "paragraph",
            BoundaryKind::ForcedSplit => "forced-split",
        };
        write!(f, "{s}")
    }
}

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up. This approximation is
/// accurate within ~10% for BPE tokenizers (GPT-3.5, GPT-4, Claude) on
/// English text.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.chars().count() + 3) / 4
}
