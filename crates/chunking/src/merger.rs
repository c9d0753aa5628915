//! Reassembly of chunk-level results into one document.
//!
//! The merger tolerates unsorted callers: it sorts by chunk index before
//! concatenating, but records the anomaly so the caller can see that its
//! sequence arrived out of order. Chunk content is never altered.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One processed chunk handed back for merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Index of the source chunk this result belongs to
    pub chunk_index: usize,

    /// The processed content
    pub content: String,
}

impl ChunkResult {
    pub fn new(chunk_index: usize, content: impl Into<String>) -> Self {
        Self {
            chunk_index,
            content: content.into(),
        }
    }
}

/// The outcome of a merge.
#[derive(Debug, Clone)]
pub struct MergedOutput {
    /// The merged document text
    pub text: String,

    /// Whether the input sequence arrived with non-monotonic chunk indices
    pub out_of_order: bool,
}

/// Merge chunk results into one document with section headers.
///
/// Section headers are labeled by 1-based sequential position, independent
/// of the original chunk indices, so merged output stays stable and
/// human-navigable even when indices are sparse.
pub fn merge(mut results: Vec<ChunkResult>) -> MergedOutput {
    let out_of_order = results
        .windows(2)
        .any(|pair| pair[1].chunk_index <= pair[0].chunk_index);
    if out_of_order {
        warn!("Chunk results arrived out of order; sorting before merge");
    }

    results.sort_by_key(|r| r.chunk_index);

    let text = results
        .iter()
        .enumerate()
        .map(|(position, r)| format!("=== Section {} ===\n{}", position + 1, r.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    MergedOutput { text, out_of_order }
}

/// Merge chunk results with a plain separator and no headers.
pub fn merge_plain(results: &[ChunkResult], separator: &str) -> String {
    results
        .iter()
        .map(|r| r.content.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_result_gets_one_header() {
        let merged = merge(vec![ChunkResult::new(0, "body text")]);
        assert_eq!(merged.text, "=== Section 1 ===\nbody text");
        assert!(!merged.out_of_order);
    }

    #[test]
    fn headers_use_sequential_position_not_chunk_index() {
        let merged = merge(vec![
            ChunkResult::new(3, "third"),
            ChunkResult::new(7, "seventh"),
        ]);
        assert!(merged.text.contains("=== Section 1 ===\nthird"));
        assert!(merged.text.contains("=== Section 2 ===\nseventh"));
        assert!(!merged.text.contains("Section 3"));
    }

    #[test]
    fn unsorted_input_is_sorted_and_flagged() {
        let merged = merge(vec![
            ChunkResult::new(2, "second"),
            ChunkResult::new(1, "first"),
        ]);
        assert!(merged.out_of_order);
        let first_pos = merged.text.find("first").unwrap();
        let second_pos = merged.text.find("second").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn content_is_never_altered() {
        let content = "  weird   spacing\nand newlines  ";
        let merged = merge(vec![ChunkResult::new(0, content)]);
        assert!(merged.text.ends_with(content));
    }

    #[test]
    fn plain_merge_joins_with_separator() {
        let results = vec![ChunkResult::new(0, "a"), ChunkResult::new(1, "b")];
        assert_eq!(merge_plain(&results, "\n\n"), "a\n\nb");
    }

    #[test]
    fn empty_input_merges_to_empty() {
        let merged = merge(Vec::new());
        assert!(merged.text.is_empty());
        assert!(!merged.out_of_order);
    }
}
