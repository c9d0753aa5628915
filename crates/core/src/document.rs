//! Document and structure classification domain types.
//!
//! A `Document` is loaded once by the calling workflow and is read-only for
//! the lifetime of a processing session. The detected `StructureKind` is
//! derived from content, never stored persistently.

use serde::{Deserialize, Serialize};

/// A document to be processed. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The raw text content
    pub content: String,

    /// Declared title, if the loader provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Structure kind detected at load time, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureKind>,
}

impl Document {
    /// Create a document from raw text with no metadata.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            structure: None,
        }
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Length of the content in characters.
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// How a document's internal structure was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Explicit "--- Page N ---" style markers
    PageMarked,
    /// "Chapter N" / Roman numeral / ALL-CAPS heading markers
    ChapterMarked,
    /// No recognized structure; paragraph-level splitting applies
    Unstructured,
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StructureKind::PageMarked => "page-marked",
            StructureKind::ChapterMarked => "chapter-marked",
            StructureKind::Unstructured => "unstructured",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_from_text_has_no_metadata() {
        let doc = Document::from_text("hello world");
        assert_eq!(doc.content, "hello world");
        assert!(doc.title.is_none());
        assert!(doc.structure.is_none());
    }

    #[test]
    fn structure_kind_display() {
        assert_eq!(StructureKind::PageMarked.to_string(), "page-marked");
        assert_eq!(StructureKind::Unstructured.to_string(), "unstructured");
    }

    #[test]
    fn len_chars_counts_characters_not_bytes() {
        let doc = Document::from_text("héllo");
        assert_eq!(doc.len_chars(), 5);
    }
}
