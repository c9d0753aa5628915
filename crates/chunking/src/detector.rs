//! Document structure detection.
//!
//! Classifies raw text as page-marked, chapter-marked, or unstructured.
//! Pure function of content; absence of structure is a valid outcome,
//! not a failure.

use librarian_core::StructureKind;

/// Classify a document's structure.
///
/// Decision policy, in priority order:
/// 1. At least two page-marker lines ("Page N" / "--- Page N ---") ⇒ `PageMarked`
/// 2. At least two chapter headings ("Chapter N", a Roman numeral heading,
///    or an ALL-CAPS token followed by a number) ⇒ `ChapterMarked`
/// 3. Otherwise ⇒ `Unstructured`
pub fn detect(text: &str) -> StructureKind {
    let mut page_markers = 0usize;
    let mut chapter_headings = 0usize;

    for line in text.lines() {
        if is_page_marker(line) {
            page_markers += 1;
        } else if is_chapter_heading(line) {
            chapter_headings += 1;
        }
    }

    if page_markers >= 2 {
        StructureKind::PageMarked
    } else if chapter_headings >= 2 {
        StructureKind::ChapterMarked
    } else {
        StructureKind::Unstructured
    }
}

/// Whether a line is an explicit page marker: an optional run of dashes,
/// the word "Page", a number, and nothing else but dashes.
pub(crate) fn is_page_marker(line: &str) -> bool {
    let t = line.trim().trim_start_matches('-').trim_start();
    let Some(rest) = t.strip_prefix("Page") else {
        return false;
    };
    let rest = rest.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    rest[digits.len()..].trim().trim_matches('-').trim().is_empty()
}

/// Whether a line is a chapter heading.
pub(crate) fn is_chapter_heading(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty() {
        return false;
    }

    // "Chapter 3" / "CHAPTER IV"
    if let Some(rest) = t.strip_prefix("Chapter ").or_else(|| t.strip_prefix("CHAPTER ")) {
        let rest = rest.trim();
        return starts_with_number(rest) || is_roman_numeral(rest.trim_end_matches('.'));
    }

    // A bare Roman numeral heading, e.g. "XIV." on its own line
    if is_roman_numeral(t.trim_end_matches('.')) {
        return true;
    }

    // ALL-CAPS token followed by a number, e.g. "SECTION 3"
    let mut parts = t.split_whitespace();
    if let (Some(word), Some(num), None) = (parts.next(), parts.next(), parts.next()) {
        let caps = word.len() >= 2 && word.chars().all(|c| c.is_ascii_uppercase());
        let numeric = !num.is_empty() && num.chars().all(|c| c.is_ascii_digit());
        return caps && numeric;
    }

    false
}

fn starts_with_number(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn is_roman_numeral(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| matches!(c, 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'))
}
