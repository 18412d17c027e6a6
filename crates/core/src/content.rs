//! Content briefs and documents: status values and text helpers.
//!
//! Status constants must match the CHECK constraints on
//! `content_briefs.status` and `documents.status`.

/// Content brief lifecycle.
pub mod brief_status {
    pub const DRAFT: &str = "draft";
    pub const GENERATING: &str = "generating";
    pub const READY: &str = "ready";
    pub const FAILED: &str = "failed";
}

/// Document workflow states.
pub mod document_status {
    pub const DRAFT: &str = "draft";
    pub const IN_REVIEW: &str = "in_review";
    pub const PUBLISHED: &str = "published";

    pub const ALL: &[&str] = &[DRAFT, IN_REVIEW, PUBLISHED];
}

/// Whether `status` is a known document status.
pub fn is_valid_document_status(status: &str) -> bool {
    document_status::ALL.contains(&status)
}

/// Count whitespace-separated words, ignoring Markdown heading and list markers.
pub fn word_count(text: &str) -> i32 {
    let count = text
        .split_whitespace()
        .filter(|w| !w.chars().all(|c| matches!(c, '#' | '-' | '*' | '>' | '|')))
        .count();
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_ignores_markdown_markers() {
        let text = "# Title\n\n- first point\n* second point\n> quote here";
        assert_eq!(word_count(text), 7);
    }

    #[test]
    fn empty_text_has_no_words() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  \n\t "), 0);
    }

    #[test]
    fn document_statuses_are_validated() {
        assert!(is_valid_document_status("in_review"));
        assert!(!is_valid_document_status("archived"));
    }
}
