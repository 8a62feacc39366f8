//! Error types for the docparse library.
//!
//! Two distinct error types reflect two distinct failure surfaces:
//!
//! * [`ParseError`]: fatal. The parse cannot produce a document at all
//!   (unreadable input, page render failure, no model configured, a page
//!   summary that could not be generated). Returned as `Err(ParseError)`
//!   from the top-level `parse_document*` functions; no partial
//!   [`crate::ParsedDocument`] accompanies it.
//!
//! * [`crate::model::ModelError`]: call-level. A single model request
//!   failed or was refused. During block analysis these are absorbed per
//!   page (the page simply yields no blocks); during chunk aggregation a
//!   terminal one is promoted to [`ParseError::SummaryFailed`].

use thiserror::Error;

/// All fatal errors returned by the docparse library.
///
/// Per-page analysis failures never appear here; they degrade to an empty
/// block set for the affected page (see `pipeline::analyze`).
#[derive(Debug, Error)]
pub enum ParseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input bytes are not a parseable PDF document.
    #[error("Failed to load document: {detail}")]
    LoadFailed { detail: String },

    /// A page could not be rendered or encoded.
    ///
    /// Not expected on a well-formed document; aborts the whole parse.
    #[error("Page {page}: extraction failed: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No model client was injected and none could be built from the
    /// environment.
    #[error("No model client configured.\n{hint}")]
    ModelNotConfigured { hint: String },

    /// A page's embedding summary could not be generated during page-mode
    /// aggregation. Fails the whole aggregation, since a chunk without its
    /// embedding text is useless to retrieval consumers.
    #[error("Page {page}: summary generation failed: {detail}")]
    SummaryFailed { page: usize, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a worker task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failed_display() {
        let e = ParseError::LoadFailed {
            detail: "bad xref table".into(),
        };
        assert!(e.to_string().contains("bad xref table"));
    }

    #[test]
    fn extraction_failed_names_page() {
        let e = ParseError::ExtractionFailed {
            page: 4,
            detail: "render error".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 4"), "got: {msg}");
        assert!(msg.contains("render error"));
    }

    #[test]
    fn summary_failed_names_page() {
        let e = ParseError::SummaryFailed {
            page: 2,
            detail: "timeout".into(),
        };
        assert!(e.to_string().contains("Page 2"));
    }

    #[test]
    fn model_not_configured_carries_hint() {
        let e = ParseError::ModelNotConfigured {
            hint: "Set OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }
}
