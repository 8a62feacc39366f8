//! The document parsing pipeline, one module per stage.
//!
//! ```text
//! PDF bytes
//!     │  extract::extract_pages        (blocking: pdfium render + encode)
//!     ▼
//! Vec<PageRecord>                      (text + base64 JPEG per page)
//!     │  analyze::analyze_pages        (concurrent vision model calls)
//!     ▼
//! Vec<DocumentBlock>                   (typed blocks, page-ordered)
//!     │  chunk::build_chunks           (page grouping + summaries, or
//!     ▼                                 per-block passthrough)
//! Vec<DocumentChunk>
//! ```
//!
//! Stages are plain async functions over owned data so each can be driven
//! and tested in isolation; `crate::parse` wires them together.

pub mod analyze;
pub mod chunk;
pub mod extract;
