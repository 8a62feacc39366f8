//! # docparse
//!
//! Parse PDF documents into typed, embedding-ready chunks using Vision
//! Language Models.
//!
//! Every page is rendered to an image and analysed by a vision model under
//! a strict structured-output schema, yielding classified content blocks
//! (titles, paragraphs, tables as HTML, figures, key-value pairs, …).
//! Blocks are then aggregated into retrieval chunks, either one per page
//! (with a model-generated summary as embedding text) or one per block.
//!
//! ## Pipeline
//!
//! ```text
//! PDF bytes ──► Page Extractor ──► Block Analyzer ──► Chunk Aggregator ──► ParsedDocument
//!               (pdfium render,    (concurrent vision  (page summaries or
//!                text + JPEG)       model calls)        block passthrough)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use docparse::{parse_document, ChunkMode, ParseConfig};
//!
//! # async fn run() -> Result<(), docparse::ParseError> {
//! let bytes = std::fs::read("report.pdf").expect("read input");
//! let config = ParseConfig::builder()
//!     .chunk_mode(ChunkMode::Page)
//!     .concurrency(10)
//!     .build()?;
//! // Requires OPENAI_API_KEY, or inject a client via the builder.
//! let document = parse_document(&bytes, &config).await?;
//! println!("{} chunks, {} blocks", document.chunks.len(), document.block_count());
//! # Ok(())
//! # }
//! ```
//!
//! Pages whose analysis fails after retries are skipped with a warning
//! rather than failing the document; see [`ParseError`] for the failures
//! that do abort a parse.

pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod types;

pub use config::{ChunkMode, ParseConfig, ParseConfigBuilder};
pub use error::ParseError;
pub use model::{openai::OpenAiClient, CompletionOptions, ModelClient, ModelError, RawBlock};
pub use parse::{parse_document, parse_document_sync};
pub use types::{BlockType, DocumentBlock, DocumentChunk, PageRecord, ParsedDocument};
