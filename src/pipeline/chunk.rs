//! Chunk aggregation: group analysed blocks into retrieval-ready chunks.
//!
//! Block mode is a pure transformation. Page mode groups blocks by page and
//! adds one model call per page to produce the chunk's embedding text; a
//! summary that cannot be generated fails the parse, because a chunk
//! without embedding text is useless to retrieval consumers.

use crate::config::{ChunkMode, ParseConfig};
use crate::error::ParseError;
use crate::model::{CompletionOptions, ModelClient};
use crate::pipeline::analyze::call_with_retries;
use crate::prompts::PAGE_SUMMARY_PROMPT;
use crate::types::{DocumentBlock, DocumentChunk};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Aggregate blocks into chunks according to `config.chunk_mode`.
///
/// # Errors
///
/// Page mode returns [`ParseError::SummaryFailed`] when any page's summary
/// call fails terminally; the failing page's siblings still run to
/// completion first. Block mode is infallible in practice but keeps the
/// same signature.
pub async fn build_chunks(
    client: &Arc<dyn ModelClient>,
    blocks: Vec<DocumentBlock>,
    config: &ParseConfig,
) -> Result<Vec<DocumentChunk>, ParseError> {
    match config.chunk_mode {
        ChunkMode::Block => Ok(block_chunks(blocks)),
        ChunkMode::Page => page_chunks(client, blocks, config).await,
    }
}

/// One chunk per block; the block's own semantic description doubles as
/// the embedding text.
fn block_chunks(blocks: Vec<DocumentBlock>) -> Vec<DocumentChunk> {
    blocks
        .into_iter()
        .map(|block| DocumentChunk {
            content: block.content.clone(),
            embed: block.semantic_content.clone(),
            blocks: vec![block],
        })
        .collect()
}

/// One chunk per page, with a model-generated summary as embedding text.
async fn page_chunks(
    client: &Arc<dyn ModelClient>,
    blocks: Vec<DocumentBlock>,
    config: &ParseConfig,
) -> Result<Vec<DocumentChunk>, ParseError> {
    let pages = group_by_page(blocks);
    let options = CompletionOptions {
        temperature: config.summary_temperature,
        max_tokens: config.summary_max_tokens,
    };

    let mut results: Vec<Result<(usize, DocumentChunk), ParseError>> =
        stream::iter(pages.into_iter())
            .map(|(page_num, page_blocks)| {
                let client = Arc::clone(client);
                async move {
                    let content = joined_content(&page_blocks);
                    let embed = call_with_retries(
                        || client.summarize(PAGE_SUMMARY_PROMPT, &content, &options),
                        config.max_retries,
                        config.retry_backoff_ms,
                    )
                    .await
                    .map_err(|e| ParseError::SummaryFailed {
                        page: page_num,
                        detail: e.to_string(),
                    })?;
                    debug!(page = page_num, embed_chars = embed.len(), "page summarised");
                    Ok((
                        page_num,
                        DocumentChunk {
                            content,
                            embed,
                            blocks: page_blocks,
                        },
                    ))
                }
            })
            .buffer_unordered(config.concurrency)
            .collect()
            .await;

    // Let every summary finish, then surface the lowest failing page.
    results.sort_by_key(|r| match r {
        Ok((page_num, _)) => *page_num,
        Err(ParseError::SummaryFailed { page, .. }) => *page,
        Err(_) => 0,
    });
    results
        .into_iter()
        .map(|r| r.map(|(_, chunk)| chunk))
        .collect()
}

/// Group blocks by page, ascending, preserving in-page order.
fn group_by_page(blocks: Vec<DocumentBlock>) -> BTreeMap<usize, Vec<DocumentBlock>> {
    let mut pages: BTreeMap<usize, Vec<DocumentBlock>> = BTreeMap::new();
    for block in blocks {
        pages.entry(block.page_num).or_default().push(block);
    }
    pages
}

/// Newline-join the non-empty block contents of a page.
///
/// Image blocks carry empty content and would otherwise inject blank lines.
fn joined_content(blocks: &[DocumentBlock]) -> String {
    blocks
        .iter()
        .filter(|b| !b.content.is_empty())
        .map(|b| b.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
