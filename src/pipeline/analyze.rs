//! Block analysis: fan pages out to the model, fan typed blocks back in.
//!
//! Failure tolerance lives here. A page whose analysis fails after retries
//! (or is refused outright) contributes zero blocks and is logged at WARN;
//! it never aborts the document. The concurrency gate is owned by each
//! invocation, so two documents parsed with separate configs do not share
//! a budget.

use crate::config::ParseConfig;
use crate::model::{ModelClient, ModelError, RawBlock};
use crate::types::{DocumentBlock, PageRecord};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Analyse every page concurrently and return all blocks in page order.
///
/// At most `config.concurrency` model calls are in flight at once. Within
/// a page, blocks keep the order the model emitted them; across pages,
/// results are sorted by page number regardless of completion order.
pub async fn analyze_pages(
    client: &Arc<dyn ModelClient>,
    pages: &[PageRecord],
    config: &ParseConfig,
) -> Vec<DocumentBlock> {
    let mut per_page: Vec<(usize, Vec<DocumentBlock>)> = stream::iter(pages)
        .map(|page| {
            let client = Arc::clone(client);
            async move {
                let blocks = analyze_one_page(&client, page, config).await;
                (page.page_num, blocks)
            }
        })
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    per_page.sort_by_key(|(page_num, _)| *page_num);
    per_page
        .into_iter()
        .flat_map(|(_, blocks)| blocks)
        .collect()
}

/// Analyse a single page, retrying transient failures.
///
/// Terminal failure degrades to an empty block list.
async fn analyze_one_page(
    client: &Arc<dyn ModelClient>,
    page: &PageRecord,
    config: &ParseConfig,
) -> Vec<DocumentBlock> {
    match call_with_retries(
        || client.extract_blocks(page),
        config.max_retries,
        config.retry_backoff_ms,
    )
    .await
    {
        Ok(raw) => {
            debug!(page = page.page_num, blocks = raw.len(), "page analysed");
            stamp_page(page.page_num, raw)
        }
        Err(e) => {
            warn!(page = page.page_num, error = %e, "page analysis failed, skipping page");
            Vec::new()
        }
    }
}

/// Retry a model call with exponential backoff.
///
/// `max_retries` counts attempts after the first. Non-retryable errors
/// (refusals) return immediately.
pub(crate) async fn call_with_retries<T, F, Fut>(
    mut call: F,
    max_retries: u32,
    backoff_ms: u64,
) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ModelError>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                let delay = backoff_ms.saturating_mul(1 << (attempt - 1));
                warn!(attempt, delay_ms = delay, error = %e, "model call failed, retrying");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Stamp raw model output with its originating page number.
fn stamp_page(page_num: usize, raw: Vec<RawBlock>) -> Vec<DocumentBlock> {
    raw.into_iter()
        .map(|b| DocumentBlock {
            kind: b.kind,
            page_num,
            content: b.content,
            semantic_content: b.semantic_content,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn stamping_preserves_order_and_content() {
        let raw = vec![
            RawBlock {
                kind: BlockType::Title,
                content: "Report".into(),
                semantic_content: "title".into(),
            },
            RawBlock {
                kind: BlockType::Text,
                content: "Body".into(),
                semantic_content: "paragraph".into(),
            },
        ];
        let blocks = stamp_page(7, raw);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.page_num == 7));
        assert_eq!(blocks[0].kind, BlockType::Title);
        assert_eq!(blocks[1].content, "Body");
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = call_with_retries(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ModelError::EmptyResponse)
                    } else {
                        Ok(42)
                    }
                }
            },
            3,
            1,
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn refusal_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = call_with_retries(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ModelError::Refused("policy".into())) }
            },
            5,
            1,
        )
        .await;
        assert!(matches!(result, Err(ModelError::Refused(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = call_with_retries(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ModelError::Api {
                        status: 500,
                        message: "boom".into(),
                    })
                }
            },
            2,
            1,
        )
        .await;
        assert!(matches!(result, Err(ModelError::Api { status: 500, .. })));
        // First attempt plus two retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
