//! Top-level entry points: drive the full pipeline over a byte buffer.

use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::model::openai::OpenAiClient;
use crate::model::ModelClient;
use crate::pipeline::{analyze, chunk, extract};
use crate::types::ParsedDocument;
use std::sync::Arc;
use tracing::{error, info};

/// Parse a PDF document into typed, embedding-ready chunks.
///
/// Runs the full pipeline: page extraction, concurrent block analysis, and
/// chunk aggregation per `config.chunk_mode`. Pages whose analysis fails
/// are skipped with a warning; see [`ParseError`] for the failures that
/// abort the parse.
///
/// # Errors
///
/// * [`ParseError::LoadFailed`] / [`ParseError::ExtractionFailed`]: the
///   input could not be read or a page could not be rendered.
/// * [`ParseError::ModelNotConfigured`]: no client was injected and
///   `OPENAI_API_KEY` is unset.
/// * [`ParseError::SummaryFailed`]: a page summary failed in page mode.
pub async fn parse_document(
    bytes: &[u8],
    config: &ParseConfig,
) -> Result<ParsedDocument, ParseError> {
    match run_pipeline(bytes, config).await {
        Ok(document) => Ok(document),
        Err(e) => {
            error!(error = %e, "document parse failed");
            Err(e)
        }
    }
}

async fn run_pipeline(bytes: &[u8], config: &ParseConfig) -> Result<ParsedDocument, ParseError> {
    let client = resolve_client(config)?;

    let pages = extract::extract_pages(bytes.to_vec(), config).await?;
    info!(pages = pages.len(), "extraction complete");

    let blocks = analyze::analyze_pages(&client, &pages, config).await;
    info!(blocks = blocks.len(), "analysis complete");

    let chunks = chunk::build_chunks(&client, blocks, config).await?;
    info!(chunks = chunks.len(), "aggregation complete");

    Ok(ParsedDocument { chunks })
}

/// Blocking wrapper around [`parse_document`] for synchronous callers.
///
/// Builds a throwaway multi-thread runtime; do not call from inside an
/// existing tokio runtime.
pub fn parse_document_sync(
    bytes: &[u8],
    config: &ParseConfig,
) -> Result<ParsedDocument, ParseError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ParseError::Internal(format!("failed to build runtime: {e}")))?;
    runtime.block_on(parse_document(bytes, config))
}

/// Resolve the model client: an injected one wins, otherwise build from
/// the environment.
fn resolve_client(config: &ParseConfig) -> Result<Arc<dyn ModelClient>, ParseError> {
    if let Some(client) = &config.client {
        return Ok(Arc::clone(client));
    }
    OpenAiClient::from_env(config.model.clone(), config.api_timeout_secs)
        .map(|c| Arc::new(c) as Arc<dyn ModelClient>)
        .ok_or_else(|| ParseError::ModelNotConfigured {
            hint: "Set OPENAI_API_KEY (and optionally OPENAI_BASE_URL), or inject a \
                   client via ParseConfig::builder().client(...)."
                .to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_client_and_env_is_reported() {
        if std::env::var("OPENAI_API_KEY").is_ok() {
            eprintln!("skipping: OPENAI_API_KEY set in environment");
            return;
        }
        let config = ParseConfig::default();
        let err = parse_document(b"%PDF-1.4", &config).await.unwrap_err();
        assert!(matches!(err, ParseError::ModelNotConfigured { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
