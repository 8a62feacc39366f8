//! The language/vision model seam.
//!
//! The pipeline never talks to a provider directly; it fans out over
//! [`ModelClient`], an object-safe trait with exactly the two call shapes
//! the pipeline needs: a structured-output vision call for block analysis
//! and a plain completion for page summaries. Tests inject an instrumented
//! mock through [`crate::ParseConfig::client`]; production resolves an
//! [`openai::OpenAiClient`] from the environment.

pub mod openai;

use crate::types::{BlockType, PageRecord};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from a single model call.
///
/// These never cross the library boundary directly: the analyzer absorbs
/// them per page, and the aggregator promotes a terminal one to
/// [`crate::error::ParseError::SummaryFailed`].
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level failure (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode model response: {0}")]
    Decode(String),

    /// The model explicitly declined to produce structured output.
    ///
    /// Distinct from [`ModelError::Decode`]: a refusal is a well-formed
    /// response and is never retried.
    #[error("Model refused to answer: {0}")]
    Refused(String),

    /// The response carried no choices or no content.
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// The call exceeded the configured timeout.
    #[error("Model call timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl ModelError {
    /// Whether retrying the same request can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ModelError::Refused(_))
    }
}

/// One block as decoded from the model's structured output, before it is
/// stamped with its originating page number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawBlock {
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub content: String,
    pub semantic_content: String,
}

/// Sampling controls for a plain completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: usize,
}

/// The two call shapes the pipeline requires of a model service.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Analyse one page (text + rendered image) into typed content blocks.
    ///
    /// # Errors
    ///
    /// [`ModelError::Refused`] when the model declines; any other variant
    /// for transport, API, or decoding failures.
    async fn extract_blocks(&self, page: &PageRecord) -> Result<Vec<RawBlock>, ModelError>;

    /// Run a plain completion with a system instruction and user content.
    async fn summarize(
        &self,
        system: &str,
        content: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError>;
}

/// JSON schema for the structured block-analysis response.
///
/// Sent as a strict `json_schema` response format so the model can only
/// produce items whose `type` is one of the twelve known block roles.
pub(crate) fn block_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "blocks": {
                "type": "array",
                "description": "List of document blocks",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "enum": BlockType::WIRE_NAMES,
                        },
                        "content": { "type": "string" },
                        "semantic_content": { "type": "string" },
                    },
                    "required": ["type", "content", "semantic_content"],
                    "additionalProperties": false,
                },
            },
        },
        "required": ["blocks"],
        "additionalProperties": false,
    })
}
