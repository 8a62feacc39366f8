//! Configuration for a document parse.
//!
//! All parse behaviour is controlled through [`ParseConfig`], built via its
//! [`ParseConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across tasks and to diff two runs to understand why
//! their outputs differ.

use crate::error::ParseError;
use crate::model::ModelClient;
use std::fmt;
use std::sync::Arc;

/// Chunking granularity for the aggregation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkMode {
    /// One chunk per page that produced at least one block; the chunk's
    /// embedding text is a model-generated summary of the page. (default)
    #[default]
    Page,
    /// One chunk per block; the block's own semantic description becomes
    /// the embedding text. No extra model calls.
    Block,
}

/// Configuration for a document parse.
///
/// Built via [`ParseConfig::builder()`] or [`ParseConfig::default()`].
///
/// # Example
/// ```rust
/// use docparse::{ChunkMode, ParseConfig};
///
/// let config = ParseConfig::builder()
///     .concurrency(4)
///     .chunk_mode(ChunkMode::Block)
///     .model("gpt-4.1-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ParseConfig {
    /// Maximum simultaneous in-flight model calls per pipeline stage. Default: 10.
    ///
    /// Model APIs are network-bound, not CPU-bound; issuing 10 calls at once
    /// typically cuts wall-clock time by 8–9× over sequential analysis.
    /// Lower this if you hit rate-limit errors (`429`).
    pub concurrency: usize,

    /// Chunking strategy for the aggregation stage. Default: [`ChunkMode::Page`].
    pub chunk_mode: ChunkMode,

    /// Model identifier used for both analysis and summary calls.
    /// Default: "gpt-4.1-mini".
    pub model: String,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap independent of page size: an A0 poster rendered
    /// unconstrained could produce a 13 000 × 18 000 px image and exhaust
    /// memory. Either dimension is capped, scaling the other proportionally.
    pub max_rendered_pixels: u32,

    /// JPEG quality for page images, 1–100. Default: 80.
    pub jpeg_quality: u8,

    /// Maximum tokens the model may generate for a page summary. Default: 1024.
    pub summary_max_tokens: usize,

    /// Sampling temperature for summary generation. Default: 0.0.
    ///
    /// Zero keeps the embedding text deterministic: the same page always
    /// produces the same summary, which keeps stored vectors stable across
    /// re-parses.
    pub summary_temperature: f32,

    /// Maximum retry attempts on a transient model failure. Default: 3.
    ///
    /// Most 5xx and timeout errors under concurrent load are transient.
    /// Refusals are never retried.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles each attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-model-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Pre-constructed model client. Takes precedence over environment
    /// auto-configuration; this is how tests inject a mock.
    pub client: Option<Arc<dyn ModelClient>>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            chunk_mode: ChunkMode::default(),
            model: "gpt-4.1-mini".to_string(),
            max_rendered_pixels: 2000,
            jpeg_quality: 80,
            summary_max_tokens: 1024,
            summary_temperature: 0.0,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            client: None,
        }
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("concurrency", &self.concurrency)
            .field("chunk_mode", &self.chunk_mode)
            .field("model", &self.model)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("summary_temperature", &self.summary_temperature)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("client", &self.client.as_ref().map(|_| "<dyn ModelClient>"))
            .finish()
    }
}

impl ParseConfig {
    /// Create a new builder for `ParseConfig`.
    pub fn builder() -> ParseConfigBuilder {
        ParseConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ParseConfig`].
#[derive(Debug)]
pub struct ParseConfigBuilder {
    config: ParseConfig,
}

impl ParseConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn chunk_mode(mut self, mode: ChunkMode) -> Self {
        self.config.chunk_mode = mode;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn summary_temperature(mut self, t: f32) -> Self {
        self.config.summary_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParseConfig, ParseError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(ParseError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(ParseError::InvalidConfig(format!(
                "jpeg_quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.model.is_empty() {
            return Err(ParseError::InvalidConfig("model must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let c = ParseConfig::default();
        assert_eq!(c.concurrency, 10);
        assert_eq!(c.chunk_mode, ChunkMode::Page);
        assert_eq!(c.summary_max_tokens, 1024);
        assert_eq!(c.summary_temperature, 0.0);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ParseConfig::builder()
            .concurrency(0)
            .jpeg_quality(250)
            .summary_temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.jpeg_quality, 100);
        assert_eq!(c.summary_temperature, 2.0);
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = ParseConfig::builder().model("").build().unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn debug_does_not_require_client_debug() {
        let c = ParseConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("concurrency"));
    }
}
