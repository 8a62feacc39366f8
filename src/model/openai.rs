//! OpenAI-compatible implementation of [`ModelClient`] over reqwest.
//!
//! Block analysis uses the `chat/completions` endpoint with a strict
//! `json_schema` response format; the page image travels inline as a
//! base64 data URI content part. A populated `refusal` field on the
//! response message maps to [`ModelError::Refused`], the one failure the
//! pipeline treats differently from a transport or decode error.

use super::{block_response_schema, CompletionOptions, ModelClient, ModelError, RawBlock};
use crate::prompts::{page_image_label, page_text_message, BLOCK_ANALYSIS_PROMPT};
use crate::types::PageRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model client backed by an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiClient {
    #[must_use]
    pub fn new(
        api_key: String,
        mut base_url: String,
        model: String,
        timeout_secs: u64,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build a client from `OPENAI_API_KEY` (and optional `OPENAI_BASE_URL`).
    ///
    /// Returns `None` when no non-empty API key is present.
    pub fn from_env(model: impl Into<String>, timeout_secs: u64) -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Some(Self::new(api_key, base_url, model.into(), timeout_secs))
    }

    async fn post_chat<B: Serialize>(&self, body: &B) -> Result<ChatResponse, ModelError> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ModelError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        let status = response.status();
        let text = response.text().await.map_err(ModelError::Http)?;

        if !status.is_success() {
            error!("model API error {status}: {text}");
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn extract_blocks(&self, page: &PageRecord) -> Result<Vec<RawBlock>, ModelError> {
        let messages = vec![
            ApiMessage::text("system", BLOCK_ANALYSIS_PROMPT.to_string()),
            ApiMessage::text("user", page_text_message(page.page_num, &page.text)),
            ApiMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: page_image_label(page.page_num),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", page.image_base64),
                        },
                    },
                ],
            },
        ];

        let body = StructuredChatRequest {
            model: &self.model,
            messages,
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "document_blocks",
                    schema: block_response_schema(),
                    strict: true,
                },
            },
        };

        let resp = self.post_chat(&body).await?;
        let message = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(ModelError::EmptyResponse)?;

        if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
            return Err(ModelError::Refused(refusal));
        }

        let content = message
            .content
            .filter(|c| !c.is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        let parsed: BlockListResponse =
            serde_json::from_str(&content).map_err(|e| ModelError::Decode(e.to_string()))?;
        debug!(
            page = page.page_num,
            blocks = parsed.blocks.len(),
            "decoded structured block response"
        );
        Ok(parsed.blocks)
    }

    async fn summarize(
        &self,
        system: &str,
        content: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                PlainMessage {
                    role: "system",
                    content: system,
                },
                PlainMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let resp = self.post_chat(&body).await?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

impl ApiMessage {
    fn text(role: &'static str, text: String) -> Self {
        Self {
            role,
            content: vec![ContentPart::Text { text }],
        }
    }
}

#[derive(Serialize)]
struct StructuredChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    r#type: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Serialize)]
struct PlainMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<PlainMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct BlockListResponse {
    blocks: Vec<RawBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;

    fn test_client() -> OpenAiClient {
        OpenAiClient::new(
            "sk-test-key".into(),
            "https://api.openai.com/v1/".into(),
            "gpt-4.1-mini".into(),
            60,
        )
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(test_client().base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn debug_redacts_api_key() {
        let s = format!("{:?}", test_client());
        assert!(!s.contains("sk-test-key"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn structured_request_serialisation() {
        let body = StructuredChatRequest {
            model: "gpt-4.1-mini",
            messages: vec![ApiMessage::text("system", "prompt".into())],
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "document_blocks",
                    schema: block_response_schema(),
                    strict: true,
                },
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"type\":\"json_schema\""));
        assert!(json.contains("\"strict\":true"));
        assert!(json.contains("\"name\":\"document_blocks\""));
    }

    #[test]
    fn image_part_uses_data_uri() {
        let part = ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/jpeg;base64,AAAA".into(),
            },
        };
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"image_url\""));
        assert!(json.contains("data:image/jpeg;base64,AAAA"));
    }

    #[test]
    fn completion_request_carries_sampling_controls() {
        let body = CompletionRequest {
            model: "gpt-4.1-mini",
            messages: vec![],
            temperature: 0.0,
            max_tokens: 1024,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"temperature\":0.0"));
        assert!(json.contains("\"max_tokens\":1024"));
    }

    #[test]
    fn parse_response_with_refusal() {
        let json = r#"{"choices":[{"message":{"content":null,"refusal":"I can't help with that"}}]}"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        let msg = &resp.choices[0].message;
        assert!(msg.content.is_none());
        assert_eq!(msg.refusal.as_deref(), Some("I can't help with that"));
    }

    #[test]
    fn parse_block_list_content() {
        let content = r#"{"blocks":[{"type":"Title","content":"Annual Report","semantic_content":"Document title"}]}"#;
        let parsed: BlockListResponse = serde_json::from_str(content).unwrap();
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].kind, BlockType::Title);
    }

    #[test]
    fn from_env_requires_key() {
        // Guard against a key leaking in from the test environment.
        if std::env::var("OPENAI_API_KEY").is_err() {
            assert!(OpenAiClient::from_env("gpt-4.1-mini", 60).is_none());
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_errors() {
        let client = OpenAiClient::new("key".into(), "http://127.0.0.1:1".into(), "m".into(), 5);
        let opts = CompletionOptions {
            temperature: 0.0,
            max_tokens: 16,
        };
        assert!(client.summarize("sys", "user", &opts).await.is_err());
    }
}
