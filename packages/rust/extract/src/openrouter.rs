//! Model-assisted extraction through an OpenRouter chat-completions endpoint.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};

use marksync_shared::{MarksyncError, OpenRouterConfig, Record, Result};

use crate::PrimaryExtractor;

/// User-Agent string for extraction requests.
const USER_AGENT: &str = concat!("marksync/", env!("CARGO_PKG_VERSION"));

/// First brace-delimited span without a closing brace inside it.
static PAYLOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, serde::Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Sends a bounded prefix of each document to a hosted model and parses the
/// JSON object out of its reply.
pub struct OpenRouterExtractor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    max_prompt_chars: usize,
}

impl OpenRouterExtractor {
    pub fn new(config: &OpenRouterConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MarksyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            max_prompt_chars: config.max_prompt_chars,
        })
    }
}

#[async_trait]
impl PrimaryExtractor for OpenRouterExtractor {
    #[instrument(skip_all, fields(model = %self.model, chars = content.chars().count()))]
    async fn extract(&self, content: &str) -> Result<Record> {
        let prompt = build_prompt(content, self.max_prompt_chars);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MarksyncError::Extraction(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarksyncError::Extraction(format!("HTTP {status}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| MarksyncError::Extraction(format!("invalid response body: {e}")))?;

        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MarksyncError::Extraction("response has no message content".into()))?;

        debug!(reply_len = reply.len(), "model replied");
        parse_payload(&reply)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

// ---------------------------------------------------------------------------
// Prompt and payload helpers
// ---------------------------------------------------------------------------

/// Build the extraction prompt around the first `max_chars` characters.
fn build_prompt(content: &str, max_chars: usize) -> String {
    let excerpt = truncate_chars(content, max_chars);
    format!(
        "Extract the following trademark information from this document:\n\
         - Correspondent email\n\
         - Phone\n\
         - Correspondent name\n\
         - Date Cancelled\n\
         - US Serial Number\n\
         - Mark (trademark name)\n\
         - Goods & Services Description\n\
         \n\
         Document:\n\
         {excerpt}\n\
         \n\
         Return ONLY a JSON object with these exact keys:\n\
         {{\n  \"correspondent_email\": \"\",\n  \"phone\": \"\",\n  \"correspondent\": \"\",\n  \
         \"date_cancelled\": \"\",\n  \"us_serial_number\": \"\",\n  \"mark\": \"\",\n  \
         \"goods_services\": \"\"\n}}\n"
    )
}

/// Keep at most `max_chars` characters, never splitting a UTF-8 sequence.
fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Pull the first JSON-like object out of free-form model output.
pub(crate) fn parse_payload(reply: &str) -> Result<Record> {
    let span = PAYLOAD_RE
        .find(reply)
        .ok_or_else(|| MarksyncError::Extraction("no JSON object in reply".into()))?;

    serde_json::from_str(span.as_str())
        .map_err(|e| MarksyncError::Extraction(format!("unparseable JSON object: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(endpoint: String) -> OpenRouterConfig {
        OpenRouterConfig {
            endpoint,
            timeout_secs: 5,
            ..OpenRouterConfig::default()
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "gen-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    #[test]
    fn truncate_short_content() {
        assert_eq!(truncate_chars("short text", 100), "short text");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let content = "é".repeat(10);
        let truncated = truncate_chars(&content, 4);
        assert_eq!(truncated.chars().count(), 4);
        assert_eq!(truncated, "éééé");
    }

    #[test]
    fn prompt_contains_only_prefix() {
        let content = format!("{}TAILMARKER", "a".repeat(3000));
        let prompt = build_prompt(&content, 3000);
        assert!(!prompt.contains("TAILMARKER"));
        assert!(prompt.contains("\"goods_services\""));
    }

    #[test]
    fn payload_embedded_in_prose() {
        let reply = "Sure! Here is the data:\n```json\n{\"mark\": \"MOBILE FIRST\", \"phone\": \"(555) 567-8901\"}\n```";
        let record = parse_payload(reply).expect("parse");
        assert_eq!(record.mark, "MOBILE FIRST");
        assert_eq!(record.phone, "(555) 567-8901");
        assert_eq!(record.correspondent, "");
    }

    #[test]
    fn payload_missing() {
        let err = parse_payload("I could not find any trademark data.").unwrap_err();
        assert!(matches!(err, MarksyncError::Extraction(_)));
    }

    #[test]
    fn payload_malformed() {
        let err = parse_payload("{mark: MOBILE FIRST}").unwrap_err();
        assert!(err.to_string().contains("unparseable"));
    }

    #[tokio::test]
    async fn extracts_from_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/api/v1/chat/completions"))
            .and(wiremock::matchers::header("authorization", "Bearer test-key"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(completion(
                r#"{"correspondent_email": "emily.brown@trademarklaw.com", "correspondent": "Emily Brown", "us_serial_number": "86567890", "mark": "CLOUD CONNECT"}"#,
            )))
            .mount(&server)
            .await;

        let config = test_config(format!("{}/api/v1/chat/completions", server.uri()));
        let extractor = OpenRouterExtractor::new(&config, "test-key".into()).unwrap();

        let content = format!("{}TAILMARKER", "x".repeat(4000));
        let record = extractor.extract(&content).await.unwrap();
        assert_eq!(record.correspondent, "Emily Brown");
        assert_eq!(record.mark, "CLOUD CONNECT");
        assert_eq!(record.phone, "");

        // Only the bounded prefix went over the wire
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(!body.contains("TAILMARKER"));
        assert!(body.contains("anthropic/claude-3.5-sonnet"));
    }

    #[tokio::test]
    async fn http_error_is_extraction_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let config = test_config(format!("{}/api/v1/chat/completions", server.uri()));
        let extractor = OpenRouterExtractor::new(&config, "test-key".into()).unwrap();

        let err = extractor.extract("anything").await.unwrap_err();
        assert!(matches!(err, MarksyncError::Extraction(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn empty_choices_is_extraction_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let config = test_config(format!("{}/api/v1/chat/completions", server.uri()));
        let extractor = OpenRouterExtractor::new(&config, "test-key".into()).unwrap();

        let err = extractor.extract("anything").await.unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }
}
