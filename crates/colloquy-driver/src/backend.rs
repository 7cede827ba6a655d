use crate::config::GenerationConfig;
use async_trait::async_trait;
use colloquy_core::{ColloquyError, ColloquyResult, Message, Role};
use serde::Serialize;

/// The external generation API, abstracted for testing: ordered message
/// history plus an optional system instruction in, one text blob out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Requests one completion. The reply is returned verbatim — no parsing,
    /// validation, or structural guarantee.
    async fn generate(
        &self,
        system: Option<&str>,
        messages: &[Message],
        max_tokens: u32,
    ) -> ColloquyResult<String>;
}

/// Claude (Anthropic) messages-endpoint backend.
pub struct ClaudeBackend {
    config: GenerationConfig,
    http: reqwest::Client,
}

impl ClaudeBackend {
    /// Creates a backend with a fresh HTTP client.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextGenerator for ClaudeBackend {
    async fn generate(
        &self,
        system: Option<&str>,
        messages: &[Message],
        max_tokens: u32,
    ) -> ColloquyResult<String> {
        let url = format!("{}/v1/messages", self.config.base_url());

        let api_messages: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: m.content.clone(),
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": max_tokens,
            "messages": api_messages,
        });
        if let Some(sys) = system {
            body["system"] = serde_json::json!(sys);
        }

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ColloquyError::Http(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ColloquyError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(ColloquyError::Http(format!(
                "generation API error {status}: {resp_body}"
            )));
        }

        parse_response(&resp_body)
    }
}

// -- wire types --

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

/// Extracts the text blocks from a messages-endpoint response body.
fn parse_response(body: &serde_json::Value) -> ColloquyResult<String> {
    let content = body["content"]
        .as_array()
        .ok_or_else(|| ColloquyError::Http("missing content in generation response".into()))?;

    let text: Vec<&str> = content
        .iter()
        .filter(|block| block["type"].as_str() == Some("text"))
        .filter_map(|block| block["text"].as_str())
        .collect();

    if text.is_empty() {
        return Err(ColloquyError::Http(
            "generation response contained no text blocks".into(),
        ));
    }
    Ok(text.join("\n"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> ClaudeBackend {
        ClaudeBackend::new(GenerationConfig {
            model_id: "test-model".into(),
            api_key: "test-key".into(),
            api_base_url: Some(server.uri()),
        })
    }

    #[test]
    fn parse_response_joins_text_blocks() {
        let body = serde_json::json!({
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"},
            ]
        });
        assert_eq!(parse_response(&body).unwrap(), "first\nsecond");
    }

    #[test]
    fn parse_response_without_content_is_an_error() {
        let body = serde_json::json!({"id": "msg_123"});
        assert!(matches!(
            parse_response(&body).unwrap_err(),
            ColloquyError::Http(_)
        ));
    }

    #[tokio::test]
    async fn generate_sends_history_and_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Thanks for sharing!"}]
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let history = vec![Message::user("The workshop was great")];
        let reply = backend
            .generate(Some("You are an interviewer."), &history, 2000)
            .await
            .unwrap();
        assert_eq!(reply, "Thanks for sharing!");
    }

    #[tokio::test]
    async fn generate_maps_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"type": "rate_limit_error"}
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let err = backend
            .generate(None, &[Message::user("hi")], 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ColloquyError::Http(_)));
        assert!(err.to_string().contains("429"));
    }
}
