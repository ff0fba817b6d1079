use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::ChatService;
use crate::models::DEFAULT_UPSTREAM_TIMEOUT;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

pub struct GeminiChatClient {
    http: GeminiHttpClient,
    system_instruction: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                DEFAULT_UPSTREAM_TIMEOUT,
                client,
            ),
            system_instruction: prompts::CHAT_SYSTEM.trim().to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }
}

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn converse(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            system_instruction: Content::text(None, self.system_instruction.as_str()),
            contents: vec![Content::text(Some("user"), prompt)],
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .text()
            .ok_or_else(|| Error::Upstream("No text in Gemini chat response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
    const GENERATE_CONTENT_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

    fn make_client(server: &MockServer, api_key: &str, model: &str) -> GeminiChatClient {
        GeminiChatClient::new(api_key.to_string(), model.to_string()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_converse_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "Porcelain is fired at a higher temperature." }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);

        let text = client.converse("What is porcelain?").await.unwrap();
        assert_eq!(text, "Porcelain is fired at a higher temperature.");
    }

    #[tokio::test]
    async fn test_converse_sends_system_instruction_and_prompt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .and(body_partial_json(serde_json::json!({
                "system_instruction": { "parts": [{ "text": "Be brief." }] },
                "contents": [{ "role": "user", "parts": [{ "text": "Which glaze?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Celadon." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            make_client(&server, "test-key", DEFAULT_MODEL).with_system_instruction("Be brief.");

        client.converse("Which glaze?").await.unwrap();
    }

    #[tokio::test]
    async fn test_converse_joins_text_parts_and_skips_others() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            { "thoughtSignature": "opaque" },
                            { "text": "Glazed " },
                            { "text": "stoneware." }
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        assert_eq!(client.converse("?").await.unwrap(), "Glazed stoneware.");
    }

    #[tokio::test]
    async fn test_api_error_returns_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server, "bad-key", DEFAULT_MODEL);

        let err = client.converse("hello").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_converse_rejects_empty_candidates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let err = client.converse("hello").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_converse_rejects_malformed_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"candidates\":["))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let err = client.converse("hello").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_converse_strips_models_prefix_from_model_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", "models/gemini-3-flash-preview");

        client.converse("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_converse_times_out_as_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_CONTENT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "candidates": [{ "content": { "parts": [{ "text": "late" }] } }]
                    }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL)
            .with_timeout(Duration::from_millis(50));
        let err = client.converse("hello").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
