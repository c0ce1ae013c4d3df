/// LLM Client — the single point of entry for all chat-completion calls.
///
/// Speaks the OpenAI chat-completions schema against a configurable base URL
/// (OpenRouter by default). One request per call: no retries, no streaming.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// The model used for report generation unless `LLM_MODEL` overrides it.
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct:free";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not set. Please add 'OPENROUTER_API_KEY' to your .env")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// `None` leaves the transport without a request timeout.
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    /// Some providers report upstream failures in a 200 body instead of the status line.
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

/// Token counts are informational only; missing or null counts are tolerated.
#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
}

impl ChatResponse {
    /// Content of the first choice, if the model produced any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    /// Numeric on OpenRouter, a string on some OpenAI-compatible servers.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// HTTP-like status carried in `code`, falling back to the response status.
    fn status_or(&self, fallback: u16) -> u16 {
        self.code
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(fallback)
    }
}

/// A chat-completion transport: one system message, one user message, text back.
///
/// `LlmClient` is the production implementation; tests substitute stubs.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Model identifier reported alongside generated output.
    fn model(&self) -> &str;
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl LlmClient {
    /// Builds a client from explicit configuration.
    /// Fails with `LlmError::MissingApiKey` when no key is configured.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    /// Makes a single call to the completions endpoint, returning the full response object.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let mut chat_response: ChatResponse = serde_json::from_str(&body)?;

        if let Some(error) = chat_response.error.take() {
            warn!("LLM API returned {} with error body: {}", status, error.message);
            return Err(LlmError::Api {
                status: error.status_or(status.as_u16()),
                message: error.message,
            });
        }

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={:?}, completion_tokens={:?}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let response = self.call(system, user).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves a canned completions response and records the last request body.
    async fn spawn_fake_api(status: StatusCode, body: Value) -> (String, Arc<Mutex<Option<Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move |Json(request): Json<Value>| {
                let body = body.clone();
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = Some(request);
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    fn config_for(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            ..LlmConfig::with_api_key("test-key")
        }
    }

    #[test]
    fn test_new_without_api_key_fails() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::with_api_key("unused")
        };
        assert!(matches!(
            LlmClient::new(&config),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = LlmClient::new(&config_for("https://openrouter.ai/api/v1/")).unwrap();
        assert_eq!(client.endpoint, "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_text_reads_first_choice() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text(), Some("first"));
    }

    #[tokio::test]
    async fn test_complete_sends_system_and_user_messages() {
        let (base_url, seen) = spawn_fake_api(
            StatusCode::OK,
            json!({
                "choices": [{"message": {"role": "assistant", "content": "  Diagnosis: benign  "}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
            }),
        )
        .await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        let text = client.complete("be professional", "write it").await.unwrap();
        assert_eq!(text, "  Diagnosis: benign  ");

        let request = seen.lock().unwrap().clone().unwrap();
        assert_eq!(request["model"], DEFAULT_MODEL);
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][0]["content"], "be professional");
        assert_eq!(request["messages"][1]["role"], "user");
        assert_eq!(request["messages"][1]["content"], "write it");
    }

    #[tokio::test]
    async fn test_unauthorized_surfaces_api_message() {
        let (base_url, _) = spawn_fake_api(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "No auth credentials found", "code": 401}}),
        )
        .await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        match client.complete("s", "u").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "No auth credentials found");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_body_with_ok_status_keeps_description() {
        let (base_url, _) = spawn_fake_api(
            StatusCode::OK,
            json!({"error": {"message": "Provider returned error", "code": 502}}),
        )
        .await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        match client.complete("s", "u").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Provider returned error");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_body_without_numeric_code_uses_response_status() {
        let (base_url, _) = spawn_fake_api(
            StatusCode::OK,
            json!({"error": {"message": "model overloaded", "code": "overloaded"}}),
        )
        .await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        assert!(matches!(
            client.complete("s", "u").await,
            Err(LlmError::Api { status: 200, ref message }) if message == "model overloaded"
        ));
    }

    #[tokio::test]
    async fn test_partial_usage_does_not_fail_completion() {
        let (base_url, _) = spawn_fake_api(
            StatusCode::OK,
            json!({
                "choices": [{"message": {"role": "assistant", "content": "Diagnosis: benign"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": null}
            }),
        )
        .await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        assert_eq!(
            client.complete("s", "u").await.unwrap(),
            "Diagnosis: benign"
        );
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_content() {
        let (base_url, _) = spawn_fake_api(StatusCode::OK, json!({"choices": []})).await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        assert!(matches!(
            client.complete("s", "u").await,
            Err(LlmError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (base_url, _) = spawn_fake_api(StatusCode::OK, json!({"choices": "nope"})).await;

        let client = LlmClient::new(&config_for(&base_url)).unwrap();
        assert!(matches!(
            client.complete("s", "u").await,
            Err(LlmError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out_when_configured() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Json(json!({"choices": [{"message": {"content": "late"}}]}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = LlmConfig {
            timeout_secs: Some(1),
            ..config_for(&format!("http://{addr}"))
        };
        let client = LlmClient::new(&config).unwrap();
        match client.complete("s", "u").await {
            Err(LlmError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LlmClient::new(&config_for(&format!("http://{addr}"))).unwrap();
        assert!(matches!(
            client.complete("s", "u").await,
            Err(LlmError::Http(_))
        ));
    }
}
