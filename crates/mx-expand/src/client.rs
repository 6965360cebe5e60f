use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::CompletionError,
    prompt::{ChatMessage, Prompt},
    provider::CompletionProvider,
};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            top_p: 1.0,
        }
    }
}

#[derive(Clone)]
pub struct CompletionConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub sampling: SamplingParams,
    /// `None` leaves the HTTP client's default in place.
    pub timeout_seconds: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            sampling: SamplingParams::default(),
            timeout_seconds: None,
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("sampling", &self.sampling)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let mut builder = Client::builder().user_agent(concat!("mx-expand/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        if self.config.api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let sampling = self.config.sampling;
        let request = ChatRequest {
            model: &self.config.model,
            messages: prompt.messages(),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            stream: false,
        };

        debug!("Calling completion endpoint: model={}", self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn config_for(server: &MockServer) -> CompletionConfig {
        CompletionConfig {
            api_base: server.base_url(),
            api_key: "test-key".to_string(),
            ..CompletionConfig::default()
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "A much longer message."}}
                    ]
                }));
            })
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let text = client.complete(&Prompt::expand("hi")).await.unwrap();

        assert_eq!(text, "A much longer message.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let err = client.complete(&Prompt::expand("hi")).await.unwrap_err();

        match err {
            CompletionError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let client = OpenAiClient::new(config_for(&server)).unwrap();
        let err = client.complete(&Prompt::expand("hi")).await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_complete_without_api_key_skips_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200);
            })
            .await;

        let client = OpenAiClient::new(CompletionConfig {
            api_key: String::new(),
            ..config_for(&server)
        })
        .unwrap();
        let err = client.complete(&Prompt::expand("hi")).await.unwrap_err();

        assert!(matches!(err, CompletionError::MissingApiKey));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiClient::new(CompletionConfig {
            api_base: "http://localhost:9999/v1/".to_string(),
            ..CompletionConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = CompletionConfig {
            api_key: "sk-secret".to_string(),
            ..CompletionConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_request_body_disables_streaming() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: Prompt::expand("hi").messages(),
            temperature: 0.7,
            max_tokens: 500,
            top_p: 1.0,
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["max_tokens"], json!(500));
        assert_eq!(value["messages"][0]["role"], json!("system"));
    }
}
