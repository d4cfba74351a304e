//! Client for a local Ollama model server.
//!
//! Executes candidate prompts through the native `/api/chat` endpoint and
//! exposes the model listing used by the `models` and `check` commands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::RunnerConfig;
use crate::error::LlmError;
use crate::utils::strip_reasoning_tags;

use super::litellm::Message;
use super::runner::ModelRunner;

/// A model installed on the local server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalModel {
    /// Model name including tag, e.g. "llama3.2:latest".
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last modification time as reported by the server.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    /// Model metadata.
    #[serde(default)]
    pub details: LocalModelDetails,
}

impl LocalModel {
    /// Size on disk in gigabytes, two decimals.
    pub fn size_gb(&self) -> String {
        format_size_gb(self.size)
    }
}

/// Metadata about a local model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalModelDetails {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub parameter_size: String,
    #[serde(default)]
    pub quantization_level: String,
}

/// Formats a byte count as gigabytes with two decimals.
pub fn format_size_gb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}

/// Client for the local model server.
#[derive(Debug)]
pub struct OllamaClient {
    config: RunnerConfig,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

impl OllamaClient {
    /// Create a new client from explicit configuration.
    pub fn new(config: RunnerConfig) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Server base URL.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    /// Returns true if the server answers the model listing endpoint.
    pub async fn check_connection(&self) -> bool {
        match self.http_client.get(self.url("/api/tags")).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(host = %self.config.host, error = %err, "Connection check failed");
                false
            }
        }
    }

    /// Lists the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<LocalModel>, LlmError> {
        let response = self
            .http_client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                code: status.as_u16(),
                message,
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse model list: {}", e)))?;
        Ok(tags.models)
    }
}

#[async_trait]
impl ModelRunner for OllamaClient {
    async fn run_prompt(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model,
            messages: vec![Message::user(prompt)],
            stream: false,
        };

        let response = self
            .http_client
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                code: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse chat response: {}", e)))?;

        Ok(if self.config.strip_reasoning {
            strip_reasoning_tags(&chat.message.content)
        } else {
            chat.message.content
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_gb() {
        assert_eq!(format_size_gb(0), "0.00");
        assert_eq!(format_size_gb(1024 * 1024 * 1024), "1.00");
        assert_eq!(format_size_gb(2_019_393_189), "1.88");
    }

    #[test]
    fn test_parse_tags_response() {
        let raw = r#"{"models":[{"name":"llama3.2:latest","model":"llama3.2:latest","modified_at":"2024-10-01T10:00:00Z","size":2019393189,"digest":"abc","details":{"parent_model":"","format":"gguf","family":"llama","families":["llama"],"parameter_size":"3.2B","quantization_level":"Q4_K_M"}}]}"#;
        let tags: TagsResponse = serde_json::from_str(raw).expect("should parse");

        assert_eq!(tags.models.len(), 1);
        let model = &tags.models[0];
        assert_eq!(model.name, "llama3.2:latest");
        assert_eq!(model.details.family, "llama");
        assert_eq!(model.details.parameter_size, "3.2B");
        assert_eq!(model.size_gb(), "1.88");
        assert_eq!(
            model.modified_at.map(|t| t.format("%Y-%m-%d").to_string()),
            Some("2024-10-01".to_string())
        );
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "llama3.2",
            messages: vec![Message::user("hi")],
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"model":"llama3.2","messages":[{"role":"user","content":"hi"}],"stream":false}"#
        );
    }

    #[test]
    fn test_url_joining() {
        let client = OllamaClient::new(RunnerConfig::new("http://localhost:11434/"))
            .expect("client should build");
        assert_eq!(client.url("/api/chat"), "http://localhost:11434/api/chat");
    }

    #[tokio::test]
    async fn test_check_connection_unreachable() {
        let client = OllamaClient::new(RunnerConfig::new("http://localhost:65535"))
            .expect("client should build");
        assert!(!client.check_connection().await);
    }

    #[tokio::test]
    async fn test_run_prompt_unreachable() {
        let client = OllamaClient::new(RunnerConfig::new("http://localhost:65535"))
            .expect("client should build");
        let result = client.run_prompt("llama3.2", "hello").await;
        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
    }
}
