//! Ollama-compatible generation backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use noteflow_core::{defaults, Error, GenerationBackend, Result};

/// Default endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEN_MODEL;

/// Generation backend speaking the Ollama `/api/generate` protocol.
///
/// Every pipeline stage in this system requests JSON output, so the
/// backend asks the server for JSON-constrained decoding (`format: json`)
/// by default. No local timeout beyond the HTTP client's; no retries.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
    json_format: bool,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    /// Create a new backend with default settings.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_OLLAMA_URL.to_string(), DEFAULT_GEN_MODEL.to_string())
    }

    /// Create a new backend with custom configuration.
    pub fn with_config(base_url: String, model: String) -> Self {
        let timeout_secs = defaults::env_override(
            defaults::ENV_GEN_TIMEOUT_SECS,
            defaults::GEN_TIMEOUT_SECS,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing generation backend: url={}, model={}",
            base_url, model
        );

        Self {
            client,
            base_url,
            model,
            timeout_secs,
            json_format: true,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var(defaults::ENV_OLLAMA_URL)
            .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model = std::env::var(defaults::ENV_GEN_MODEL)
            .unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());
        Self::with_config(base_url, model)
    }

    /// Disable JSON-constrained decoding (free-text generation).
    pub fn with_plain_format(mut self) -> Self {
        self.json_format = false;
        self
    }

    async fn generate_internal(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            format: if self.json_format { Some("json") } else { None },
        };

        let start = Instant::now();
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Model server returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse generation response: {}", e)))?;

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            response_len = result.response.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generation complete"
        );

        Ok(result.response.trim().to_string())
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_internal(None, prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_internal(Some(system), prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_backend_defaults() {
        let backend = OllamaBackend::with_config(
            "http://localhost:11434".to_string(),
            "test-model".to_string(),
        );
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.model_name(), "test-model");
        assert!(backend.json_format);
    }

    #[test]
    fn test_plain_format_toggle() {
        let backend = OllamaBackend::new().with_plain_format();
        assert!(!backend.json_format);
    }

    #[tokio::test]
    async fn test_generate_against_stub_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "stub-model",
                "stream": false,
                "format": "json",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "  {\"ok\": true}  "
            })))
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "stub-model".to_string());
        let out = backend.generate("hello").await.unwrap();
        assert_eq!(out, "{\"ok\": true}", "response is trimmed");
    }

    #[tokio::test]
    async fn test_generate_with_system_sends_system_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "system": "you are terse",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "ok" })),
            )
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "stub-model".to_string());
        let out = backend
            .generate_with_system("you are terse", "hello")
            .await
            .unwrap();
        assert_eq!(out, "ok");
    }

    #[tokio::test]
    async fn test_generate_surfaces_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model exploded"))
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "stub-model".to_string());
        let err = backend.generate("hello").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "error should carry status: {}", msg);
        assert!(msg.contains("model exploded"));
    }

    #[tokio::test]
    async fn test_generate_surfaces_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = OllamaBackend::with_config(server.uri(), "stub-model".to_string());
        let err = backend.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
