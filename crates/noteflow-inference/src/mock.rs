//! Mock generation backend for deterministic testing.
//!
//! Returns canned responses keyed by prompt substring, logging every call
//! for assertion. Enabled via the `mock` feature so downstream crates can
//! drive the full pipeline without a model server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use noteflow_core::{Error, GenerationBackend, Result};

/// Mock generation backend.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// (needle, response) pairs checked in insertion order against the prompt.
    keyed_responses: Vec<(String, String)>,
    default_response: String,
    failure_rate: f64,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub system: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            keyed_responses: Vec::new(),
            default_response: "{}".to_string(),
            failure_rate: 0.0,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the fallback response for prompts with no keyed match.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Respond with `response` when the prompt contains `needle`.
    /// Pairs are checked in insertion order; first match wins.
    pub fn respond_when_contains(
        mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .keyed_responses
            .push((needle.into(), response.into()));
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        self.config.failure_rate > 0.0
            && rand::thread_rng().gen::<f64>() < self.config.failure_rate
    }

    fn respond(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
        });

        if self.should_fail() {
            return Err(Error::Inference("Simulated failure for testing".to_string()));
        }

        for (needle, response) in &self.config.keyed_responses {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.config.default_response.clone())
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(prompt, None)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.respond(prompt, Some(system))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let backend = MockGenerationBackend::new().with_default_response("canned");
        assert_eq!(backend.generate("anything").await.unwrap(), "canned");
    }

    #[tokio::test]
    async fn test_mock_keyed_responses_first_match_wins() {
        let backend = MockGenerationBackend::new()
            .respond_when_contains("Classify", "{\"kind\": \"classify\"}")
            .respond_when_contains("Class", "{\"kind\": \"never\"}");

        let out = backend.generate("Classify this text").await.unwrap();
        assert_eq!(out, "{\"kind\": \"classify\"}");
    }

    #[tokio::test]
    async fn test_mock_call_logging() {
        let backend = MockGenerationBackend::new();
        backend.generate("one").await.unwrap();
        backend.generate_with_system("sys", "two").await.unwrap();

        assert_eq!(backend.call_count(), 2);
        let calls = backend.calls();
        assert_eq!(calls[0].prompt, "one");
        assert_eq!(calls[1].system.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn test_mock_failure_simulation() {
        let backend = MockGenerationBackend::new().with_failure_rate(1.0);
        assert!(backend.generate("boom").await.is_err());
    }

    #[test]
    fn test_mock_is_deterministic_without_failure_rate() {
        let backend = MockGenerationBackend::new();
        assert!(!backend.should_fail());
    }
}
