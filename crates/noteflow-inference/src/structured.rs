//! Structured-JSON generation: one model call, typed result.
//!
//! Each pipeline stage declares its output shape as a JSON example, sends
//! it alongside the instruction, and deserializes the response into the
//! stage's typed struct. Deserialization is the schema validation step:
//! a response that parses as JSON but does not match the declared shape
//! fails closed with a stage-tagged error.

use serde::de::DeserializeOwned;
use tracing::debug;

use noteflow_core::{Error, GenerationBackend, Result};

/// Invoke the backend once with an instruction and a declared JSON output
/// shape, then parse the response into `T`.
///
/// Failure modes (all tagged with `stage`):
/// - remote-model error
/// - response is not JSON
/// - response is JSON but does not match the shape of `T`
pub async fn generate_structured<T: DeserializeOwned>(
    backend: &dyn GenerationBackend,
    stage: &str,
    instruction: &str,
    shape: &serde_json::Value,
    payload: &str,
) -> Result<T> {
    let prompt = build_prompt(instruction, shape, payload);

    debug!(
        stage,
        prompt_len = prompt.len(),
        model = backend.model_name(),
        "invoking model-call stage"
    );

    let response = backend
        .generate(&prompt)
        .await
        .map_err(|e| Error::stage(stage, e))?;

    parse_structured(stage, &response)
}

/// Assemble the stage prompt: instruction, declared shape, then content.
fn build_prompt(instruction: &str, shape: &serde_json::Value, payload: &str) -> String {
    format!(
        "{instruction}\n\n\
         Respond with a single JSON object matching exactly this shape \
         (same keys, same nesting, no extra commentary):\n{shape}\n\n\
         Content:\n{payload}",
        shape = serde_json::to_string_pretty(shape).unwrap_or_else(|_| shape.to_string()),
    )
}

/// Parse a model response into `T`, tolerating markdown code fences.
pub fn parse_structured<T: DeserializeOwned>(stage: &str, response: &str) -> Result<T> {
    let body = strip_code_fences(response);
    serde_json::from_str(body).map_err(|e| {
        Error::stage(
            stage,
            format!("model returned JSON not matching the declared shape: {}", e),
        )
    })
}

/// Strip a surrounding ```json ... ``` fence if present. Models routinely
/// wrap JSON output even when asked not to.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
