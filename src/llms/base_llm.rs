//! The text-generation port.
//!
//! Every stage of the difference engine suspends on exactly one kind of
//! operation: asking a text-generation capability for text. This module
//! defines that capability as the [`TextGeneration`] trait, plus the shared
//! state ([`LlmState`]) and structured-output helpers that concrete providers
//! embed.
//!
//! The pipeline is agnostic to the provider and model; only the prompt and
//! the sampling temperature are part of the contract.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::utilities::errors::GenerationError;

// ---------------------------------------------------------------------------
// TextGeneration trait
// ---------------------------------------------------------------------------

/// A text-generation capability.
///
/// Implementations must be independently invocable per call: the pipeline
/// may issue several calls concurrently against the same instance and holds
/// no lock around them.
///
/// Timeouts, retries and backoff are the implementation's concern; the
/// pipeline treats any returned error as fatal for the stage that issued the
/// call.
#[async_trait]
pub trait TextGeneration: Send + Sync + fmt::Debug {
    /// Model identifier, used for logging.
    fn model(&self) -> &str;

    /// Generate free text for `prompt` at the given sampling temperature.
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError>;

    /// Generate text that is expected to be a JSON object with `keys`.
    ///
    /// Returns the raw text; parsing (and deciding what to do when parsing
    /// fails) is the caller's job. The default implementation simply forwards
    /// to [`generate`](Self::generate); providers with a JSON mode should
    /// override it.
    async fn generate_json(
        &self,
        prompt: &str,
        temperature: f64,
        keys: &[&str],
    ) -> Result<String, GenerationError> {
        let _ = keys;
        self.generate(prompt, temperature).await
    }

    /// Cumulative token usage for this instance.
    fn usage(&self) -> TokenUsage {
        TokenUsage::default()
    }
}

// ---------------------------------------------------------------------------
// Shared provider state
// ---------------------------------------------------------------------------

/// Cumulative token usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub successful_requests: i64,
}

impl TokenUsage {
    /// Add the `usage` block of a provider response.
    ///
    /// Accepts both the OpenAI (`prompt_tokens`/`completion_tokens`) and the
    /// Anthropic-style (`input_tokens`/`output_tokens`) field names.
    pub fn record(&mut self, usage: &Value) {
        let prompt = usage
            .get("prompt_tokens")
            .or_else(|| usage.get("input_tokens"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let completion = usage
            .get("completion_tokens")
            .or_else(|| usage.get("output_tokens"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        self.prompt_tokens += prompt;
        self.completion_tokens += completion;
        self.total_tokens += prompt + completion;
        self.successful_requests += 1;
    }
}

/// Connection settings shared by HTTP-backed providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmState {
    /// The model identifier/name.
    pub model: String,
    /// Optional API key.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Optional base URL for the API.
    pub base_url: Option<String>,
    /// Additional provider-specific body parameters.
    #[serde(default)]
    pub additional_params: HashMap<String, Value>,
}

impl LlmState {
    /// Create a new `LlmState` for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            base_url: None,
            additional_params: HashMap::new(),
        }
    }

    /// Wrap a prompt as a single user message.
    pub fn user_message(prompt: &str) -> Value {
        serde_json::json!({
            "role": "user",
            "content": prompt,
        })
    }
}

/// Generate a unique ID for one generation call, used to correlate log lines.
pub fn generate_call_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Structured output
// ---------------------------------------------------------------------------

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced JSON pattern is valid")
});

static EMBEDDED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("embedded JSON pattern is valid"));

/// Why a structured response could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredOutputError {
    /// No JSON object could be found in the response.
    NoJson,
    /// A JSON object was found but lacks a required key.
    MissingKey(String),
    /// A required key holds something other than a string.
    NotAString(String),
}

impl fmt::Display for StructuredOutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoJson => write!(f, "no JSON object found in response"),
            Self::MissingKey(key) => write!(f, "response is missing key '{}'", key),
            Self::NotAString(key) => write!(f, "value for key '{}' is not a string", key),
        }
    }
}

impl std::error::Error for StructuredOutputError {}

/// Find the first JSON object in a model response.
///
/// Tries, in order: the whole trimmed response, a markdown code fence, and
/// the widest `{...}` span embedded in prose.
pub fn find_json_object(response: &str) -> Option<Map<String, Value>> {
    let trimmed = response.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    if let Some(caps) = FENCED_JSON.captures(trimmed) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&caps[1]) {
            return Some(map);
        }
    }

    EMBEDDED_JSON
        .find(trimmed)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
}

/// Extract exactly `keys` as strings from a JSON object in `response`.
///
/// Extra keys are ignored. Any missing or non-string key is an error.
pub fn extract_string_fields(
    response: &str,
    keys: &[&str],
) -> Result<HashMap<String, String>, StructuredOutputError> {
    let object = find_json_object(response).ok_or(StructuredOutputError::NoJson)?;

    let mut fields = HashMap::with_capacity(keys.len());
    for key in keys {
        match object.get(*key) {
            None => return Err(StructuredOutputError::MissingKey(key.to_string())),
            Some(Value::String(s)) => {
                fields.insert(key.to_string(), s.trim().to_string());
            }
            Some(_) => return Err(StructuredOutputError::NotAString(key.to_string())),
        }
    }
    Ok(fields)
}
