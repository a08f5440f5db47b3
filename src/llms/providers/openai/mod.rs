//! OpenAI-compatible chat completion provider.
//!
//! Talks to any endpoint implementing the Chat Completions API
//! (`POST {base_url}/chat/completions`) over `reqwest`. The structured
//! variant turns on JSON mode (`response_format: {"type": "json_object"}`).
//!
//! The adapter owns the resilience policy:
//! a request timeout and a bounded retry loop with exponential backoff for
//! transient failures (transport errors, 429 and 5xx).

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::llms::base_llm::{generate_call_id, LlmState, TextGeneration, TokenUsage};
use crate::utilities::config::OpAmpConfig;
use crate::utilities::errors::GenerationError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// OpenAI chat completion implementation of [`TextGeneration`].
///
/// # Example
///
/// ```ignore
/// let provider = OpenAICompletion::new("gpt-4", None, None)?;
/// let text = provider.generate("Say hello", 0.2).await?;
/// ```
#[derive(Debug)]
pub struct OpenAICompletion {
    /// Shared connection settings.
    pub state: LlmState,
    /// Organization ID for multi-tenant access.
    pub organization: Option<String>,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// Maximum tokens in a response.
    pub max_tokens: Option<u32>,
    /// Delay before the first retry; doubled on each further attempt.
    pub initial_backoff: Duration,
    client: reqwest::Client,
    usage: Mutex<TokenUsage>,
}

impl OpenAICompletion {
    /// Create a new OpenAI provider.
    ///
    /// * `model` - Model name (e.g., "gpt-4", "gpt-4o").
    /// * `api_key` - Optional API key (defaults to the `OPENAI_API_KEY` env var).
    /// * `base_url` - Optional custom base URL.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, GenerationError> {
        Self::with_timeout(model, api_key, base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new OpenAI provider with an explicit request timeout.
    pub fn with_timeout(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout_secs: f64,
    ) -> Result<Self, GenerationError> {
        let mut state = LlmState::new(model);
        state.api_key = api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());
        state.base_url = base_url;

        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                GenerationError::other(format!("invalid request timeout: {} seconds", timeout_secs))
            })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            state,
            organization: std::env::var("OPENAI_ORGANIZATION").ok(),
            max_retries: 2,
            max_tokens: None,
            initial_backoff: Duration::from_secs(1),
            client,
            usage: Mutex::new(TokenUsage::default()),
        })
    }

    /// Build a provider from pipeline configuration.
    pub fn from_config(config: &OpAmpConfig) -> Result<Self, GenerationError> {
        let mut provider = Self::with_timeout(
            config.model.clone(),
            config.api_key.clone(),
            config.base_url.clone(),
            config.timeout_secs,
        )?;
        provider.max_retries = config.max_retries;
        provider.max_tokens = config.max_tokens;
        Ok(provider)
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> String {
        self.state
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, prompt: &str, temperature: f64, json_mode: bool) -> Value {
        let mut body = serde_json::json!({
            "model": self.state.model,
            "messages": [LlmState::user_message(prompt)],
            "temperature": temperature,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        for (key, value) in &self.state.additional_params {
            body[key.as_str()] = value.clone();
        }

        body
    }

    /// Extract the text of the first choice from a Chat Completions response.
    pub fn parse_completion(response: &Value) -> Result<String, GenerationError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| GenerationError::MalformedResponse {
                message: "no choices in response".to_string(),
            })?;

        match message.get("content") {
            Some(Value::String(content)) => Ok(content.clone()),
            Some(Value::Null) | None => Ok(String::new()),
            Some(other) => Err(GenerationError::MalformedResponse {
                message: format!("unexpected content type: {}", other),
            }),
        }
    }

    async fn complete(
        &self,
        prompt: &str,
        temperature: f64,
        json_mode: bool,
    ) -> Result<String, GenerationError> {
        let api_key = self.state.api_key.as_ref().ok_or_else(|| GenerationError::MissingApiKey {
            message: "set OPENAI_API_KEY or pass an api_key".to_string(),
        })?;

        let call_id = generate_call_id();
        let endpoint = format!("{}/chat/completions", self.api_base_url());
        let body = self.build_request_body(prompt, temperature, json_mode);

        log::debug!(
            "LLM call started: model={}, call_id={}, temperature={}, json_mode={}, prompt_chars={}",
            self.state.model,
            call_id,
            temperature,
            json_mode,
            prompt.len()
        );

        let mut retry_delay = self.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.send_once(&endpoint, api_key, &body).await {
                Ok(text) => {
                    log::debug!(
                        "LLM call completed: model={}, call_id={}, response_chars={}",
                        self.state.model,
                        call_id,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "LLM call {} failed ({}); retry {} of {} after {:?}",
                        call_id,
                        e,
                        attempt,
                        self.max_retries,
                        retry_delay
                    );
                    tokio::time::sleep(retry_delay).await;
                    retry_delay *= 2;
                }
                Err(e) => {
                    log::warn!(
                        "LLM call failed: model={}, error={}, call_id={}",
                        self.state.model,
                        e,
                        call_id
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(
        &self,
        endpoint: &str,
        api_key: &str,
        body: &Value,
    ) -> Result<String, GenerationError> {
        let mut request = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .bearer_auth(api_key);

        if let Some(ref org) = self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.json(body).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                body: response_text.chars().take(500).collect(),
            });
        }

        let response_json: Value =
            serde_json::from_str(&response_text).map_err(|e| GenerationError::MalformedResponse {
                message: format!(
                    "{} - body: {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                ),
            })?;

        if let Some(usage) = response_json.get("usage") {
            self.usage.lock().record(usage);
        }

        Self::parse_completion(&response_json)
    }
}

#[async_trait]
impl TextGeneration for OpenAICompletion {
    fn model(&self) -> &str {
        &self.state.model
    }

    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError> {
        self.complete(prompt, temperature, false).await
    }

    async fn generate_json(
        &self,
        prompt: &str,
        temperature: f64,
        _keys: &[&str],
    ) -> Result<String, GenerationError> {
        self.complete(prompt, temperature, true).await
    }

    fn usage(&self) -> TokenUsage {
        *self.usage.lock()
    }
}
