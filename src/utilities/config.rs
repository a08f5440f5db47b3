//! Pipeline configuration.
//!
//! Loaded from YAML with every field optional, then overridden from the
//! environment. Temperatures are set per generation step.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utilities::errors::{OpAmpError, Result};

/// Context label used when the caller supplies none.
pub const DEFAULT_CONTEXT: &str = "general discussion";

/// Upper bound for `timeout_secs` (one day).
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// Sampling temperature for each generation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    #[serde(default = "default_analysis_temperature")]
    pub analysis: f64,
    #[serde(default = "default_analysis_temperature")]
    pub ground_truth: f64,
    #[serde(default = "default_analysis_temperature")]
    pub delta: f64,
    #[serde(default = "default_synthesis_temperature")]
    pub synthesis: f64,
    #[serde(default = "default_analysis_temperature")]
    pub style_instructions: f64,
    #[serde(default = "default_reformat_temperature")]
    pub reformat: f64,
}

fn default_analysis_temperature() -> f64 { 0.3 }
fn default_synthesis_temperature() -> f64 { 0.4 }
fn default_reformat_temperature() -> f64 { 0.2 }

impl Default for Temperatures {
    fn default() -> Self {
        Self {
            analysis: default_analysis_temperature(),
            ground_truth: default_analysis_temperature(),
            delta: default_analysis_temperature(),
            synthesis: default_synthesis_temperature(),
            style_instructions: default_analysis_temperature(),
            reformat: default_reformat_temperature(),
        }
    }
}

impl Temperatures {
    fn validate(&self) -> Result<()> {
        let all = [
            ("analysis", self.analysis),
            ("ground_truth", self.ground_truth),
            ("delta", self.delta),
            ("synthesis", self.synthesis),
            ("style_instructions", self.style_instructions),
            ("reformat", self.reformat),
        ];
        for (name, value) in all {
            if !(0.0..=2.0).contains(&value) {
                return Err(OpAmpError::Config(format!(
                    "temperature '{}' must be within 0.0..=2.0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the difference engine and its default provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpAmpConfig {
    /// Model name passed to the provider.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; falls back to `OPENAI_API_KEY` in the provider.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Custom base URL for OpenAI-compatible endpoints.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Provider request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Provider retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Optional response length cap.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Context used when a run is started without one.
    #[serde(default = "default_context")]
    pub default_context: String,
    /// Run independent stages (the two analyses, the three deltas) concurrently.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Per-step sampling temperatures.
    #[serde(default)]
    pub temperatures: Temperatures,
    /// YAML style catalog replacing the built-in one.
    #[serde(default)]
    pub style_catalog: Option<PathBuf>,
}

fn default_model() -> String { "gpt-4".to_string() }
fn default_timeout_secs() -> f64 { 120.0 }
fn default_max_retries() -> u32 { 2 }
fn default_context() -> String { DEFAULT_CONTEXT.to_string() }
fn default_true() -> bool { true }

impl Default for OpAmpConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_tokens: None,
            default_context: default_context(),
            parallel: true,
            temperatures: Temperatures::default(),
            style_catalog: None,
        }
    }
}

impl OpAmpConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| OpAmpError::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| OpAmpError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Apply `OPAMP_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(model) = lookup("OPAMP_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = lookup("OPAMP_BASE_URL") {
            self.base_url = Some(base_url);
        }
        if let Some(parallel) = lookup("OPAMP_PARALLEL") {
            self.parallel = match parallel.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(OpAmpError::Config(format!(
                        "OPAMP_PARALLEL must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(catalog) = lookup("OPAMP_STYLE_CATALOG") {
            self.style_catalog = Some(PathBuf::from(catalog));
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(OpAmpError::Config("model cannot be empty".to_string()));
        }
        // Must also fit a `Duration`.
        let timeout = self.timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 || timeout > MAX_TIMEOUT_SECS {
            return Err(OpAmpError::Config(format!(
                "timeout_secs must be a positive number of seconds up to {}",
                MAX_TIMEOUT_SECS
            )));
        }
        self.temperatures.validate()
    }

    /// The context to use for a run: `context` when non-blank, the default otherwise.
    pub fn resolve_context(&self, context: Option<&str>) -> String {
        match context.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => self.default_context.clone(),
        }
    }
}
