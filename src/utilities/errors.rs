//! Error types for the difference engine.
//!
//! Two layers: [`GenerationError`] is what a text-generation provider reports,
//! [`OpAmpError`] is what the pipeline reports to its caller. A generation
//! failure always reaches the caller wrapped with the stage that issued it.

use thiserror::Error;

use crate::pipeline::PipelineStage;

/// Errors raised by a text-generation provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credentials were configured for the provider.
    #[error("API key not set: {message}")]
    MissingApiKey { message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider answered, but the envelope could not be understood.
    #[error("malformed provider response: {message}")]
    MalformedResponse { message: String },

    /// Any other provider failure.
    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether a retrying caller may try the same request again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised by the pipeline and its stages.
#[derive(Debug, Error)]
pub enum OpAmpError {
    /// A required input was empty. Raised before any generation call.
    #[error("{field} cannot be empty")]
    EmptyInput { field: &'static str },

    /// A named output style is not in the style catalog.
    #[error("unknown output style '{name}'")]
    UnknownStyle { name: String },

    /// A generation call failed; the run aborts at `stage`.
    #[error("{stage} stage failed during {call}: {source}")]
    Generation {
        stage: PipelineStage,
        call: String,
        #[source]
        source: GenerationError,
    },

    /// A style catalog could not be loaded or is invalid.
    #[error("style catalog error: {0}")]
    Catalog(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading input or writing a report failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl OpAmpError {
    /// Wrap a provider failure with the stage and call that issued it.
    pub fn generation(stage: PipelineStage, call: impl Into<String>, source: GenerationError) -> Self {
        Self::Generation {
            stage,
            call: call.into(),
            source,
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// The pipeline stage a generation failure occurred in, if any.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Generation { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the error was caused by the caller's input rather than by a
    /// provider or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyInput { .. } | Self::UnknownStyle { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = OpAmpError> = std::result::Result<T, E>;
