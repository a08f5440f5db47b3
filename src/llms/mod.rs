//! Text-generation layer.
//!
//! - [`base_llm`] - The [`TextGeneration`] port every pipeline stage calls
//! - [`providers`] - Concrete providers (OpenAI-compatible HTTP)

pub mod base_llm;
pub mod providers;

#[cfg(test)]
pub(crate) mod testing;

pub use base_llm::{LlmState, TextGeneration, TokenUsage};
