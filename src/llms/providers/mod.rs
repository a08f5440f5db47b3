//! Native provider implementations of the text-generation port.

pub mod openai;

pub use openai::OpenAICompletion;
