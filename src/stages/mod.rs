//! The pipeline stages.
//!
//! Each stage owns a handle to the text-generation port and its own
//! temperature, builds its prompts as pure functions, and tags any
//! generation failure with the pipeline stage it belongs to.

pub mod analyzer;
pub mod delta;
pub mod ground_truth;
pub mod reformat;
pub mod synthesis;

pub use analyzer::OpinionAnalyzer;
pub use delta::DeltaCalculator;
pub use ground_truth::GroundTruthResolver;
pub use reformat::Reformatter;
pub use synthesis::Synthesizer;
