//! # Opinion OpAmp
//!
//! A conceptual operational amplifier for opinions: a difference engine that
//! takes two contrasting opinions, profiles each along ethos, logos and
//! energeia, measures the per-dimension deltas against a neutral baseline,
//! and synthesizes a new opinion from those deltas, rendered in a chosen
//! output style.
//!
//! The pipeline talks to a language model only through the
//! [`TextGeneration`] port; [`OpenAICompletion`] is the bundled adapter.
//!
//! ```no_run
//! use std::sync::Arc;
//! use opamp::{OpAmpConfig, OpenAICompletion, OutputStyle, PipelineOrchestrator};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OpAmpConfig::default().with_env_overrides()?;
//! let llm = Arc::new(OpenAICompletion::from_config(&config)?);
//! let orchestrator = PipelineOrchestrator::from_config(llm, &config)?;
//! let result = orchestrator
//!     .run(
//!         "We must ban all plastic immediately",
//!         "Plastic should be phased out over twenty years",
//!         "environmental policy",
//!         OutputStyle::named("Press Release"),
//!     )
//!     .await?;
//! println!("{}", result.final_output);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod llms;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod stages;
pub mod styles;
pub mod types;
pub mod utilities;

pub use llms::base_llm::TextGeneration;
pub use llms::providers::OpenAICompletion;
pub use pipeline::{PipelineOrchestrator, PipelineResult, PipelineStage};
pub use styles::{OutputStyle, StyleCatalog};
pub use types::{Deltas, Dimension, DimensionDelta, ProfileExtraction, RhetoricalProfile};
pub use utilities::config::OpAmpConfig;
pub use utilities::errors::{GenerationError, OpAmpError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
