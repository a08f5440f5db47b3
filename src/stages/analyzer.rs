//! Opinion analysis: one opinion in, one rhetorical profile out.

use std::sync::Arc;

use crate::llms::base_llm::{extract_string_fields, TextGeneration};
use crate::pipeline::PipelineStage;
use crate::types::{Dimension, ProfileExtraction, RhetoricalProfile};
use crate::utilities::config::DEFAULT_CONTEXT;
use crate::utilities::errors::{OpAmpError, Result};

/// Keys the analysis response must contain.
pub const PROFILE_KEYS: [&str; 3] = ["ethos", "logos", "energeia"];

/// Builds a [`RhetoricalProfile`] for an opinion.
///
/// A response that cannot be read as the expected JSON object does not fail
/// the run: the analyzer returns [`ProfileExtraction::Degraded`] with empty
/// dimension descriptions and the opinion preserved verbatim.
#[derive(Debug, Clone)]
pub struct OpinionAnalyzer {
    llm: Arc<dyn TextGeneration>,
    temperature: f64,
}

impl OpinionAnalyzer {
    pub fn new(llm: Arc<dyn TextGeneration>, temperature: f64) -> Self {
        Self { llm, temperature }
    }

    /// The analysis prompt for `opinion` within `context`.
    pub fn build_prompt(opinion: &str, context: &str) -> String {
        let items = Dimension::ALL
            .iter()
            .enumerate()
            .map(|(i, d)| {
                format!(
                    "{}. {} ({}): {}",
                    i + 1,
                    d.label(),
                    d.gloss(),
                    analysis_question(*d)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Analyze the following opinion in the context of \"{context}\" for:\n\n\
             {items}\n\n\
             Opinion: \"{opinion}\"\n\n\
             Return your analysis as a JSON object with keys: {keys} \
             (each as a short text description).",
            context = context,
            items = items,
            opinion = opinion,
            keys = PROFILE_KEYS.join(", "),
        )
    }

    /// Analyze one opinion.
    ///
    /// Fails only on empty input (before any call) or on a generation
    /// failure. Malformed output yields a degraded profile.
    pub async fn analyze(&self, opinion: &str, context: &str) -> Result<ProfileExtraction> {
        if opinion.trim().is_empty() {
            return Err(OpAmpError::EmptyInput { field: "opinion" });
        }
        let context = if context.trim().is_empty() { DEFAULT_CONTEXT } else { context };

        let prompt = Self::build_prompt(opinion, context);
        let response = self
            .llm
            .generate_json(&prompt, self.temperature, &PROFILE_KEYS)
            .await
            .map_err(|e| OpAmpError::generation(PipelineStage::AnalyzeInputs, "opinion analysis", e))?;

        let extraction = Self::extract(opinion, &response);
        if let Some(reason) = extraction.diagnostic() {
            log::warn!("Profile extraction degraded to empty descriptions: {}", reason);
        }
        Ok(extraction)
    }

    /// Read a profile out of a model response.
    pub fn extract(opinion: &str, response: &str) -> ProfileExtraction {
        match extract_string_fields(response, &PROFILE_KEYS) {
            Ok(mut fields) => ProfileExtraction::Parsed(RhetoricalProfile {
                content: opinion.to_string(),
                ethos: fields.remove("ethos").unwrap_or_default(),
                logos: fields.remove("logos").unwrap_or_default(),
                energeia: fields.remove("energeia").unwrap_or_default(),
            }),
            Err(e) => ProfileExtraction::Degraded {
                profile: RhetoricalProfile::empty(opinion),
                reason: e.to_string(),
            },
        }
    }
}

fn analysis_question(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Ethos => {
            "Briefly describe how this opinion demonstrates credibility and authority."
        }
        Dimension::Logos => "Briefly describe how logical and well-reasoned this opinion is.",
        Dimension::Energeia => {
            "Briefly describe the vivid energy and transformative potential this opinion expresses."
        }
    }
}
