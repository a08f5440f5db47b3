//! Global baseline ("null hypothesis") from which both opinions deviate.

use std::sync::Arc;

use crate::llms::base_llm::TextGeneration;
use crate::pipeline::PipelineStage;
use crate::utilities::errors::{OpAmpError, Result};

/// Derives one neutral statement from the raw opinion pair.
#[derive(Debug, Clone)]
pub struct GroundTruthResolver {
    llm: Arc<dyn TextGeneration>,
    temperature: f64,
}

impl GroundTruthResolver {
    pub fn new(llm: Arc<dyn TextGeneration>, temperature: f64) -> Self {
        Self { llm, temperature }
    }

    pub fn build_prompt(opinion_positive: &str, opinion_negative: &str, context: &str) -> String {
        format!(
            "Given these two opinions about \"{context}\", formulate a NULL HYPOTHESIS that \
             represents the neutral ground truth from which both opinions deviate.\n\n\
             Positive Input Opinion: \"{positive}\"\n\
             Negative Input Opinion: \"{negative}\"\n\n\
             The null hypothesis should be a neutral, baseline statement that neither strongly \
             supports nor opposes either opinion, but from which both can be measured as \
             deviations.\n\n\
             Return only the null hypothesis statement.",
            context = context,
            positive = opinion_positive,
            negative = opinion_negative,
        )
    }

    /// Resolve the baseline. The trimmed response is returned as-is; an empty
    /// response is not an error.
    pub async fn resolve(
        &self,
        opinion_positive: &str,
        opinion_negative: &str,
        context: &str,
    ) -> Result<String> {
        let prompt = Self::build_prompt(opinion_positive, opinion_negative, context);
        let response = self
            .llm
            .generate(&prompt, self.temperature)
            .await
            .map_err(|e| {
                OpAmpError::generation(PipelineStage::ResolveGroundTruth, "ground truth", e)
            })?;
        Ok(response.trim().to_string())
    }
}
