//! Per-dimension delta computation.
//!
//! Each dimension takes two dependent calls: a dimension-scoped baseline,
//! then the directional delta measured against that baseline. Dimensions are
//! independent of one another and may run concurrently.

use std::sync::Arc;

use crate::llms::base_llm::TextGeneration;
use crate::pipeline::PipelineStage;
use crate::types::{Deltas, Dimension, DimensionDelta, RhetoricalProfile};
use crate::utilities::errors::{OpAmpError, Result};

/// Computes [`DimensionDelta`]s between a positive and a negative profile.
///
/// Polarity is positional and fixed by argument order: the first profile is
/// always the positive side. Both prompts restate that assignment.
#[derive(Debug, Clone)]
pub struct DeltaCalculator {
    llm: Arc<dyn TextGeneration>,
    temperature: f64,
}

impl DeltaCalculator {
    pub fn new(llm: Arc<dyn TextGeneration>, temperature: f64) -> Self {
        Self { llm, temperature }
    }

    /// Prompt for the dimension-scoped baseline.
    pub fn build_baseline_prompt(
        dimension: Dimension,
        positive: &RhetoricalProfile,
        negative: &RhetoricalProfile,
        context: &str,
    ) -> String {
        let key = dimension.key();
        format!(
            "For the rhetorical element \"{label}\" ({definition}) in the context of \
             \"{context}\", identify the NULL HYPOTHESIS that represents the baseline state.\n\n\
             FOCUS SPECIFICALLY ON {label}: {focus}\n\n\
             Positive Input {key}: \"{pos_desc}\" (Opinion: \"{pos}\")\n\
             Negative Input {key}: \"{neg_desc}\" (Opinion: \"{neg}\")\n\n\
             What is the neutral baseline {key} state from which both opinions deviate?\n\
             Focus ONLY on the {definition} aspects, not the overall content.\n\n\
             Return only the {key} null hypothesis statement.",
            label = dimension.label(),
            definition = dimension.definition(),
            focus = dimension.focus(),
            context = context,
            key = key,
            pos_desc = positive.describe(dimension),
            pos = positive.content,
            neg_desc = negative.describe(dimension),
            neg = negative.content,
        )
    }

    /// Prompt for the directional delta against `baseline`.
    pub fn build_delta_prompt(
        dimension: Dimension,
        baseline: &str,
        positive: &RhetoricalProfile,
        negative: &RhetoricalProfile,
        context: &str,
    ) -> String {
        format!(
            "Compare ONLY the {label} in the context of \"{context}\":\n\n\
             {label} DEFINITION: {definition}\n\
             ANALYSIS FOCUS: {focus}\n\
             EXAMPLES TO CONSIDER: {examples}\n\n\
             ELEMENT NULL HYPOTHESIS: {baseline}\n\n\
             POSITIVE INPUT (this is the POSITIVE side of the argument):\n\
             Description: \"{pos_desc}\"\n\
             Opinion: \"{pos}\"\n\n\
             NEGATIVE INPUT (this is the NEGATIVE side of the argument):\n\
             Description: \"{neg_desc}\"\n\
             Opinion: \"{neg}\"\n\n\
             INSTRUCTIONS:\n\
             1. Focus EXCLUSIVELY on {definition}; ignore other rhetorical aspects.\n\
             2. ALWAYS treat the first input as the POSITIVE side of the {label} comparison.\n\
             3. ALWAYS treat the second input as the NEGATIVE side of the {label} comparison.\n\
             4. Analyze how each opinion's {label} approach differs from the null hypothesis.\n\
             5. Describe the directional {label} difference from negative to positive input.\n\
             6. DO NOT discuss the overall content; focus only on the {label} rhetorical dimension.\n\n\
             What specific {label} difference does the positive input represent that the \
             negative input lacks?\n\
             How do their {definition} strategies differ, with the positive input being the \
             affirming side?",
            label = dimension.label(),
            definition = dimension.definition(),
            focus = dimension.focus(),
            examples = dimension.examples(),
            context = context,
            baseline = baseline,
            pos_desc = positive.describe(dimension),
            pos = positive.content,
            neg_desc = negative.describe(dimension),
            neg = negative.content,
        )
    }

    /// Compute the delta for one dimension.
    ///
    /// Empty descriptions (from a degraded analysis) are quoted as `""`.
    pub async fn compute(
        &self,
        dimension: Dimension,
        positive: &RhetoricalProfile,
        negative: &RhetoricalProfile,
        context: &str,
    ) -> Result<DimensionDelta> {
        let key = dimension.key();

        let baseline_prompt = Self::build_baseline_prompt(dimension, positive, negative, context);
        let null_hypothesis = self
            .llm
            .generate(&baseline_prompt, self.temperature)
            .await
            .map_err(|e| {
                OpAmpError::generation(PipelineStage::ComputeDeltas, format!("{} baseline", key), e)
            })?
            .trim()
            .to_string();

        let delta_prompt =
            Self::build_delta_prompt(dimension, &null_hypothesis, positive, negative, context);
        let delta_analysis = self
            .llm
            .generate(&delta_prompt, self.temperature)
            .await
            .map_err(|e| {
                OpAmpError::generation(PipelineStage::ComputeDeltas, format!("{} delta", key), e)
            })?
            .trim()
            .to_string();

        log::debug!("Computed {} delta ({} chars)", key, delta_analysis.len());

        Ok(DimensionDelta {
            dimension,
            null_hypothesis,
            positive_input: positive.content.clone(),
            negative_input: negative.content.clone(),
            positive_description: positive.describe(dimension).to_string(),
            negative_description: negative.describe(dimension).to_string(),
            delta_analysis,
        })
    }

    /// Compute all three deltas, concurrently when `parallel` is set.
    pub async fn compute_all(
        &self,
        positive: &RhetoricalProfile,
        negative: &RhetoricalProfile,
        context: &str,
        parallel: bool,
    ) -> Result<Deltas> {
        let (ethos, logos, energeia) = if parallel {
            tokio::try_join!(
                self.compute(Dimension::Ethos, positive, negative, context),
                self.compute(Dimension::Logos, positive, negative, context),
                self.compute(Dimension::Energeia, positive, negative, context),
            )?
        } else {
            (
                self.compute(Dimension::Ethos, positive, negative, context).await?,
                self.compute(Dimension::Logos, positive, negative, context).await?,
                self.compute(Dimension::Energeia, positive, negative, context).await?,
            )
        };

        Ok(Deltas {
            ethos,
            logos,
            energeia,
        })
    }
}
