//! Synthesis: baseline plus three deltas into one new opinion.

use std::sync::Arc;

use crate::llms::base_llm::TextGeneration;
use crate::pipeline::PipelineStage;
use crate::types::Deltas;
use crate::utilities::errors::{OpAmpError, Result};

#[derive(Debug, Clone)]
pub struct Synthesizer {
    llm: Arc<dyn TextGeneration>,
    temperature: f64,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn TextGeneration>, temperature: f64) -> Self {
        Self { llm, temperature }
    }

    pub fn build_prompt(deltas: &Deltas, ground_truth: &str, context: &str) -> String {
        let delta_lines = deltas
            .iter()
            .map(|d| format!("{} DELTA: {}", d.dimension.label(), d.delta_analysis))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are a conceptual op-amp (difference engine) synthesizing a NEW opinion by \
             applying the qualitative differences identified.\n\n\
             CONTEXT: {context}\n\
             BASELINE: {ground_truth}\n\n\
             DELTA COMPARISONS:\n\n\
             {delta_lines}\n\n\
             SYNTHESIS INSTRUCTIONS:\n\
             1. START with the baseline as your foundation.\n\
             2. APPLY each delta transformation.\n\
             3. Synthesize a NEW opinion that embodies these differences.\n\
             4. The result should combine the deltas into a coherent, integrated perspective.\n\
             5. Create something new and comparative; do not reference or copy any single \
             source material.\n\n\
             Create the synthesized opinion:",
            context = context,
            ground_truth = ground_truth,
            delta_lines = delta_lines,
        )
    }

    /// Produce the synthesis. Any text the model returns is accepted.
    pub async fn synthesize(&self, deltas: &Deltas, ground_truth: &str, context: &str) -> Result<String> {
        let prompt = Self::build_prompt(deltas, ground_truth, context);
        let response = self
            .llm
            .generate(&prompt, self.temperature)
            .await
            .map_err(|e| OpAmpError::generation(PipelineStage::Synthesize, "synthesis", e))?;
        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::testing::ScriptedLLM;
    use crate::types::{Dimension, DimensionDelta};

    fn deltas() -> Deltas {
        let delta = |dimension: Dimension| DimensionDelta {
            dimension,
            null_hypothesis: String::new(),
            positive_input: "A".to_string(),
            negative_input: "B".to_string(),
            positive_description: String::new(),
            negative_description: String::new(),
            delta_analysis: format!("{} shift", dimension),
        };
        Deltas {
            ethos: delta(Dimension::Ethos),
            logos: delta(Dimension::Logos),
            energeia: delta(Dimension::Energeia),
        }
    }

    #[test]
    fn test_prompt_contains_baseline_and_every_delta() {
        let prompt = Synthesizer::build_prompt(&deltas(), "Plastic has trade-offs.", "environmental policy");
        assert!(prompt.contains("CONTEXT: environmental policy"));
        assert!(prompt.contains("BASELINE: Plastic has trade-offs."));
        assert!(prompt.contains("ETHOS DELTA: ethos shift\nLOGOS DELTA: logos shift\nENERGEIA DELTA: energeia shift"));
        assert!(prompt.contains("do not reference or copy any single source material"));
    }

    #[test]
    fn test_prompt_does_not_quote_source_opinions() {
        let prompt = Synthesizer::build_prompt(&deltas(), "baseline", "c");
        assert!(!prompt.contains("Opinion:"));
    }

    #[tokio::test]
    async fn test_synthesize_uses_configured_temperature() {
        let llm = Arc::new(ScriptedLLM::constant(" A balanced middle path. "));
        let synthesizer = Synthesizer::new(llm.clone(), 0.4);

        let text = synthesizer.synthesize(&deltas(), "baseline", "c").await.unwrap();
        assert_eq!(text, "A balanced middle path.");
        assert_eq!(llm.calls()[0].temperature, 0.4);
    }
}
