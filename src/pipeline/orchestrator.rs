//! The pipeline orchestrator.
//!
//! Drives a [`PipelineRun`] through
//! `AnalyzeInputs -> ResolveGroundTruth -> AssignPolarity -> ComputeDeltas ->
//! Synthesize -> Reformat -> Done`, one transition per [`step`], and exposes
//! [`reformat_only`] for restyling a finished result without recomputation.
//!
//! [`step`]: PipelineOrchestrator::step
//! [`reformat_only`]: PipelineOrchestrator::reformat_only

use std::sync::Arc;
use std::time::Instant;

use super::result::{PipelineResult, StageRecord};
use super::run::{PipelineRun, PipelineState};
use crate::llms::base_llm::TextGeneration;
use crate::stages::{DeltaCalculator, GroundTruthResolver, OpinionAnalyzer, Reformatter, Synthesizer};
use crate::styles::{OutputStyle, StyleCatalog};
use crate::types::ProfileExtraction;
use crate::utilities::config::OpAmpConfig;
use crate::utilities::errors::{OpAmpError, Result};

/// Sequences the stages of the difference engine.
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    analyzer: OpinionAnalyzer,
    ground_truth: GroundTruthResolver,
    delta_calculator: DeltaCalculator,
    synthesizer: Synthesizer,
    reformatter: Reformatter,
    parallel: bool,
    default_context: String,
}

impl PipelineOrchestrator {
    /// Build an orchestrator around `llm` with an explicit style catalog.
    pub fn new(llm: Arc<dyn TextGeneration>, config: &OpAmpConfig, catalog: Arc<StyleCatalog>) -> Self {
        let t = &config.temperatures;
        Self {
            analyzer: OpinionAnalyzer::new(llm.clone(), t.analysis),
            ground_truth: GroundTruthResolver::new(llm.clone(), t.ground_truth),
            delta_calculator: DeltaCalculator::new(llm.clone(), t.delta),
            synthesizer: Synthesizer::new(llm.clone(), t.synthesis),
            reformatter: Reformatter::new(llm, catalog, t.style_instructions, t.reformat),
            parallel: config.parallel,
            default_context: config.default_context.clone(),
        }
    }

    /// Build an orchestrator using the catalog named in `config`, or the
    /// built-in one.
    pub fn from_config(llm: Arc<dyn TextGeneration>, config: &OpAmpConfig) -> Result<Self> {
        let catalog = match &config.style_catalog {
            Some(path) => StyleCatalog::from_yaml_file(path)?,
            None => StyleCatalog::builtin(),
        };
        Ok(Self::new(llm, config, Arc::new(catalog)))
    }

    pub fn catalog(&self) -> &StyleCatalog {
        self.reformatter.catalog()
    }

    /// Run the whole pipeline.
    ///
    /// The first opinion is the positive input and the second the negative
    /// one, whatever their content.
    pub async fn run(
        &self,
        opinion_positive: &str,
        opinion_negative: &str,
        context: &str,
        style: OutputStyle,
    ) -> Result<PipelineResult> {
        let mut run = self.start(opinion_positive, opinion_negative, context, style)?;
        log::info!(
            "Run {} started (context: '{}', style: '{}')",
            run.run_id,
            run.context,
            run.style
        );

        while !run.is_done() {
            run = self.step(run).await?;
        }

        run.into_result()
            .ok_or_else(|| OpAmpError::Config("run finished without a result".to_string()))
    }

    /// Restyle a finished result. The result itself is only borrowed.
    pub async fn reformat_only(&self, prior: &PipelineResult, style: &OutputStyle) -> Result<String> {
        log::info!("Run {}: reformatting as '{}'", prior.run_id, style);
        self.reformatter.reformat(&prior.first_synthesis, style).await
    }

    /// Validate inputs and create a run positioned at `AnalyzeInputs`.
    ///
    /// Nothing is sent to the text-generation port until the first step.
    pub fn start(
        &self,
        opinion_positive: &str,
        opinion_negative: &str,
        context: &str,
        style: OutputStyle,
    ) -> Result<PipelineRun> {
        if opinion_positive.trim().is_empty() {
            return Err(OpAmpError::EmptyInput { field: "positive opinion" });
        }
        if opinion_negative.trim().is_empty() {
            return Err(OpAmpError::EmptyInput { field: "negative opinion" });
        }
        self.catalog().validate(&style)?;

        let context = match context.trim() {
            "" => self.default_context.clone(),
            c => c.to_string(),
        };

        Ok(PipelineRun::new(
            opinion_positive.to_string(),
            opinion_negative.to_string(),
            context,
            style,
        ))
    }

    /// Execute the run's current stage and move it to the next one.
    ///
    /// A run already at `Done` is returned unchanged.
    pub async fn step(&self, mut run: PipelineRun) -> Result<PipelineRun> {
        let stage = run.stage();
        if stage.is_terminal() {
            return Ok(run);
        }

        let started = Instant::now();
        let state = std::mem::replace(&mut run.state, PipelineState::AnalyzeInputs);

        let mut next = match state {
            PipelineState::AnalyzeInputs => {
                let (first, second) = self.analyze_inputs(&run).await?;
                for (label, extraction) in [("positive opinion", &first), ("negative opinion", &second)] {
                    if let Some(reason) = extraction.diagnostic() {
                        run.diagnostics
                            .push(format!("{} analysis degraded: {}", label, reason));
                    }
                }
                PipelineState::ResolveGroundTruth {
                    first: first.into_profile(),
                    second: second.into_profile(),
                }
            }

            PipelineState::ResolveGroundTruth { first, second } => {
                let ground_truth = self
                    .ground_truth
                    .resolve(&run.opinion_positive, &run.opinion_negative, &run.context)
                    .await?;
                log::debug!("Run {}: ground truth '{}'", run.run_id, ground_truth);
                PipelineState::AssignPolarity {
                    first,
                    second,
                    ground_truth,
                }
            }

            // Positional: first is positive, second is negative.
            PipelineState::AssignPolarity {
                first,
                second,
                ground_truth,
            } => PipelineState::ComputeDeltas {
                positive: first,
                negative: second,
                ground_truth,
            },

            PipelineState::ComputeDeltas {
                positive,
                negative,
                ground_truth,
            } => {
                let deltas = self
                    .delta_calculator
                    .compute_all(&positive, &negative, &run.context, self.parallel)
                    .await?;
                PipelineState::Synthesize {
                    positive,
                    negative,
                    ground_truth,
                    deltas,
                }
            }

            PipelineState::Synthesize {
                positive,
                negative,
                ground_truth,
                deltas,
            } => {
                let first_synthesis = self
                    .synthesizer
                    .synthesize(&deltas, &ground_truth, &run.context)
                    .await?;
                PipelineState::Reformat {
                    positive,
                    negative,
                    ground_truth,
                    deltas,
                    first_synthesis,
                }
            }

            PipelineState::Reformat {
                positive,
                negative,
                ground_truth,
                deltas,
                first_synthesis,
            } => {
                let final_output = self.reformatter.reformat(&first_synthesis, &run.style).await?;
                PipelineState::Done(Box::new(PipelineResult {
                    run_id: run.run_id,
                    created_at: run.created_at,
                    context: run.context.clone(),
                    style: run.style.clone(),
                    ground_truth,
                    positive_profile: positive,
                    negative_profile: negative,
                    deltas,
                    first_synthesis,
                    final_output,
                    diagnostics: Vec::new(),
                    trace: Vec::new(),
                }))
            }

            done @ PipelineState::Done(_) => done,
        };

        run.trace.push(StageRecord {
            stage,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
        if let PipelineState::Done(result) = &mut next {
            result.diagnostics = run.diagnostics.clone();
            result.trace = run.trace.clone();
        }
        log::info!(
            "Run {}: {} complete in {:?}, next {}",
            run.run_id,
            stage,
            started.elapsed(),
            next.stage()
        );

        run.state = next;
        Ok(run)
    }

    async fn analyze_inputs(&self, run: &PipelineRun) -> Result<(ProfileExtraction, ProfileExtraction)> {
        if self.parallel {
            tokio::try_join!(
                self.analyzer.analyze(&run.opinion_positive, &run.context),
                self.analyzer.analyze(&run.opinion_negative, &run.context),
            )
        } else {
            let first = self.analyzer.analyze(&run.opinion_positive, &run.context).await?;
            let second = self.analyzer.analyze(&run.opinion_negative, &run.context).await?;
            Ok((first, second))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::testing::ScriptedLLM;
    use crate::pipeline::PipelineStage;
    use crate::types::Dimension;
    use crate::utilities::errors::GenerationError;

    const PLASTIC_NOW: &str = "Ban all plastic immediately";
    const PLASTIC_SLOW: &str = "Phase out plastic over 20 years";

    fn orchestrator(llm: Arc<ScriptedLLM>) -> PipelineOrchestrator {
        PipelineOrchestrator::new(llm, &OpAmpConfig::default(), Arc::new(StyleCatalog::builtin()))
    }

    fn sequential(llm: Arc<ScriptedLLM>) -> PipelineOrchestrator {
        let config = OpAmpConfig {
            parallel: false,
            ..OpAmpConfig::default()
        };
        PipelineOrchestrator::new(llm, &config, Arc::new(StyleCatalog::builtin()))
    }

    #[tokio::test]
    async fn test_run_produces_three_deltas() {
        let llm = Arc::new(ScriptedLLM::happy());
        let result = orchestrator(llm.clone())
            .run(PLASTIC_NOW, PLASTIC_SLOW, "environmental policy", OutputStyle::named("Press Release"))
            .await
            .unwrap();

        let dims: Vec<Dimension> = result.deltas.iter().map(|d| d.dimension).collect();
        assert_eq!(dims, Dimension::ALL.to_vec());
        assert_eq!(result.context, "environmental policy");
        assert_eq!(result.deltas.ethos.positive_description, format!("ethos of {}", PLASTIC_NOW));
        assert_eq!(result.deltas.logos.negative_description, format!("logos of {}", PLASTIC_SLOW));
        assert!(!result.is_degraded());
        // 2 analyses, ground truth, 6 delta calls, synthesis, rewrite
        assert_eq!(llm.call_count(), 11);
    }

    #[tokio::test]
    async fn test_final_output_differs_from_synthesis() {
        let llm = Arc::new(ScriptedLLM::new(|prompt, _| {
            if prompt.contains("JSON object") {
                Ok(r#"{"ethos": "e", "logos": "l", "energeia": "n"}"#.to_string())
            } else if prompt.contains("SYNTHESIS TO REWRITE") {
                Ok("Summary: a phased ban with firm deadlines".to_string())
            } else if prompt.contains("DELTA:") {
                Ok("  A phased ban with firm deadlines.  ".to_string())
            } else {
                Ok("baseline".to_string())
            }
        }));
        let result = orchestrator(llm.clone())
            .run(PLASTIC_NOW, PLASTIC_SLOW, "environmental policy", OutputStyle::named("Factual Summary"))
            .await
            .unwrap();

        assert_eq!(result.first_synthesis, "A phased ban with firm deadlines.");
        assert_eq!(result.final_output, "Summary: a phased ban with firm deadlines");
        assert_ne!(result.final_output, result.first_synthesis);
        assert_eq!(result.style, OutputStyle::named("Factual Summary"));
        assert_eq!(result.positive_profile.content, "Ban all plastic immediately");
        assert_eq!(result.deltas.iter().count(), 3);

        let rewrite = llm.calls().last().cloned().unwrap();
        assert!(rewrite.prompt.contains("A phased ban with firm deadlines."));
    }

    #[tokio::test]
    async fn test_polarity_follows_input_order() {
        let orch = orchestrator(Arc::new(ScriptedLLM::happy()));
        let style = OutputStyle::named("Factual Summary");

        let forward = orch.run(PLASTIC_NOW, PLASTIC_SLOW, "", style.clone()).await.unwrap();
        let swapped = orch.run(PLASTIC_SLOW, PLASTIC_NOW, "", style).await.unwrap();

        assert_eq!(forward.positive_profile.content, PLASTIC_NOW);
        assert_eq!(forward.negative_profile.content, PLASTIC_SLOW);
        assert_eq!(swapped.positive_profile.content, PLASTIC_SLOW);
        assert_eq!(swapped.negative_profile.content, PLASTIC_NOW);
        assert_eq!(swapped.deltas.energeia.positive_input, PLASTIC_SLOW);
        assert_eq!(forward.deltas.energeia.positive_input, PLASTIC_NOW);
    }

    #[tokio::test]
    async fn test_empty_context_uses_default() {
        let result = orchestrator(Arc::new(ScriptedLLM::happy()))
            .run(PLASTIC_NOW, PLASTIC_SLOW, "   ", OutputStyle::named("Email Draft"))
            .await
            .unwrap();
        assert_eq!(result.context, crate::utilities::config::DEFAULT_CONTEXT);
    }

    #[tokio::test]
    async fn test_malformed_analysis_degrades_but_completes() {
        let llm = Arc::new(ScriptedLLM::new(|prompt, index| {
            if prompt.contains("JSON object") {
                Ok("I would rather not answer in JSON.".to_string())
            } else {
                Ok(format!("response #{}", index))
            }
        }));
        let result = orchestrator(llm)
            .run(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Technical Report"))
            .await
            .unwrap();

        assert!(result.is_degraded());
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result.diagnostics[0].starts_with("positive opinion"));
        assert_eq!(result.positive_profile.content, PLASTIC_NOW);
        assert!(result.positive_profile.is_blank());
        assert_eq!(result.deltas.logos.positive_description, "");
        assert!(!result.final_output.is_empty());
    }

    #[tokio::test]
    async fn test_custom_style_adds_one_call() {
        let llm = Arc::new(ScriptedLLM::happy());
        let result = orchestrator(llm.clone())
            .run(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::custom("Haiku"))
            .await
            .unwrap();

        assert_eq!(llm.call_count(), 12);
        let calls = llm.calls();
        assert!(calls[10].prompt.contains("output format: Haiku"));
        assert!(calls[11].prompt.starts_with("response #10"));
        assert_eq!(result.style, OutputStyle::custom("Haiku"));
    }

    #[tokio::test]
    async fn test_unknown_style_makes_no_calls() {
        let llm = Arc::new(ScriptedLLM::happy());
        let err = orchestrator(llm.clone())
            .run(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Limerick"))
            .await
            .unwrap_err();

        assert!(matches!(err, OpAmpError::UnknownStyle { .. }));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_opinion_makes_no_calls() {
        let llm = Arc::new(ScriptedLLM::happy());
        let orch = orchestrator(llm.clone());
        let style = OutputStyle::named("Press Release");

        let err = orch.run("", PLASTIC_SLOW, "", style.clone()).await.unwrap_err();
        assert!(matches!(err, OpAmpError::EmptyInput { field: "positive opinion" }));

        let err = orch.run(PLASTIC_NOW, "  \n", "", style).await.unwrap_err();
        assert!(matches!(err, OpAmpError::EmptyInput { field: "negative opinion" }));

        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_names_stage() {
        let llm = Arc::new(ScriptedLLM::new(|prompt, index| {
            if prompt.contains("Positive Input Opinion") {
                Err(GenerationError::Provider {
                    status: 503,
                    body: "overloaded".to_string(),
                })
            } else if prompt.contains("JSON object") {
                Ok(r#"{"ethos": "e", "logos": "l", "energeia": "n"}"#.to_string())
            } else {
                Ok(format!("response #{}", index))
            }
        }));
        let err = orchestrator(llm)
            .run(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Press Release"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(PipelineStage::ResolveGroundTruth));
        assert!(err.to_string().contains("ground truth"));
    }

    #[tokio::test]
    async fn test_step_visits_stages_in_order() {
        let llm = Arc::new(ScriptedLLM::happy());
        let orch = sequential(llm.clone());
        let mut run = orch
            .start(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Social Media Post"))
            .unwrap();
        assert_eq!(llm.call_count(), 0);

        let mut visited = vec![run.stage()];
        while !run.is_done() {
            run = orch.step(run).await.unwrap();
            visited.push(run.stage());
        }
        assert_eq!(visited, PipelineStage::ALL.to_vec());

        let traced: Vec<PipelineStage> = run.trace().iter().map(|r| r.stage).collect();
        assert_eq!(traced, PipelineStage::ALL[..6].to_vec());

        // stepping a finished run is a no-op
        let run = orch.step(run).await.unwrap();
        assert!(run.is_done());
        assert_eq!(llm.call_count(), 11);

        let result = run.into_result().unwrap();
        assert_eq!(result.trace.len(), 6);
    }

    #[tokio::test]
    async fn test_assign_polarity_makes_no_calls() {
        let llm = Arc::new(ScriptedLLM::happy());
        let orch = orchestrator(llm.clone());
        let mut run = orch
            .start(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Press Release"))
            .unwrap();
        while run.stage() != PipelineStage::AssignPolarity {
            run = orch.step(run).await.unwrap();
        }
        let before = llm.call_count();
        run = orch.step(run).await.unwrap();

        assert_eq!(llm.call_count(), before);
        match run.state() {
            PipelineState::ComputeDeltas { positive, negative, .. } => {
                assert_eq!(positive.content, PLASTIC_NOW);
                assert_eq!(negative.content, PLASTIC_SLOW);
            }
            other => panic!("unexpected state {:?}", other.stage()),
        }
    }

    #[tokio::test]
    async fn test_reformat_only_twice_leaves_prior_result_unchanged() {
        let llm = Arc::new(ScriptedLLM::happy());
        let orch = orchestrator(llm.clone());
        let result = orch
            .run(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Press Release"))
            .await
            .unwrap();
        let snapshot = result.clone();
        let calls_before = llm.call_count();

        let restyled = orch
            .reformat_only(&result, &OutputStyle::named("Legal Statement"))
            .await
            .unwrap();

        assert_eq!(result, snapshot);
        assert_eq!(llm.call_count(), calls_before + 1);
        assert_eq!(restyled, format!("response #{}", calls_before));
        let last = llm.calls().last().cloned().unwrap();
        assert!(last.prompt.contains(&result.first_synthesis));

        // Custom styles cost a meta call plus the rewrite.
        let haiku = orch
            .reformat_only(&result, &OutputStyle::custom("Haiku"))
            .await
            .unwrap();

        assert_eq!(result, snapshot);
        assert_eq!(result.first_synthesis, snapshot.first_synthesis);
        assert_eq!(result.ground_truth, snapshot.ground_truth);
        assert_eq!(result.deltas, snapshot.deltas);
        assert_eq!(llm.call_count(), calls_before + 3);
        assert_eq!(haiku, format!("response #{}", calls_before + 2));
        assert_ne!(haiku, restyled);
        let last = llm.calls().last().cloned().unwrap();
        assert!(last.prompt.contains(&result.first_synthesis));
    }

    #[tokio::test]
    async fn test_reformat_only_rejects_unknown_style() {
        let llm = Arc::new(ScriptedLLM::happy());
        let orch = orchestrator(llm.clone());
        let result = orch
            .run(PLASTIC_NOW, PLASTIC_SLOW, "", OutputStyle::named("Press Release"))
            .await
            .unwrap();
        let calls_before = llm.call_count();

        let err = orch
            .reformat_only(&result, &OutputStyle::named("Sonnet"))
            .await
            .unwrap_err();
        assert!(matches!(err, OpAmpError::UnknownStyle { .. }));
        assert_eq!(llm.call_count(), calls_before);
    }

    #[test]
    fn test_from_config_reads_custom_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.yaml");
        std::fs::write(
            &path,
            "styles:\n  - name: Haiku\n    instruction: Write a haiku.\n",
        )
        .unwrap();
        let config = OpAmpConfig {
            style_catalog: Some(path),
            ..OpAmpConfig::default()
        };

        let orch = PipelineOrchestrator::from_config(Arc::new(ScriptedLLM::happy()), &config).unwrap();
        assert_eq!(orch.catalog().len(), 1);
        assert!(orch.catalog().get("haiku").is_some());
    }
}
