//! State of one in-flight pipeline run.
//!
//! Each [`PipelineState`] variant carries exactly the intermediate results
//! its successor depends on, so a transition cannot read something that has
//! not been produced yet.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::result::{PipelineResult, StageRecord};
use super::stage::PipelineStage;
use crate::styles::OutputStyle;
use crate::types::{Deltas, RhetoricalProfile};

/// Data held while waiting to enter a stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Waiting to analyze both opinions.
    AnalyzeInputs,
    /// Profiles in input order; waiting for the global baseline.
    ResolveGroundTruth {
        first: RhetoricalProfile,
        second: RhetoricalProfile,
    },
    /// Waiting to bind input order to polarity.
    AssignPolarity {
        first: RhetoricalProfile,
        second: RhetoricalProfile,
        ground_truth: String,
    },
    ComputeDeltas {
        positive: RhetoricalProfile,
        negative: RhetoricalProfile,
        ground_truth: String,
    },
    Synthesize {
        positive: RhetoricalProfile,
        negative: RhetoricalProfile,
        ground_truth: String,
        deltas: Deltas,
    },
    Reformat {
        positive: RhetoricalProfile,
        negative: RhetoricalProfile,
        ground_truth: String,
        deltas: Deltas,
        first_synthesis: String,
    },
    Done(Box<PipelineResult>),
}

impl PipelineState {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::AnalyzeInputs => PipelineStage::AnalyzeInputs,
            Self::ResolveGroundTruth { .. } => PipelineStage::ResolveGroundTruth,
            Self::AssignPolarity { .. } => PipelineStage::AssignPolarity,
            Self::ComputeDeltas { .. } => PipelineStage::ComputeDeltas,
            Self::Synthesize { .. } => PipelineStage::Synthesize,
            Self::Reformat { .. } => PipelineStage::Reformat,
            Self::Done(_) => PipelineStage::Done,
        }
    }
}

/// One run of the pipeline, advanced by
/// [`PipelineOrchestrator::step`](super::PipelineOrchestrator::step).
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub(crate) run_id: Uuid,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) opinion_positive: String,
    pub(crate) opinion_negative: String,
    pub(crate) context: String,
    pub(crate) style: OutputStyle,
    pub(crate) state: PipelineState,
    pub(crate) diagnostics: Vec<String>,
    pub(crate) trace: Vec<StageRecord>,
}

impl PipelineRun {
    pub(crate) fn new(
        opinion_positive: String,
        opinion_negative: String,
        context: String,
        style: OutputStyle,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            opinion_positive,
            opinion_negative,
            context,
            style,
            state: PipelineState::AnalyzeInputs,
            diagnostics: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// The stage the run will execute next.
    pub fn stage(&self) -> PipelineStage {
        self.state.stage()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Completed stages so far, in order.
    pub fn trace(&self) -> &[StageRecord] {
        &self.trace
    }

    pub fn is_done(&self) -> bool {
        self.stage().is_terminal()
    }

    /// The result, once the run reached `Done`.
    pub fn into_result(self) -> Option<PipelineResult> {
        match self.state {
            PipelineState::Done(result) => Some(*result),
            _ => None,
        }
    }
}
