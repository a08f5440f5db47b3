//! The audit trail of one pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::PipelineStage;
use crate::styles::OutputStyle;
use crate::types::{Deltas, RhetoricalProfile};

/// Time spent in one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub elapsed_ms: u64,
}

/// Everything one run produced, from profiles to the styled output.
///
/// Returned by value. Re-entrant reformatting borrows it immutably, so the
/// upstream fields cannot change after the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub context: String,
    /// Style of `final_output`.
    pub style: OutputStyle,
    pub ground_truth: String,
    /// Profile of the first opinion.
    #[serde(rename = "positive_input")]
    pub positive_profile: RhetoricalProfile,
    /// Profile of the second opinion.
    #[serde(rename = "negative_input")]
    pub negative_profile: RhetoricalProfile,
    pub deltas: Deltas,
    pub first_synthesis: String,
    pub final_output: String,
    /// Non-fatal conditions met along the way.
    #[serde(default)]
    pub diagnostics: Vec<String>,
    /// Stages in the order they completed.
    #[serde(default)]
    pub trace: Vec<StageRecord>,
}

impl PipelineResult {
    /// Whether any profile extraction degraded.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
