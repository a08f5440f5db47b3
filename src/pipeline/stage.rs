//! Pipeline stage identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The ordered states of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    AnalyzeInputs,
    ResolveGroundTruth,
    AssignPolarity,
    ComputeDeltas,
    Synthesize,
    Reformat,
    Done,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: [PipelineStage; 7] = [
        PipelineStage::AnalyzeInputs,
        PipelineStage::ResolveGroundTruth,
        PipelineStage::AssignPolarity,
        PipelineStage::ComputeDeltas,
        PipelineStage::Synthesize,
        PipelineStage::Reformat,
        PipelineStage::Done,
    ];

    /// The stage after this one; `None` for `Done`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::AnalyzeInputs => Some(Self::ResolveGroundTruth),
            Self::ResolveGroundTruth => Some(Self::AssignPolarity),
            Self::AssignPolarity => Some(Self::ComputeDeltas),
            Self::ComputeDeltas => Some(Self::Synthesize),
            Self::Synthesize => Some(Self::Reformat),
            Self::Reformat => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Whether entering this stage issues generation calls.
    pub fn calls_generation(self) -> bool {
        !matches!(self, Self::AssignPolarity | Self::Done)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AnalyzeInputs => "AnalyzeInputs",
            Self::ResolveGroundTruth => "ResolveGroundTruth",
            Self::AssignPolarity => "AssignPolarity",
            Self::ComputeDeltas => "ComputeDeltas",
            Self::Synthesize => "Synthesize",
            Self::Reformat => "Reformat",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}
