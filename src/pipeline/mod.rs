//! Stage sequencing for one difference-engine run.

pub mod orchestrator;
pub mod result;
pub mod run;
pub mod stage;

pub use orchestrator::PipelineOrchestrator;
pub use result::{PipelineResult, StageRecord};
pub use run::{PipelineRun, PipelineState};
pub use stage::PipelineStage;
