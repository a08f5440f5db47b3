//! Data model shared by the pipeline stages.

pub mod delta;
pub mod dimension;
pub mod profile;

pub use delta::{Deltas, DimensionDelta};
pub use dimension::Dimension;
pub use profile::{ProfileExtraction, RhetoricalProfile};
