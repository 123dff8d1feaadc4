//! Idempotent batch processing.

mod completion;
mod item;
mod log;
mod outcome;
mod pacing;
mod runner;
mod summary;

pub use completion::{CompletionCheck, OutputExists};
pub use item::{
    enumerate_inputs, is_supported_image, resolve_output_path, InputSet, RunMode, WorkItem,
    DEFAULT_SAMPLE_SIZE,
};
pub use log::RunLog;
pub use outcome::{FailureDetail, FailureKind, Outcome, ProcessedItem};
pub use pacing::Pacing;
pub use runner::{BatchRunner, RunObserver};
pub use summary::{BatchEstimate, RunSummary, COST_PER_IMAGE_HIGH, COST_PER_IMAGE_LOW};
