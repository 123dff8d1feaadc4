#![warn(missing_docs)]
//! GenBatch - Idempotent batch image transformation via AI image APIs.
//!
//! Reads a folder of photographs, sends each one with a fixed instruction to
//! a hosted image model, and writes the transformed result next to the
//! others. Re-running skips everything already written, so an interrupted or
//! partially failed run can simply be started again.
//!
//! # Quick Start
//!
//! ```no_run
//! use genbatch::{enumerate_inputs, BatchConfig, BatchRunner, GeminiProvider, RunLog};
//!
//! #[tokio::main]
//! async fn main() -> genbatch::Result<()> {
//!     let config = BatchConfig::full();
//!     let provider = GeminiProvider::builder().build()?;
//!
//!     std::fs::create_dir_all(&config.output_dir)?;
//!     let inputs = enumerate_inputs(&config.input_dir)?;
//!     let items = inputs.work_items(&config.output_dir, config.mode);
//!
//!     let mut log = RunLog::open(&config.log_file)?;
//!     let runner = BatchRunner::new(provider, config.prompt.as_str());
//!     let summary = runner.run(&items, Some(&mut log), &mut ()).await;
//!     println!("{} processed, {} skipped, {} failed",
//!         summary.processed, summary.skipped, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini-image`: Gemini (Google) provider
//! - `cli`: Command-line interface

mod error;

pub mod batch;
pub mod config;
pub mod image;

// Re-export error types at crate root
pub use error::{GenBatchError, Result};

pub use batch::{
    enumerate_inputs, resolve_output_path, BatchEstimate, BatchRunner, CompletionCheck,
    FailureDetail, FailureKind, InputSet, Outcome, OutputExists, Pacing, RunLog, RunMode,
    RunObserver, RunSummary, WorkItem,
};
pub use config::BatchConfig;
pub use crate::image::{
    prepare_input, square_crop_box, CropBox, GeneratedImage, GenerationRequest, ImageFormat,
    ImageProvider, SafetySetting,
};

#[cfg(feature = "gemini-image")]
pub use crate::image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::batch::{BatchRunner, Outcome, RunMode, RunSummary, WorkItem};
    pub use crate::config::BatchConfig;
    pub use crate::error::{GenBatchError, Result};
    pub use crate::image::{GenerationRequest, ImageProvider};

    #[cfg(feature = "gemini-image")]
    pub use crate::image::providers::GeminiProvider;
}
