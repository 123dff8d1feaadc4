//! Run accounting and sample extrapolation.

use crate::batch::outcome::Outcome;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Lower bound of the per-image price used for estimates, in USD.
pub const COST_PER_IMAGE_LOW: f64 = 0.04;
/// Upper bound of the per-image price used for estimates, in USD.
pub const COST_PER_IMAGE_HIGH: f64 = 0.13;

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Aggregate counts and timing for one pass over the inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Items in the run.
    pub total: usize,
    /// Items whose output was written.
    pub processed: usize,
    /// Items whose output already existed.
    pub skipped: usize,
    /// Items that failed.
    pub failed: usize,
    /// Wall-clock time of the run.
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunSummary {
    /// Starts an empty summary for a run of `total` items.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Counts one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Processed(_) => self.processed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    /// Freezes the summary with the run's elapsed time.
    pub fn finalize(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Items counted so far.
    pub fn completed(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    /// Items that reached the service (everything but skips).
    pub fn attempted(&self) -> usize {
        self.processed + self.failed
    }

    /// Returns true when every item has been accounted for exactly once.
    pub fn is_balanced(&self) -> bool {
        self.completed() == self.total
    }

    /// Mean wall-clock time per attempted item, pauses included.
    pub fn average_per_item(&self) -> Option<Duration> {
        let attempted = u32::try_from(self.attempted()).ok().filter(|n| *n > 0)?;
        Some(self.elapsed / attempted)
    }
}

/// Linear time and cost projection for the full input set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEstimate {
    /// Number of inputs in the full set.
    pub total_images: usize,
    /// Projected wall-clock time.
    #[serde(rename = "estimated_secs", serialize_with = "serialize_secs")]
    pub estimated_time: Duration,
    /// Projected cost at the low price, USD.
    pub cost_low: f64,
    /// Projected cost at the high price, USD.
    pub cost_high: f64,
}

impl BatchEstimate {
    /// Extrapolates a sample run to `total_images` inputs.
    ///
    /// Returns `None` when the sample processed nothing, since there is no
    /// meaningful per-item timing to scale.
    pub fn from_sample(sample: &RunSummary, total_images: usize) -> Option<Self> {
        if sample.processed == 0 {
            return None;
        }
        let average = sample.average_per_item()?;
        let estimated_time = average.mul_f64(total_images as f64);

        Some(Self {
            total_images,
            estimated_time,
            cost_low: COST_PER_IMAGE_LOW * total_images as f64,
            cost_high: COST_PER_IMAGE_HIGH * total_images as f64,
        })
    }

    /// Projected time in hours.
    pub fn hours(&self) -> f64 {
        self.estimated_time.as_secs_f64() / 3600.0
    }
}
