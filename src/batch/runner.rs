//! The sequential, resumable batch control loop.

use crate::batch::completion::{CompletionCheck, OutputExists};
use crate::batch::item::WorkItem;
use crate::batch::log::RunLog;
use crate::batch::outcome::{FailureDetail, Outcome, ProcessedItem};
use crate::batch::pacing::Pacing;
use crate::batch::summary::RunSummary;
use crate::error::GenBatchError;
use crate::image::{prepare_input, GenerationRequest, ImageProvider, SafetySetting};
use std::time::{Duration, Instant};

/// Receives progress notifications while a run is in flight.
///
/// All methods default to doing nothing.
pub trait RunObserver {
    /// An item is about to be submitted (not called for skipped items).
    fn item_started(&mut self, _item: &WorkItem, _total: usize) {}

    /// An item reached its outcome.
    fn item_finished(&mut self, _item: &WorkItem, _total: usize, _outcome: &Outcome) {}

    /// The runner is about to pause before the next item.
    fn pausing(&mut self, _pause: Duration) {}
}

impl RunObserver for () {}

/// Runs every work item through an [`ImageProvider`], one at a time.
///
/// Items whose completion check passes are skipped, so a run interrupted at
/// any point can simply be started again.
pub struct BatchRunner<P, C = OutputExists> {
    provider: P,
    completion: C,
    prompt: String,
    safety_settings: Vec<SafetySetting>,
    pacing: Pacing,
}

impl<P: ImageProvider> BatchRunner<P> {
    /// Creates a runner that skips items whose output file exists.
    pub fn new(provider: P, prompt: impl Into<String>) -> Self {
        Self {
            provider,
            completion: OutputExists,
            prompt: prompt.into(),
            safety_settings: SafetySetting::relaxed(),
            pacing: Pacing::default(),
        }
    }
}

impl<P: ImageProvider, C: CompletionCheck> BatchRunner<P, C> {
    /// Replaces the completion check.
    pub fn with_completion<C2: CompletionCheck>(self, completion: C2) -> BatchRunner<P, C2> {
        BatchRunner {
            provider: self.provider,
            completion,
            prompt: self.prompt,
            safety_settings: self.safety_settings,
            pacing: self.pacing,
        }
    }

    /// Sets the pauses between submissions.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets the safety thresholds sent with every request.
    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }

    /// The provider items are submitted to.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The configured pauses.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Evaluates a single item: skip it, or submit it and write the result.
    ///
    /// Never fails as a whole; every error is folded into [`Outcome::Failed`].
    pub async fn process_item(&self, item: &WorkItem) -> Outcome {
        if self.completion.is_complete(item) {
            return Outcome::Skipped;
        }
        self.submit(item).await.into()
    }

    async fn submit(&self, item: &WorkItem) -> Result<Outcome, FailureDetail> {
        let bytes = tokio::fs::read(&item.input)
            .await
            .map_err(GenBatchError::from)?;
        let prepared = prepare_input(&bytes)?;

        let request = GenerationRequest::new(self.prompt.as_str())
            .with_input_image(prepared.png)
            .with_safety_settings(self.safety_settings.clone());

        let images = self.provider.generate(&request).await?;
        let Some(image) = images.into_iter().next() else {
            return Err(FailureDetail::no_image());
        };

        // Only a fully received payload reaches the disk.
        image.save(&item.output)?;

        Ok(Outcome::Processed(ProcessedItem {
            output: item.output.clone(),
            bytes: image.size() as u64,
            original_size: prepared.original_size,
            submitted_side: prepared.side,
        }))
    }

    /// Processes `items` in order and returns the run's totals.
    ///
    /// Each outcome is appended to `log` when one is given. A failed item
    /// never stops the run.
    pub async fn run(
        &self,
        items: &[WorkItem],
        mut log: Option<&mut RunLog>,
        observer: &mut impl RunObserver,
    ) -> RunSummary {
        let start = Instant::now();
        let total = items.len();
        let mut summary = RunSummary::new(total);

        for (position, item) in items.iter().enumerate() {
            let outcome = if self.completion.is_complete(item) {
                Outcome::Skipped
            } else {
                observer.item_started(item, total);
                self.submit(item).await.into()
            };

            match &outcome {
                Outcome::Processed(done) => {
                    tracing::info!(index = item.index, file = %item.file_name(), bytes = done.bytes, "processed");
                }
                Outcome::Skipped => {
                    tracing::debug!(index = item.index, file = %item.file_name(), "skipped, output exists");
                }
                Outcome::Failed(failure) => {
                    tracing::warn!(index = item.index, file = %item.file_name(), kind = ?failure.kind, "failed: {failure}");
                }
            }

            if let Some(log) = log.as_deref_mut() {
                if let Err(e) = log.item(item, total, &outcome) {
                    tracing::warn!(path = %log.path().display(), "could not append to run log: {e}");
                }
            }

            observer.item_finished(item, total, &outcome);
            summary.record(&outcome);

            if position + 1 < total {
                if let Some(pause) = self.pacing.cooldown(&outcome) {
                    observer.pausing(pause);
                    tokio::time::sleep(pause).await;
                }
            }
        }

        summary.finalize(start.elapsed())
    }
}
