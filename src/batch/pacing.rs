//! Pauses between submissions.

use crate::batch::outcome::{FailureKind, Outcome};
use std::time::Duration;

/// Fixed pauses that keep a run under the service's rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after a submission that returned normally.
    pub success: Duration,
    /// Longer pause after a submission that raised an error.
    pub error: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(3),
            error: Duration::from_secs(5),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            success: Duration::ZERO,
            error: Duration::ZERO,
        }
    }

    /// Selects the pause that follows `outcome`.
    ///
    /// Skipped items never touched the service and get no pause. An empty
    /// result (`NoImage`) gets the success pause, not the error cooldown.
    pub fn cooldown(&self, outcome: &Outcome) -> Option<Duration> {
        let pause = match outcome {
            Outcome::Skipped => return None,
            Outcome::Processed(_) => self.success,
            Outcome::Failed(detail) => match detail.kind {
                FailureKind::NoImage => self.success,
                FailureKind::Service => self.error,
            },
        };
        (!pause.is_zero()).then_some(pause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::outcome::{FailureDetail, ProcessedItem};

    fn processed() -> Outcome {
        Outcome::Processed(ProcessedItem {
            output: "a_processed.png".into(),
            bytes: 10,
            original_size: (10, 10),
            submitted_side: 10,
        })
    }

    #[test]
    fn test_cooldown_by_outcome() {
        let pacing = Pacing::default();
        assert_eq!(pacing.cooldown(&Outcome::Skipped), None);
        assert_eq!(pacing.cooldown(&processed()), Some(Duration::from_secs(3)));
        assert_eq!(
            pacing.cooldown(&Outcome::Failed(FailureDetail::service("boom"))),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_empty_result_uses_success_pause() {
        let pacing = Pacing::default();
        assert_eq!(
            pacing.cooldown(&Outcome::Failed(FailureDetail::no_image())),
            Some(pacing.success)
        );
    }

    #[test]
    fn test_none_never_pauses() {
        let pacing = Pacing::none();
        assert_eq!(pacing.cooldown(&processed()), None);
        assert_eq!(
            pacing.cooldown(&Outcome::Failed(FailureDetail::service("boom"))),
            None
        );
    }
}
