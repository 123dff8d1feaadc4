//! Per-item outcomes.

use serde::Serialize;
use std::path::PathBuf;

/// Why an item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service answered but returned no image payload.
    NoImage,
    /// Reading, preparing, submitting or saving raised an error.
    Service,
}

/// Failure detail attached to a failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    /// Failure category, which also selects the cooldown.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

impl FailureDetail {
    /// The service declined to produce an image.
    pub fn no_image() -> Self {
        Self {
            kind: FailureKind::NoImage,
            message: "no image returned".to_string(),
        }
    }

    /// An error was raised while handling the item.
    pub fn service(err: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Service,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<crate::error::GenBatchError> for FailureDetail {
    fn from(err: crate::error::GenBatchError) -> Self {
        Self::service(err)
    }
}

/// Details of a successfully transformed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedItem {
    /// Path the result was written to.
    pub output: PathBuf,
    /// Size of the written file in bytes.
    pub bytes: u64,
    /// Dimensions of the source image.
    pub original_size: (u32, u32),
    /// Side of the square submitted to the service.
    pub submitted_side: u32,
}

impl ProcessedItem {
    /// Output size in mebibytes.
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Terminal status of a work item after one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Output written.
    Processed(ProcessedItem),
    /// Output already existed.
    Skipped,
    /// No output written.
    Failed(FailureDetail),
}

impl Outcome {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed(_) => "OK",
            Self::Skipped => "SKIP",
            Self::Failed(_) => "FAIL",
        }
    }

    /// Returns true if the item was processed.
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed(_))
    }

    /// Returns true if the item failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<std::result::Result<Outcome, FailureDetail>> for Outcome {
    fn from(result: std::result::Result<Outcome, FailureDetail>) -> Self {
        result.unwrap_or_else(Outcome::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenBatchError;

    #[test]
    fn test_no_image_message() {
        let detail = FailureDetail::no_image();
        assert_eq!(detail.kind, FailureKind::NoImage);
        assert_eq!(detail.to_string(), "no image returned");
    }

    #[test]
    fn test_error_becomes_service_failure() {
        let detail: FailureDetail = GenBatchError::RateLimited { retry_after: None }.into();
        assert_eq!(detail.kind, FailureKind::Service);
        assert!(detail.message.starts_with("rate limited"));
    }

    #[test]
    fn test_result_flattens_into_outcome() {
        let failed: Outcome = Err(FailureDetail::no_image()).into();
        assert!(failed.is_failed());
        assert_eq!(failed.label(), "FAIL");

        let skipped: Outcome = Ok(Outcome::Skipped).into();
        assert_eq!(skipped, Outcome::Skipped);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Failed(FailureDetail::no_image())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "no_image");
    }
}
