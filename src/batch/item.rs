//! Work items: input discovery and output path derivation.

use crate::error::{GenBatchError, Result};
use crate::image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of inputs processed by a sample run.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Whether a run covers every input or a fixed-size sample for review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum RunMode {
    /// Process the whole input set.
    #[default]
    Full,
    /// Process only the first `count` inputs.
    Sample {
        /// Number of leading inputs to take.
        count: usize,
    },
}

impl RunMode {
    /// Suffix appended to the input stem to form the output name.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            Self::Full => "_processed",
            Self::Sample { .. } => "_test_processed",
        }
    }

    /// Returns true for sample runs.
    pub fn is_sample(&self) -> bool {
        matches!(self, Self::Sample { .. })
    }
}

/// One input image and its derived output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 1-based position within the run.
    pub index: usize,
    /// Source image.
    pub input: PathBuf,
    /// Where the transformed image is written.
    pub output: PathBuf,
}

impl WorkItem {
    /// Creates a work item, deriving the output path from the input.
    pub fn new(index: usize, input: impl Into<PathBuf>, output_dir: &Path, mode: RunMode) -> Self {
        let input = input.into();
        let output = resolve_output_path(&input, output_dir, mode);
        Self {
            index,
            input,
            output,
        }
    }

    /// Input file name for display.
    pub fn file_name(&self) -> String {
        display_name(&self.input)
    }

    /// Output file name for display.
    pub fn output_name(&self) -> String {
        display_name(&self.output)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Maps an input path to its output path: same stem, mode suffix, `.png`.
///
/// Pure: depends only on its arguments, never on the filesystem.
pub fn resolve_output_path(input: &Path, output_dir: &Path, mode: RunMode) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!(
        "{stem}{}.{}",
        mode.output_suffix(),
        ImageFormat::Png.extension()
    ))
}

/// Returns true if the path has one of the recognized image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some()
}

/// The ordered set of image files found in an input directory.
///
/// Iteration does not consume the set, so a run can be restarted over the
/// same inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSet {
    paths: Vec<PathBuf>,
}

impl InputSet {
    /// Number of inputs.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if no inputs were found.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterates the inputs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    /// Builds the work items for a run, honoring the sample size.
    pub fn work_items(&self, output_dir: &Path, mode: RunMode) -> Vec<WorkItem> {
        let take = match mode {
            RunMode::Full => self.paths.len(),
            RunMode::Sample { count } => count,
        };
        self.paths
            .iter()
            .take(take)
            .enumerate()
            .map(|(i, path)| WorkItem::new(i + 1, path.clone(), output_dir, mode))
            .collect()
    }
}

impl<'a> IntoIterator for &'a InputSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lists the image files in `dir`, sorted by file name.
pub fn enumerate_inputs(dir: impl AsRef<Path>) -> Result<InputSet> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        GenBatchError::Config(format!("cannot read input directory {}: {e}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(dir = %dir.display(), count = paths.len(), "enumerated inputs");
    Ok(InputSet { paths })
}
