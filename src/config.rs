//! Run configuration: directories, log location and the instruction text.

use crate::batch::{Pacing, RunMode};
use crate::error::{GenBatchError, Result};
use std::path::{Path, PathBuf};

/// Instruction sent with every image.
pub const DEFAULT_PROMPT: &str = "\
Transform this cake image into a professional product photograph with these exact specifications:

COMPOSITION:
- Perfect square format (1:1 aspect ratio, 2048x2048 pixels)
- Pure white background (#FFFFFF)
- Cake centered precisely in the frame
- Cake occupies 90% of the image area
- Professional product photography perspective

LIGHTING & COLOR:
- Soft, even studio lighting
- Consistent color temperature (neutral white, 5500K)
- No harsh shadows
- Natural highlights that enhance cake details
- Color-accurate representation

CRITICAL REQUIREMENTS:
- DO NOT add any decorative elements not present in the original cake
- DO NOT remove any existing cake decorations or features
- DO NOT modify the cake's design, colors, or structure
- PRESERVE all original cake details exactly as they appear
- Maintain super-realistic, photographic quality
- NO artistic filters or stylization

STYLE: Professional product photography, super realistic, magazine-quality
";

/// Default input directory.
pub const DEFAULT_INPUT_DIR: &str = "images/cakes";
/// Default output directory for full runs.
pub const DEFAULT_OUTPUT_DIR: &str = "images/cakes-processed";
/// Default output directory for sample runs.
pub const DEFAULT_SAMPLE_OUTPUT_DIR: &str = "images/cakes-test-output";
/// Default log file for full runs.
pub const DEFAULT_LOG_FILE: &str = "processing_log.txt";
/// Default log file for sample runs.
pub const DEFAULT_SAMPLE_LOG_FILE: &str = "test_processing_log.txt";

/// Everything a run needs besides the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Directory scanned for input images.
    pub input_dir: PathBuf,
    /// Directory transformed images are written to.
    pub output_dir: PathBuf,
    /// Append-only run log.
    pub log_file: PathBuf,
    /// Full batch or sample.
    pub mode: RunMode,
    /// Instruction text.
    pub prompt: String,
    /// Pauses between submissions.
    pub pacing: Pacing,
}

impl BatchConfig {
    /// Defaults for a full run.
    pub fn full() -> Self {
        Self {
            input_dir: DEFAULT_INPUT_DIR.into(),
            output_dir: DEFAULT_OUTPUT_DIR.into(),
            log_file: DEFAULT_LOG_FILE.into(),
            mode: RunMode::Full,
            prompt: DEFAULT_PROMPT.to_string(),
            pacing: Pacing::default(),
        }
    }

    /// Defaults for a sample run of `count` images.
    pub fn sample(count: usize) -> Self {
        Self {
            output_dir: DEFAULT_SAMPLE_OUTPUT_DIR.into(),
            log_file: DEFAULT_SAMPLE_LOG_FILE.into(),
            mode: RunMode::Sample { count },
            ..Self::full()
        }
    }

    /// Replaces the prompt with the contents of a file.
    pub fn with_prompt_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GenBatchError::Config(format!("cannot read prompt file {}: {e}", path.display()))
        })?;
        self.prompt = text;
        Ok(self)
    }

    /// Checks the configuration before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(GenBatchError::Config("prompt is empty".into()));
        }
        if let RunMode::Sample { count: 0 } = self.mode {
            return Err(GenBatchError::Config("sample size must be at least 1".into()));
        }
        if !self.input_dir.is_dir() {
            return Err(GenBatchError::Config(format!(
                "input directory {} does not exist",
                self.input_dir.display()
            )));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_defaults() {
        let config = BatchConfig::sample(5);
        assert_eq!(config.mode, RunMode::Sample { count: 5 });
        assert_eq!(config.input_dir, PathBuf::from("images/cakes"));
        assert_eq!(config.output_dir, PathBuf::from("images/cakes-test-output"));
        assert_eq!(config.log_file, PathBuf::from("test_processing_log.txt"));
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BatchConfig {
            input_dir: dir.path().to_path_buf(),
            ..BatchConfig::full()
        };
        assert!(config.validate().is_ok());

        config.mode = RunMode::Sample { count: 0 };
        assert!(matches!(config.validate(), Err(GenBatchError::Config(_))));

        config.mode = RunMode::Full;
        config.input_dir = dir.path().join("missing");
        assert!(matches!(config.validate(), Err(GenBatchError::Config(_))));
    }

    #[test]
    fn test_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Put the cake on slate.").unwrap();

        let config = BatchConfig::full().with_prompt_file(&path).unwrap();
        assert_eq!(config.prompt, "Put the cake on slate.");

        let err = BatchConfig::full()
            .with_prompt_file(dir.path().join("nope.txt"))
            .unwrap_err();
        assert!(matches!(err, GenBatchError::Config(_)));
    }
}
