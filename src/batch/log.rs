//! Append-only plain-text run log.

use crate::batch::item::WorkItem;
use crate::batch::outcome::Outcome;
use crate::batch::summary::RunSummary;
use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const RULE: &str = "============================================================";

fn now(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}

/// Audit trail of a run: a header, one line per item, a footer with totals.
///
/// The file is only ever appended to, so logs of earlier runs are kept.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Opens (creating if needed) the log at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the run header.
    pub fn header(&mut self, title: &str, total: usize) -> Result<()> {
        writeln!(self.file, "{title}")?;
        writeln!(self.file, "Started: {}", now("%Y-%m-%d %H:%M:%S"))?;
        writeln!(self.file, "Total images: {total}")?;
        writeln!(self.file, "{RULE}")?;
        writeln!(self.file)?;
        self.file.flush()?;
        Ok(())
    }

    /// Appends the line for one item.
    pub fn item(&mut self, item: &WorkItem, total: usize, outcome: &Outcome) -> Result<()> {
        let detail = match outcome {
            Outcome::Processed(_) => format!("-> {}", item.output_name()),
            Outcome::Skipped => "(already processed)".to_string(),
            Outcome::Failed(failure) => format!("- {failure}"),
        };
        writeln!(
            self.file,
            "[{}] {} [{}/{}] {} {}",
            now("%H:%M:%S"),
            outcome.label(),
            item.index,
            total,
            item.file_name(),
            detail
        )?;
        self.file.flush()?;
        Ok(())
    }

    /// Writes the closing totals.
    pub fn footer(&mut self, summary: &RunSummary) -> Result<()> {
        writeln!(self.file)?;
        writeln!(self.file, "{RULE}")?;
        writeln!(self.file, "Completed: {}", now("%Y-%m-%d %H:%M:%S"))?;
        writeln!(self.file, "Processed: {}/{}", summary.processed, summary.total)?;
        writeln!(self.file, "Skipped: {}", summary.skipped)?;
        writeln!(self.file, "Errors: {}", summary.failed)?;
        writeln!(self.file, "Elapsed: {:.1}s", summary.elapsed.as_secs_f64())?;
        writeln!(self.file)?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::item::RunMode;
    use crate::batch::outcome::FailureDetail;
    use std::time::Duration;

    #[test]
    fn test_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/run.txt");
        let item = WorkItem::new(2, "cakes/b.jpg", dir.path(), RunMode::Full);

        let mut log = RunLog::open(&path).unwrap();
        log.header("Cake Gallery - Processing Log", 3).unwrap();
        log.item(&item, 3, &Outcome::Skipped).unwrap();
        log.item(&item, 3, &Outcome::Failed(FailureDetail::no_image()))
            .unwrap();

        let mut summary = RunSummary::new(3);
        summary.skipped = 1;
        summary.failed = 1;
        log.footer(&summary.finalize(Duration::from_secs(2))).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Cake Gallery - Processing Log\nStarted: "));
        assert!(text.contains("Total images: 3\n"));
        assert!(text.contains("SKIP [2/3] b.jpg (already processed)\n"));
        assert!(text.contains("FAIL [2/3] b.jpg - no image returned\n"));
        assert!(text.contains("Processed: 0/3\nSkipped: 1\nErrors: 1\nElapsed: 2.0s\n"));
    }

    #[test]
    fn test_log_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");

        RunLog::open(&path).unwrap().header("first", 1).unwrap();
        RunLog::open(&path).unwrap().header("second", 1).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("first\n"));
        assert!(text.contains("\nsecond\n"));
    }
}
