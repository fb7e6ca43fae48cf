//! Run summary persistence.
//!
//! Appends one JSON object per finished run to a file. Failures are reported
//! to the run, which logs them and carries on.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use lastrealm_gameplay::{RunSummary, RunSummarySink, SummarySinkResult};
use tracing::{debug, warn};

/// Summary sink writing JSON lines.
#[derive(Debug, Clone)]
pub struct JsonLinesSummarySink {
    path: PathBuf,
}

impl JsonLinesSummarySink {
    /// Sink appending to `path`. The file is created on first submit.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// File receiving summaries.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunSummarySink for JsonLinesSummarySink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn submit(&mut self, summary: &RunSummary) -> SummarySinkResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(summary)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        debug!("Wrote run summary to {}", self.path.display());
        Ok(())
    }
}

/// Reads every summary in a JSON-lines file. Lines that do not parse are
/// skipped with a warning.
pub fn read_summaries(path: impl AsRef<Path>) -> SummarySinkResult<Vec<RunSummary>> {
    let file = File::open(path)?;
    let mut summaries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(summary) => summaries.push(summary),
            Err(e) => warn!("Skipping summary line {}: {e}", index + 1),
        }
    }
    Ok(summaries)
}

/// Best score among the recorded runs.
#[must_use]
pub fn best_score(summaries: &[RunSummary]) -> Option<&RunSummary> {
    summaries.iter().max_by_key(|s| s.score)
}
