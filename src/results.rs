use std::path::PathBuf;
use std::time::Duration;

use crate::tree::Item;

/// The output of a completed scan.
///
/// `children` is the freshly built content of the scanned directory. The
/// caller decides where to put it; the live tree is not touched by the scan.
pub struct ScanOutcome {
    pub children: Vec<Item>,

    /// Warnings recorded while scanning, as one group.
    pub errors: ScanErrorGroup,

    pub stats: ScanStats,
}

/// The warning messages of exactly one scan invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanErrorGroup {
    pub start_path: PathBuf,
    pub messages: Vec<String>,
}

impl ScanErrorGroup {
    pub fn new(start_path: impl Into<PathBuf>) -> Self {
        Self {
            start_path: start_path.into(),
            messages: Vec::new(),
        }
    }
}

/// Counters for a completed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Files found below the start directory.
    pub files: usize,

    /// Directories found below the start directory, expanded or not.
    pub dirs: usize,

    /// Wall-clock time from scan start to completion.
    pub duration: Duration,
}

impl ScanStats {
    /// One-line summary shown after `scan` and `root`.
    pub fn summary(&self, warnings: usize) -> String {
        format!(
            "{} dirs, {} files, {} warning{} ({:.2}s)",
            self.dirs,
            self.files,
            warnings,
            if warnings == 1 { "" } else { "s" },
            self.duration.as_secs_f64()
        )
    }
}
