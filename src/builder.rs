use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::engine::{run, EngineOptions, FsLister, Progress, PROGRESS_INTERVAL};
use crate::error::OverdiskError;
use crate::results::{ScanErrorGroup, ScanOutcome, ScanStats};
use crate::traits::Lister;
use crate::tree::Dir;

static FS_LISTER: FsLister = FsLister;

// ---------------------------------------------------------------------------
// ScanBuilder
// ---------------------------------------------------------------------------

/// Configures and runs one directory scan.
///
/// Created via [`overdisk::scan()`](crate::scan). Configure with chained
/// builder methods, then finish with [`run`](Self::run),
/// [`scan_directory`](Self::scan_directory) or [`rescan`](Self::rescan).
///
/// # Example
///
/// ```rust,ignore
/// let mut groups = Vec::new();
/// let root = overdisk::scan()
///     .follow_links(false)
///     .on_progress(&mut |p| eprintln!("{}", p.display()))
///     .scan_directory("/data", &mut groups)?;
/// ```
pub struct ScanBuilder<'a> {
    lister:            Option<&'a dyn Lister>,
    follow_links:      bool,
    cancel:            Option<&'a AtomicBool>,
    progress:          Option<&'a mut dyn FnMut(&Path)>,
    progress_interval: Duration,
}

impl Default for ScanBuilder<'_> {
    fn default() -> Self {
        Self {
            lister:            None,
            follow_links:      false,
            cancel:            None,
            progress:          None,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl<'a> ScanBuilder<'a> {
    // ── Source ────────────────────────────────────────────────────────────

    /// List directories through `lister` instead of the local filesystem.
    pub fn lister(mut self, lister: &'a dyn Lister) -> Self {
        self.lister = Some(lister);
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Descend into reparse points (symlinks, junctions).
    ///
    /// Off by default. When on, a link back into one of its own ancestors
    /// is recorded as a warning and left unexpanded.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// Abort the scan once `flag` becomes `true`. Polled once per directory.
    pub fn cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Call `observer` with the directory being scanned, at most once per
    /// progress interval (250 ms by default).
    pub fn on_progress(mut self, observer: &'a mut dyn FnMut(&Path)) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Scan `path` and return its freshly built children.
    ///
    /// # Errors
    ///
    /// Only [`OverdiskError::Interrupted`]. Unreadable directories are
    /// recorded in [`ScanOutcome::errors`] instead.
    pub fn run(self, path: impl AsRef<Path>) -> Result<ScanOutcome, OverdiskError> {
        let lister = self.lister.unwrap_or(&FS_LISTER);

        let opts = EngineOptions {
            lister,
            follow_links: self.follow_links,
            cancel: self.cancel,
            progress: Progress::new(self.progress, self.progress_interval),
        };

        run(path.as_ref(), opts)
    }

    /// Scan `path` into a new root [`Dir`], appending this scan's warning
    /// group to `errors`.
    pub fn scan_directory(
        self,
        path: impl AsRef<Path>,
        errors: &mut Vec<ScanErrorGroup>,
    ) -> Result<Dir, OverdiskError> {
        let path = path.as_ref();
        let outcome = self.run(path)?;
        errors.push(outcome.errors);
        Ok(Dir::root(root_name(path), outcome.children))
    }

    /// Replace the children of `dir` with a fresh scan of `path`, appending
    /// a new warning group to `errors`. On failure `dir` is left as it was.
    pub fn rescan(
        self,
        dir: &mut Dir,
        path: impl AsRef<Path>,
        errors: &mut Vec<ScanErrorGroup>,
    ) -> Result<ScanStats, OverdiskError> {
        let outcome = self.run(path)?;
        dir.children = outcome.children;
        errors.push(outcome.errors);
        Ok(outcome.stats)
    }
}

/// Display name of a scan root: its last component, or the whole path for
/// filesystem roots.
fn root_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
