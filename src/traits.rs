use std::io;
use std::path::{Path, PathBuf};

use crate::entry::EntryRecord;
use crate::error::OverdiskError;

/// Lists the immediate entries of one directory.
///
/// The scanner calls this once per directory it expands. Implement it to
/// scan something other than the local filesystem; tests use an in-memory
/// tree so unreadable directories and exact sizes are reproducible.
///
/// # Error Handling
///
/// A directory that cannot be read at all should yield a single `Err` and
/// nothing else. A single bad entry should yield an `Err` in its place and
/// let the rest of the listing continue. Either way the scanner records the
/// error as a warning and keeps going; it never aborts the scan.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use overdisk::{EntryRecord, Lister, OverdiskError};
///
/// struct Flat(Vec<EntryRecord>);
///
/// impl Lister for Flat {
///     fn list(&self, _path: &Path) -> Box<dyn Iterator<Item = Result<EntryRecord, OverdiskError>>> {
///         Box::new(self.0.clone().into_iter().map(Ok))
///     }
///
///     fn is_dir(&self, _path: &Path) -> bool {
///         true
///     }
/// }
/// ```
pub trait Lister {
    /// Yield every entry directly inside `path`, in listing order.
    fn list(&self, path: &Path) -> Box<dyn Iterator<Item = Result<EntryRecord, OverdiskError>>>;

    /// Whether `path` names an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Stable identity of a directory, used to detect link cycles when links
    /// are followed. `None` disables cycle detection for that directory.
    fn identity(&self, _path: &Path) -> Option<PathBuf> {
        None
    }
}

/// Best-effort terminal and desktop integration.
///
/// Failures are reported back to the command that asked; they never end
/// the session.
pub trait Terminal {
    fn clear_screen(&mut self) -> io::Result<()>;

    /// Current width in columns, if it can be determined.
    fn width(&self) -> Option<usize>;

    fn set_width(&mut self, cols: usize) -> io::Result<()>;

    /// Open `path` in the platform file manager.
    fn open_in_file_manager(&mut self, path: &Path) -> io::Result<()>;

    /// Called (throttled) with the directory currently being scanned.
    fn scan_progress(&mut self, path: &Path);

    /// Called once a scan completes, to erase any progress display.
    fn scan_finished(&mut self);
}

/// Outcome of reading one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    /// Ctrl-C while editing. The caller discards the line and prompts again.
    Interrupted,
    /// Input closed.
    Eof,
}

/// Interactive line input with history and TAB completion.
///
/// `complete` maps the word under the cursor to the list of replacement
/// candidates; repeated TAB presses cycle through them.
pub trait LineEditor {
    fn read_line(
        &mut self,
        prompt: &str,
        complete: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadLine>;
}
