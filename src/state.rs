//! Session state shared by every command handler.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::builder::ScanBuilder;
use crate::error::OverdiskError;
use crate::filter::Filter;
use crate::order::SortOrder;
use crate::results::{ScanErrorGroup, ScanStats};
use crate::table::SizeUnit;
use crate::traits::{Lister, Terminal};
use crate::tree::{resolve, Dir};

/// Width used when the terminal cannot tell.
pub const DEFAULT_COLUMNS: usize = 80;

/// Aliases every session starts with.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("?", "help"),
    ("d", "dir"),
    ("do", "dirorder"),
    ("e", "extcnt"),
    ("eo", "extorder"),
    ("f", "filter"),
    ("g", "go"),
    ("l", "list"),
    ("lo", "listorder"),
    ("q", "quit"),
    ("r", "root"),
    ("s", "scan"),
    ("se", "scanerr"),
    ("t", "tail"),
    ("u", "unit"),
];

/// Everything one interactive session knows.
///
/// Created once from the root path; `root` and its subtrees are rebuilt in
/// place by the `scan` and `root` commands.
pub struct State {
    pub root: Dir,
    pub root_path: PathBuf,
    /// Cursor below `root`, as canonical child names. Never above the root.
    pub current: Vec<String>,
    pub scan_links: bool,
    pub scan_errors: Vec<ScanErrorGroup>,
    pub dir_order: SortOrder,
    pub list_order: SortOrder,
    pub ext_order: SortOrder,
    pub unit: SizeUnit,
    pub filter: Filter,
    pub tail_count: i64,
    pub aliases: BTreeMap<String, String>,
    pub column_separator: String,
    pub columns: usize,
    pub lister: Box<dyn Lister>,
    pub terminal: Box<dyn Terminal>,
    pub cancel: Arc<AtomicBool>,
}

impl State {
    /// Scan `root_path` and start a session on it.
    ///
    /// Warnings of this first scan are logged but not kept as a scan error
    /// group; groups come from the `root` and `scan` commands only.
    pub fn open(
        root_path: impl AsRef<Path>,
        scan_links: bool,
        lister: Box<dyn Lister>,
        terminal: Box<dyn Terminal>,
        cancel: Arc<AtomicBool>,
    ) -> Result<Self, OverdiskError> {
        let columns = terminal.width().unwrap_or(DEFAULT_COLUMNS);
        let mut state = Self {
            root: Dir::root("", Vec::new()),
            root_path: PathBuf::new(),
            current: Vec::new(),
            scan_links,
            scan_errors: Vec::new(),
            dir_order: SortOrder::default(),
            list_order: SortOrder::default(),
            ext_order: SortOrder::default(),
            unit: SizeUnit::default(),
            filter: Filter::default(),
            tail_count: 0,
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            column_separator: " ".to_string(),
            columns,
            lister,
            terminal,
            cancel,
        };
        state.replace_root(root_path.as_ref(), false)?;
        Ok(state)
    }

    /// Absolute filesystem path of a directory given by its components.
    pub fn absolute_path(&self, components: &[String]) -> PathBuf {
        components
            .iter()
            .fold(self.root_path.clone(), |path, name| path.join(name))
    }

    pub fn current_path(&self) -> PathBuf {
        self.absolute_path(&self.current)
    }

    /// Resolve an optional path argument against the cursor.
    pub fn locate(&self, path: Option<&str>) -> Result<(Vec<String>, &Dir), OverdiskError> {
        resolve(&self.root, &self.current, path.unwrap_or(""))
    }

    /// Replace the whole tree with a scan of `path`, resetting the cursor.
    /// The previous tree survives a failed or interrupted scan.
    pub fn set_root(&mut self, path: &Path) -> Result<ScanStats, OverdiskError> {
        self.replace_root(path, true)
    }

    fn replace_root(&mut self, path: &Path, record: bool) -> Result<ScanStats, OverdiskError> {
        let path = std::path::absolute(path).map_err(|source| OverdiskError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !self.lister.is_dir(&path) {
            return Err(OverdiskError::NotADirectory(path));
        }

        let mut root = Dir::root("", Vec::new());
        let stats = self.scan_into(&mut root, &path, record)?;
        root.info.name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        self.root = root;
        self.root_path = path;
        self.current.clear();
        Ok(stats)
    }

    /// Rescan the directory at `components` in place.
    ///
    /// A reparse point is left unexpanded unless the session follows links;
    /// the skip is recorded as a one-warning group.
    pub fn rescan(&mut self, components: &[String]) -> Result<ScanStats, OverdiskError> {
        let path = self.absolute_path(components);
        let target = self
            .root
            .find(components)
            .ok_or_else(|| OverdiskError::PathNotFound { path: components.join("/") })?;

        if !self.scan_links && target.info.is_reparse_point() {
            let err = OverdiskError::LinkNotFollowed(path.clone());
            warn!("{err}");
            let mut group = ScanErrorGroup::new(path);
            group.messages.push(err.to_string());
            self.scan_errors.push(group);
            return Ok(ScanStats { files: 0, dirs: 0, duration: Duration::ZERO });
        }

        let mut fresh = Dir::root("", Vec::new());
        let stats = self.scan_into(&mut fresh, &path, true)?;

        let dir = self
            .root
            .find_mut(components)
            .ok_or_else(|| OverdiskError::PathNotFound { path: components.join("/") })?;
        dir.children = fresh.children;
        Ok(stats)
    }

    /// Scan `path` into `dir`. With `record` off the warning group is
    /// dropped after logging.
    fn scan_into(
        &mut self,
        dir: &mut Dir,
        path: &Path,
        record: bool,
    ) -> Result<ScanStats, OverdiskError> {
        debug!("scanning {} (follow links: {})", path.display(), self.scan_links);
        let mut unrecorded = Vec::new();
        let errors = if record { &mut self.scan_errors } else { &mut unrecorded };
        let terminal = &mut self.terminal;
        let mut observer = |p: &Path| terminal.scan_progress(p);

        let res = ScanBuilder::default()
            .lister(&*self.lister)
            .follow_links(self.scan_links)
            .cancel_flag(&self.cancel)
            .on_progress(&mut observer)
            .rescan(dir, path, errors);

        self.terminal.scan_finished();
        res
    }

    /// Prompt text: active filter/tail markers, then the current path.
    pub fn prompt(&self) -> String {
        let mut flags = String::new();
        if !self.filter.is_empty() {
            flags.push('F');
        }
        if self.tail_count != 0 {
            flags.push('T');
        }
        let marker = if flags.is_empty() { String::new() } else { format!("[{flags}] ") };
        format!("{marker}:: {}>", self.current_path().display())
    }
}
