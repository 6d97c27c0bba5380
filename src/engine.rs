use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ignore::{DirEntry, WalkBuilder};
use log::{debug, info, trace, warn};

use crate::entry::{Attributes, EntryRecord};
use crate::error::OverdiskError;
use crate::results::{ScanErrorGroup, ScanOutcome, ScanStats};
use crate::traits::Lister;
use crate::tree::Item;

/// Minimum time between two progress callbacks.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// FsLister
// ---------------------------------------------------------------------------

/// [`Lister`] over the local filesystem.
///
/// Lists exactly one level with every `ignore` filter switched off, so
/// hidden files and ignored paths are all counted.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl Lister for FsLister {
    fn list(&self, path: &Path) -> Box<dyn Iterator<Item = Result<EntryRecord, OverdiskError>>> {
        // A followed link is listed through its target; the walker would
        // otherwise report the link itself and stop.
        let target = if path.is_symlink() {
            std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        } else {
            path.to_path_buf()
        };

        let mut builder = WalkBuilder::new(&target);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .max_depth(Some(1));

        Box::new(builder.build().filter_map(move |res| match res {
            Ok(entry) if entry.depth() == 0 => None,
            Ok(entry) => Some(record_from_entry(&entry)),
            Err(e) => Some(Err(map_ignore_error(e, &target))),
        }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn identity(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }
}

fn record_from_entry(entry: &DirEntry) -> Result<EntryRecord, OverdiskError> {
    let name = entry.file_name().to_string_lossy().into_owned();
    let meta = entry
        .metadata()
        .map_err(|e| map_ignore_error(e, entry.path()))?;

    let is_link = meta.file_type().is_symlink();
    let target_is_dir = is_link && entry.path().is_dir();
    let attributes = Attributes::from_metadata(&name, &meta, target_is_dir);

    let size = if attributes.contains(Attributes::DIRECTORY) {
        0
    } else if is_link {
        std::fs::metadata(entry.path()).map_or(meta.len(), |m| m.len())
    } else {
        meta.len()
    };

    Ok(EntryRecord {
        name,
        size,
        attributes,
        modified: meta.modified().ok(),
        created: meta.created().ok(),
    })
}

// ---------------------------------------------------------------------------
// Map ignore::Error to OverdiskError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error, fallback: &Path) -> OverdiskError {
    match e {
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err, fallback),
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => io_error(path, io_err),
            other => map_ignore_error(other, &path),
        },
        ignore::Error::Loop { child, .. } => OverdiskError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => io_error(fallback.to_path_buf(), io_err),
        other => OverdiskError::Io {
            path: fallback.to_path_buf(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}

fn io_error(path: PathBuf, source: std::io::Error) -> OverdiskError {
    if source.kind() == std::io::ErrorKind::PermissionDenied {
        OverdiskError::PermissionDenied(path)
    } else {
        OverdiskError::Io { path, source }
    }
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions<'a> {
    pub lister:       &'a dyn Lister,
    pub follow_links: bool,
    pub cancel:       Option<&'a AtomicBool>,
    pub progress:     Progress<'a>,
}

/// Time-throttled progress observer.
pub(crate) struct Progress<'a> {
    observer: Option<&'a mut dyn FnMut(&Path)>,
    interval: Duration,
    last:     Option<Instant>,
}

impl<'a> Progress<'a> {
    pub fn new(observer: Option<&'a mut dyn FnMut(&Path)>, interval: Duration) -> Self {
        Self { observer, interval, last: None }
    }

    fn tick(&mut self, path: &Path) {
        let due = self.last.map_or(true, |t| t.elapsed() >= self.interval);
        if let (true, Some(observer)) = (due, self.observer.as_deref_mut()) {
            self.last = Some(Instant::now());
            observer(path);
        }
    }
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// One directory being filled in.
struct Frame {
    path:     PathBuf,
    items:    Vec<Item>,
    /// Indices into `items` of subdirectories still to expand.
    pending:  std::vec::IntoIter<usize>,
    /// Index of the subdirectory whose frame sits above this one.
    current:  Option<usize>,
    identity: Option<PathBuf>,
}

struct Scanner<'a> {
    opts:   EngineOptions<'a>,
    errors: ScanErrorGroup,
    files:  usize,
    dirs:   usize,
}

impl Scanner<'_> {
    fn check_cancel(&self) -> Result<(), OverdiskError> {
        match self.opts.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(OverdiskError::Interrupted),
            _ => Ok(()),
        }
    }

    fn warn(&mut self, err: OverdiskError) {
        warn!("{err}");
        self.errors.messages.push(err.to_string());
    }

    /// List `path` into a new frame. Recoverable listing errors become
    /// warnings; anything else ends the scan.
    fn open(&mut self, path: PathBuf, identity: Option<PathBuf>) -> Result<Frame, OverdiskError> {
        trace!("listing {}", path.display());
        self.opts.progress.tick(&path);

        let mut items = Vec::new();
        for res in self.opts.lister.list(&path) {
            match res {
                Ok(record) => items.push(Item::from_record(record)),
                Err(e) if e.is_recoverable() => self.warn(e),
                Err(e) => return Err(e),
            }
        }

        let follow = self.opts.follow_links;
        let mut pending = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match item {
                Item::Dir(d) => {
                    self.dirs += 1;
                    if follow || !d.info.is_reparse_point() {
                        pending.push(i);
                    }
                }
                Item::File(_) => self.files += 1,
            }
        }

        Ok(Frame {
            path,
            items,
            pending: pending.into_iter(),
            current: None,
            identity,
        })
    }
}

/// Build the children of `root` without touching any existing tree.
///
/// Uses an explicit frame stack instead of recursion. Unreadable
/// directories become warnings with empty children; the hard failures are
/// cancellation and listing errors that are not recoverable.
pub(crate) fn run(root: &Path, opts: EngineOptions) -> Result<ScanOutcome, OverdiskError> {
    let start = Instant::now();
    let identity = if opts.follow_links { opts.lister.identity(root) } else { None };

    let mut scanner = Scanner {
        opts,
        errors: ScanErrorGroup::new(root),
        files: 0,
        dirs: 0,
    };

    scanner.check_cancel()?;
    let mut stack = vec![scanner.open(root.to_path_buf(), identity)?];

    loop {
        let Some(frame) = stack.last_mut() else {
            return Ok(ScanOutcome {
                children: Vec::new(),
                errors: scanner.errors,
                stats: ScanStats { files: 0, dirs: 0, duration: start.elapsed() },
            });
        };

        let next = frame.pending.next().map(|idx| {
            frame.current = Some(idx);
            let item = &frame.items[idx];
            (frame.path.join(item.name()), item.info().is_reparse_point())
        });

        match next {
            Some((child_path, is_link)) => {
                scanner.check_cancel()?;
                let identity = if scanner.opts.follow_links {
                    scanner.opts.lister.identity(&child_path)
                } else {
                    None
                };
                let looped = is_link
                    && identity.is_some()
                    && stack.iter().any(|f| f.identity == identity);
                if looped {
                    scanner.warn(OverdiskError::SymlinkLoop(child_path));
                    continue;
                }
                let child = scanner.open(child_path, identity)?;
                stack.push(child);
            }
            None => {
                let Some(done) = stack.pop() else { continue };
                match stack.last_mut() {
                    Some(parent) => {
                        let slot = parent.current.and_then(|i| parent.items[i].as_dir_mut());
                        if let Some(dir) = slot {
                            dir.children = done.items;
                        }
                    }
                    None => {
                        let stats = ScanStats {
                            files:    scanner.files,
                            dirs:     scanner.dirs,
                            duration: start.elapsed(),
                        };
                        info!(
                            "scanned {}: {} dirs, {} files, {} warnings in {:.3}s",
                            root.display(),
                            stats.dirs,
                            stats.files,
                            scanner.errors.messages.len(),
                            stats.duration.as_secs_f64()
                        );
                        debug!("scan of {} complete", root.display());
                        return Ok(ScanOutcome {
                            children: done.items,
                            errors: scanner.errors,
                            stats,
                        });
                    }
                }
            }
        }
    }
}
