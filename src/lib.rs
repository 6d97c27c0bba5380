//! # overdisk
//!
//! Interactive disk-usage explorer. A directory tree is scanned once into
//! memory; the session then navigates, lists, sorts, filters and rescans
//! parts of it from a small command shell.
//!
//! The crate owns the scanner, the in-memory tree, the aggregations and the
//! command set. Everything that touches the outside world sits behind a
//! trait: [`Lister`] for directory listings, [`Terminal`] for the screen and
//! desktop, [`LineEditor`] for input. The binary wires in the real ones.
//!
//! # Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use overdisk::{EntryRecord, Filter, Lister, OverdiskError};
//!
//! // A fixed two-level tree: /data/{a/c.txt, b.txt}
//! struct Fixed;
//!
//! impl Lister for Fixed {
//!     fn list(&self, path: &Path) -> Box<dyn Iterator<Item = Result<EntryRecord, OverdiskError>>> {
//!         let entries = if path == Path::new("/data") {
//!             vec![Ok(EntryRecord::dir("a")), Ok(EntryRecord::file("b.txt", 300))]
//!         } else {
//!             vec![Ok(EntryRecord::file("c.txt", 100))]
//!         };
//!         Box::new(entries.into_iter())
//!     }
//!
//!     fn is_dir(&self, _path: &Path) -> bool {
//!         true
//!     }
//! }
//!
//! let mut warnings = Vec::new();
//! let root = overdisk::scan()
//!     .lister(&Fixed)
//!     .scan_directory("/data", &mut warnings)
//!     .unwrap();
//!
//! let totals = root.list_stats(&Filter::default());
//! assert_eq!((totals.dirs, totals.files, totals.bytes), (1, 2, 400));
//! assert_eq!(warnings.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod commands;
pub mod editor;
pub mod engine;

mod builder;
mod console;
mod entry;
mod error;
mod filter;
mod lexer;
mod order;
mod results;
mod shell;
mod state;
mod stats;
mod table;
mod tail;
mod traits;
mod tree;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::ScanBuilder;
pub use console::ConsoleTerminal;
pub use entry::{Attributes, EntryRecord};
pub use error::OverdiskError;
pub use filter::Filter;
pub use lexer::{tokenize, Lexer};
pub use order::{Listing, SortOrder};
pub use results::{ScanErrorGroup, ScanOutcome, ScanStats};
pub use shell::{complete_path, Shell};
pub use state::{State, DEFAULT_ALIASES, DEFAULT_COLUMNS};
pub use stats::{extension, ExtStats, ExtTable, ListStats};
pub use table::{format_attributes, format_date, trim_name, Align, SizeUnit, Table};
pub use tail::{tail_filter, Tail};
pub use traits::{LineEditor, Lister, ReadLine, Terminal};
pub use tree::{resolve, Dir, File, Item};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`ScanBuilder`] to configure and run a scan.
///
/// Without a [`lister`](ScanBuilder::lister) the local filesystem is read.
pub fn scan<'a>() -> ScanBuilder<'a> {
    ScanBuilder::default()
}
