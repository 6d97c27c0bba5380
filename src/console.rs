use std::io::{self, Write};
use std::path::Path;

use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, SetSize};

use crate::table::trim_name;
use crate::traits::Terminal;

/// Rows requested alongside a new width when the terminal won't say.
const FALLBACK_ROWS: u16 = 24;

/// [`Terminal`] on the process's stdout/stderr.
///
/// Scan progress goes to stderr on a single, repeatedly overwritten line.
#[derive(Debug, Default)]
pub struct ConsoleTerminal {
    width: Option<usize>,
    progress_shown: bool,
}

impl ConsoleTerminal {
    pub fn new() -> Self {
        Self::default()
    }
}

fn env_columns() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Width to lay tables out for: an explicit `cols` setting, then the
/// window size the terminal reports, then `$COLUMNS`.
fn pick_width(
    stored: Option<usize>,
    queried: Option<(u16, u16)>,
    env: Option<usize>,
) -> Option<usize> {
    stored
        .or_else(|| queried.map(|(cols, _)| usize::from(cols)).filter(|&n| n > 0))
        .or_else(|| env.filter(|&n| n > 0))
}

impl Terminal for ConsoleTerminal {
    fn clear_screen(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn width(&self) -> Option<usize> {
        pick_width(self.width, terminal::size().ok(), env_columns())
    }

    fn set_width(&mut self, cols: usize) -> io::Result<()> {
        // Terminals that ignore the resize request keep their size.
        let rows = terminal::size().map_or(FALLBACK_ROWS, |(_, rows)| rows);
        let cols16 = u16::try_from(cols).unwrap_or(u16::MAX);
        let mut out = io::stdout();
        execute!(out, SetSize(cols16, rows))?;
        self.width = Some(cols);
        Ok(())
    }

    fn open_in_file_manager(&mut self, path: &Path) -> io::Result<()> {
        open::that(path)
    }

    fn scan_progress(&mut self, path: &Path) {
        let width = self.width().unwrap_or(crate::state::DEFAULT_COLUMNS);
        let shown = trim_name(&path.display().to_string(), width.saturating_sub(1));
        let mut err = io::stderr();
        let _ = execute!(err, MoveToColumn(0), Clear(ClearType::UntilNewLine));
        let _ = write!(err, "{shown}");
        let _ = err.flush();
        self.progress_shown = true;
    }

    fn scan_finished(&mut self) {
        if std::mem::take(&mut self.progress_shown) {
            let mut err = io::stderr();
            let _ = execute!(err, MoveToColumn(0), Clear(ClearType::UntilNewLine));
        }
    }
}
