//! The read-eval-print loop.

use std::io::{self, Write};
use std::sync::atomic::Ordering;

use log::debug;

use crate::commands::dispatch;
use crate::error::OverdiskError;
use crate::lexer::tokenize;
use crate::state::State;
use crate::traits::{LineEditor, ReadLine};
use crate::tree::{is_separator, resolve};

/// Directory-name completions for `word`, relative to the cursor.
///
/// The part of `word` up to its last separator must name a directory; the
/// rest is matched case-insensitively as a prefix of its subdirectories.
/// Each candidate is that directory part followed by a full child name.
pub fn complete_path(state: &State, word: &str) -> Vec<String> {
    let split = word.rfind(is_separator).map_or(0, |i| i + 1);
    let (head, tail) = word.split_at(split);
    let Ok((_, dir)) = resolve(&state.root, &state.current, head) else {
        return Vec::new();
    };
    let tail = tail.to_lowercase();
    dir.subdirs()
        .filter(|d| d.name().to_lowercase().starts_with(&tail))
        .map(|d| format!("{head}{}", d.name()))
        .collect()
}

/// Runs commands against a [`State`] until `quit` or end of input.
pub struct Shell<E, W> {
    state: State,
    editor: E,
    out: W,
}

impl<E: LineEditor, W: Write> Shell<E, W> {
    pub fn new(state: State, editor: E, out: W) -> Self {
        Self { state, editor, out }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Execute one command line, printing its output or error followed by a
    /// blank line. Returns `true` when the session should end.
    pub fn execute(&mut self, line: &str) -> io::Result<bool> {
        let words = tokenize(line);
        if words.is_empty() {
            return Ok(false);
        }
        self.state.cancel.store(false, Ordering::Relaxed);

        let quit = match dispatch(&mut self.state, &words) {
            Ok(result) => {
                for l in &result.output {
                    writeln!(self.out, "{l}")?;
                }
                result.quit
            }
            Err(OverdiskError::Interrupted) => {
                debug!("command interrupted: {line}");
                writeln!(self.out, "^C")?;
                false
            }
            Err(e) => {
                debug!("{line}: {e}");
                writeln!(self.out, "ERROR: {e}")?;
                false
            }
        };
        self.state.cancel.store(false, Ordering::Relaxed);

        if !quit {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(quit)
    }

    /// Prompt, read and execute until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let prompt = self.state.prompt();
            let state = &self.state;
            let complete = |word: &str| complete_path(state, word);

            match self.editor.read_line(&prompt, &complete)? {
                ReadLine::Line(line) => {
                    if self.execute(&line)? {
                        return Ok(());
                    }
                }
                ReadLine::Interrupted => {}
                ReadLine::Eof => return Ok(()),
            }
        }
    }
}
