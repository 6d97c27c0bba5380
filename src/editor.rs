//! Line input: a raw-mode editor for terminals and a plain reader for pipes.

use std::collections::VecDeque;
use std::io::{self, BufRead, Read, Write};

use crate::traits::{LineEditor, ReadLine};

/// Most history entries kept.
pub const HISTORY_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    Tab,
    Interrupt,
    EndOfInput,
    Other,
}

fn read_byte(input: &mut impl Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Decode one key press from raw terminal input. `None` at end of input.
pub fn read_key(input: &mut impl Read) -> io::Result<Option<Key>> {
    let Some(b) = read_byte(input)? else {
        return Ok(None);
    };
    let key = match b {
        b'\r' | b'\n' => Key::Enter,
        b'\t' => Key::Tab,
        0x03 => Key::Interrupt,
        0x04 => Key::EndOfInput,
        0x7f | 0x08 => Key::Backspace,
        0x01 => Key::Home,
        0x05 => Key::End,
        0x1b => read_escape(input)?,
        b if b < 0x20 => Key::Other,
        b if b < 0x80 => Key::Char(char::from(b)),
        b => read_utf8(b, input)?,
    };
    Ok(Some(key))
}

fn read_escape(input: &mut impl Read) -> io::Result<Key> {
    let key = match read_byte(input)? {
        Some(b'[') => match read_byte(input)? {
            Some(b'A') => Key::Up,
            Some(b'B') => Key::Down,
            Some(b'C') => Key::Right,
            Some(b'D') => Key::Left,
            Some(b'H') => Key::Home,
            Some(b'F') => Key::End,
            Some(d @ b'0'..=b'9') => {
                // `ESC [ n ~`; skip anything up to the terminator.
                let mut last = d;
                while last != b'~' {
                    match read_byte(input)? {
                        Some(b) if b.is_ascii_digit() || b == b';' || b == b'~' => last = b,
                        _ => return Ok(Key::Other),
                    }
                }
                match d {
                    b'1' | b'7' => Key::Home,
                    b'3' => Key::Delete,
                    b'4' | b'8' => Key::End,
                    _ => Key::Other,
                }
            }
            _ => Key::Other,
        },
        Some(b'O') => match read_byte(input)? {
            Some(b'H') => Key::Home,
            Some(b'F') => Key::End,
            _ => Key::Other,
        },
        _ => Key::Other,
    };
    Ok(key)
}

fn read_utf8(first: u8, input: &mut impl Read) -> io::Result<Key> {
    let len = match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Ok(Key::Other),
    };
    let mut bytes = vec![first];
    for _ in 1..len {
        match read_byte(input)? {
            Some(b) => bytes.push(b),
            None => return Ok(Key::Other),
        }
    }
    Ok(std::str::from_utf8(&bytes)
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Key::Other, Key::Char))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Bounded command history, oldest first.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: VecDeque<String>,
}

impl History {
    /// Record a submitted line. Blank lines and repeats of the last entry
    /// are skipped.
    pub fn push(&mut self, line: &str) {
        if line.trim().is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        if self.entries.len() == HISTORY_LIMIT {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Editing state
// ---------------------------------------------------------------------------

struct Completion {
    start: usize,
    candidates: Vec<String>,
    next: usize,
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Start of the last word of `line`, and the quote it was opened with.
///
/// Whitespace inside quotes does not end a word.
fn word_start(line: &[char]) -> (usize, Option<char>) {
    let mut start = 0;
    let mut opened = None;
    let mut inside: Option<char> = None;
    for (i, &c) in line.iter().enumerate() {
        match inside {
            Some(q) if c == q => inside = None,
            Some(_) => {}
            None if is_quote(c) => {
                inside = Some(c);
                if i == start {
                    opened = Some(c);
                }
            }
            None if c.is_whitespace() => {
                start = i + 1;
                opened = None;
            }
            None => {}
        }
    }
    (start, opened)
}

/// Quote a completion so it stays one word: with the quote the user typed,
/// or with `"` when it holds whitespace.
fn quote_candidate(candidate: &str, opened: Option<char>) -> String {
    match opened {
        Some(q) => format!("{q}{candidate}{q}"),
        None if candidate.contains(char::is_whitespace) => format!("\"{candidate}\""),
        None => candidate.to_string(),
    }
}

/// What a key press did to the line.
#[derive(Debug, PartialEq, Eq)]
pub enum Edit {
    Continue,
    Bell,
    Done(ReadLine),
}

/// The line being edited, independent of any terminal.
pub struct LineState<'h> {
    buf: Vec<char>,
    cursor: usize,
    history: &'h History,
    /// Position while browsing history; `history.len()` is the draft.
    browse: usize,
    draft: Vec<char>,
    completion: Option<Completion>,
}

impl<'h> LineState<'h> {
    pub fn new(history: &'h History) -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            history,
            browse: history.len(),
            draft: Vec::new(),
            completion: None,
        }
    }

    pub fn text(&self) -> String {
        self.buf.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_text(&mut self, text: &[char]) {
        self.buf = text.to_vec();
        self.cursor = self.buf.len();
    }

    fn recall(&mut self, index: usize) {
        if self.browse == self.history.len() {
            self.draft = self.buf.clone();
        }
        self.browse = index;
        let text: Vec<char> = match self.history.get(index) {
            Some(line) => line.chars().collect(),
            None => self.draft.clone(),
        };
        self.set_text(&text);
    }

    /// Replace the word before the cursor with the next completion.
    fn complete(&mut self, complete: &dyn Fn(&str) -> Vec<String>) -> Edit {
        if self.completion.is_none() {
            let (start, opened) = word_start(&self.buf[..self.cursor]);
            let word: String = self.buf[start..self.cursor]
                .iter()
                .filter(|&&c| !is_quote(c))
                .collect();
            let candidates: Vec<String> = complete(&word)
                .iter()
                .map(|c| quote_candidate(c, opened))
                .collect();
            if candidates.is_empty() {
                return Edit::Bell;
            }
            self.completion = Some(Completion { start, candidates, next: 0 });
        }

        let Some(c) = self.completion.as_mut() else {
            return Edit::Bell;
        };
        let replacement: Vec<char> = c.candidates[c.next].chars().collect();
        c.next = (c.next + 1) % c.candidates.len();
        let start = c.start;

        self.buf.splice(start..self.cursor, replacement.iter().copied());
        self.cursor = start + replacement.len();
        Edit::Continue
    }

    pub fn apply(&mut self, key: Key, complete: &dyn Fn(&str) -> Vec<String>) -> Edit {
        if key != Key::Tab {
            self.completion = None;
        }
        match key {
            Key::Char(c) => {
                self.buf.insert(self.cursor, c);
                self.cursor += 1;
            }
            Key::Enter => return Edit::Done(ReadLine::Line(self.text())),
            Key::Interrupt => return Edit::Done(ReadLine::Interrupted),
            Key::EndOfInput if self.buf.is_empty() => return Edit::Done(ReadLine::Eof),
            Key::EndOfInput | Key::Delete => {
                if self.cursor == self.buf.len() {
                    return Edit::Bell;
                }
                self.buf.remove(self.cursor);
            }
            Key::Backspace => {
                if self.cursor == 0 {
                    return Edit::Bell;
                }
                self.cursor -= 1;
                self.buf.remove(self.cursor);
            }
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(self.buf.len()),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = self.buf.len(),
            Key::Up => {
                if self.browse == 0 {
                    return Edit::Bell;
                }
                self.recall(self.browse - 1);
            }
            Key::Down => {
                if self.browse >= self.history.len() {
                    return Edit::Bell;
                }
                self.recall(self.browse + 1);
            }
            Key::Tab => return self.complete(complete),
            Key::Other => {}
        }
        Edit::Continue
    }

    /// Redraw the whole line in place.
    fn render(&self, prompt: &str, out: &mut impl Write) -> io::Result<()> {
        let text = self.text();
        write!(out, "\r{prompt}{text}\x1b[K")?;
        let back = self.buf.len() - self.cursor;
        if back > 0 {
            write!(out, "\x1b[{back}D")?;
        }
        out.flush()
    }
}

// ---------------------------------------------------------------------------
// Editors
// ---------------------------------------------------------------------------

/// Reads whole lines with no editing. Used when stdin is not a terminal.
pub struct PlainEditor<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PlainEditor<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> LineEditor for PlainEditor<R, W> {
    fn read_line(
        &mut self,
        prompt: &str,
        _complete: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadLine> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadLine::Eof);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        Ok(ReadLine::Line(line.to_string()))
    }
}

#[cfg(unix)]
mod raw {
    use std::io;
    use std::os::fd::AsFd;

    use nix::sys::termios::{self, OutputFlags, SetArg, Termios};

    /// Puts stdin in raw mode until dropped.
    pub(super) struct RawModeGuard {
        original: Termios,
    }

    impl RawModeGuard {
        pub(super) fn enable() -> io::Result<Self> {
            let stdin = io::stdin();
            let original = termios::tcgetattr(stdin.as_fd())?;
            let mut raw = original.clone();
            termios::cfmakeraw(&mut raw);
            // Keep "\n" -> "\r\n" so command output prints normally.
            raw.output_flags |= OutputFlags::OPOST;
            termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw)?;
            Ok(Self { original })
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            let _ = termios::tcsetattr(io::stdin().as_fd(), SetArg::TCSANOW, &self.original);
        }
    }
}

/// Interactive editor on the controlling terminal, with history and TAB
/// completion. Raw mode is only held while a line is being read.
#[cfg(unix)]
#[derive(Default)]
pub struct RawEditor {
    history: History,
}

#[cfg(unix)]
impl RawEditor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl LineEditor for RawEditor {
    fn read_line(
        &mut self,
        prompt: &str,
        complete: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadLine> {
        let mut out = io::stdout().lock();
        let mut input = io::stdin().lock();

        let result = {
            let _raw = raw::RawModeGuard::enable()?;
            let mut line = LineState::new(&self.history);
            line.render(prompt, &mut out)?;
            loop {
                let Some(key) = read_key(&mut input)? else {
                    break ReadLine::Eof;
                };
                match line.apply(key, complete) {
                    Edit::Continue => line.render(prompt, &mut out)?,
                    Edit::Bell => {
                        out.write_all(b"\x07")?;
                        out.flush()?;
                    }
                    Edit::Done(result) => break result,
                }
            }
        };

        match &result {
            ReadLine::Line(text) => {
                writeln!(out)?;
                self.history.push(text);
            }
            ReadLine::Interrupted => writeln!(out, "^C")?,
            ReadLine::Eof => writeln!(out)?,
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(bytes: &[u8]) -> Vec<Key> {
        let mut input = bytes;
        let mut out = Vec::new();
        while let Some(k) = read_key(&mut input).unwrap() {
            out.push(k);
        }
        out
    }

    fn no_completion(_: &str) -> Vec<String> {
        Vec::new()
    }

    fn type_keys(line: &mut LineState<'_>, text: &str) {
        for c in text.chars() {
            line.apply(Key::Char(c), &no_completion);
        }
    }

    #[test]
    fn decodes_arrows_and_delete() {
        assert_eq!(
            keys(b"a\x1b[A\x1b[D\x1b[3~\x1bOH\r"),
            vec![Key::Char('a'), Key::Up, Key::Left, Key::Delete, Key::Home, Key::Enter]
        );
    }

    #[test]
    fn decodes_utf8_and_controls() {
        assert_eq!(
            keys("é\x03\x04\x7f\t".as_bytes()),
            vec![Key::Char('é'), Key::Interrupt, Key::EndOfInput, Key::Backspace, Key::Tab]
        );
    }

    #[test]
    fn history_is_bounded_and_skips_repeats() {
        let mut h = History::default();
        h.push("dir");
        h.push("dir");
        h.push("   ");
        assert_eq!(h.len(), 1);
        for i in 0..HISTORY_LIMIT + 5 {
            h.push(&format!("cmd {i}"));
        }
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.get(0), Some("cmd 5"));
    }

    #[test]
    fn cursor_editing() {
        let history = History::default();
        let mut line = LineState::new(&history);
        type_keys(&mut line, "dr");
        line.apply(Key::Left, &no_completion);
        line.apply(Key::Char('i'), &no_completion);
        assert_eq!(line.text(), "dir");
        assert_eq!(line.cursor(), 2);

        line.apply(Key::Home, &no_completion);
        line.apply(Key::Delete, &no_completion);
        assert_eq!(line.text(), "ir");
        assert_eq!(line.apply(Key::Backspace, &no_completion), Edit::Bell);
        assert_eq!(
            line.apply(Key::Enter, &no_completion),
            Edit::Done(ReadLine::Line("ir".to_string()))
        );
    }

    #[test]
    fn ctrl_d_ends_input_only_on_empty_line() {
        let history = History::default();
        let mut line = LineState::new(&history);
        type_keys(&mut line, "q");
        line.apply(Key::Home, &no_completion);
        assert_eq!(line.apply(Key::EndOfInput, &no_completion), Edit::Continue);
        assert_eq!(line.text(), "");
        assert_eq!(line.apply(Key::EndOfInput, &no_completion), Edit::Done(ReadLine::Eof));
    }

    #[test]
    fn history_browsing_restores_draft() {
        let mut history = History::default();
        history.push("list");
        history.push("dir");
        let mut line = LineState::new(&history);
        type_keys(&mut line, "ext");

        line.apply(Key::Up, &no_completion);
        assert_eq!(line.text(), "dir");
        line.apply(Key::Up, &no_completion);
        assert_eq!(line.text(), "list");
        assert_eq!(line.apply(Key::Up, &no_completion), Edit::Bell);
        line.apply(Key::Down, &no_completion);
        line.apply(Key::Down, &no_completion);
        assert_eq!(line.text(), "ext");
    }

    #[test]
    fn tab_cycles_candidates_for_last_word() {
        let history = History::default();
        let mut line = LineState::new(&history);
        let complete = |word: &str| {
            assert_eq!(word, "Do");
            vec!["Docs".to_string(), "Downloads".to_string()]
        };
        type_keys(&mut line, "cd Do");

        line.apply(Key::Tab, &complete);
        assert_eq!(line.text(), "cd Docs");
        line.apply(Key::Tab, &complete);
        assert_eq!(line.text(), "cd Downloads");
        line.apply(Key::Tab, &complete);
        assert_eq!(line.text(), "cd Docs");
    }

    #[test]
    fn tab_quotes_names_with_spaces() {
        let history = History::default();
        let mut line = LineState::new(&history);
        let complete = |word: &str| {
            assert_eq!(word, "Pro");
            vec!["Program Files".to_string(), "Projects".to_string()]
        };
        type_keys(&mut line, "cd Pro");

        line.apply(Key::Tab, &complete);
        assert_eq!(line.text(), "cd \"Program Files\"");
        line.apply(Key::Tab, &complete);
        assert_eq!(line.text(), "cd Projects");
    }

    #[test]
    fn tab_keeps_the_opening_quote() {
        let history = History::default();
        let mut line = LineState::new(&history);
        let complete = |word: &str| {
            assert_eq!(word, "My D");
            vec!["My Docs".to_string()]
        };
        type_keys(&mut line, "dir 'My D");

        line.apply(Key::Tab, &complete);
        assert_eq!(line.text(), "dir 'My Docs'");
        assert_eq!(line.cursor(), line.text().chars().count());
    }

    #[test]
    fn word_start_skips_quoted_spaces() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(word_start(&chars("cd a")), (3, None));
        assert_eq!(word_start(&chars("cd \"a b")), (3, Some('"')));
        assert_eq!(word_start(&chars("cd \"a b\" c")), (9, None));
        assert_eq!(word_start(&chars("")), (0, None));
    }

    #[test]
    fn tab_without_candidates_rings() {
        let history = History::default();
        let mut line = LineState::new(&history);
        type_keys(&mut line, "cd x");
        assert_eq!(line.apply(Key::Tab, &no_completion), Edit::Bell);
        assert_eq!(line.text(), "cd x");
    }

    #[test]
    fn plain_editor_reads_lines_until_eof() {
        let mut out = Vec::new();
        let mut editor = PlainEditor::new(&b"dir\r\nlist\n"[..], &mut out);
        assert_eq!(
            editor.read_line("> ", &no_completion).unwrap(),
            ReadLine::Line("dir".to_string())
        );
        assert_eq!(
            editor.read_line("> ", &no_completion).unwrap(),
            ReadLine::Line("list".to_string())
        );
        assert_eq!(editor.read_line("> ", &no_completion).unwrap(), ReadLine::Eof);
        drop(editor);
        assert_eq!(out, b"> > > ");
    }
}
