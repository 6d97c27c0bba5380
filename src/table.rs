//! Plain-text table rendering and the cell formatters used by the listings.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::entry::Attributes;
use crate::error::OverdiskError;

/// Narrowest the name column is ever trimmed to.
const MIN_NAME_WIDTH: usize = 12;

// ---------------------------------------------------------------------------
// Size units
// ---------------------------------------------------------------------------

/// Display unit for byte counts. `Auto` picks a unit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeUnit {
    #[default]
    Bytes,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Auto,
}

const UNIT_LETTERS: [char; 7] = ['b', 'k', 'm', 'g', 't', 'p', 'e'];

impl SizeUnit {
    pub fn parse(s: &str) -> Result<Self, OverdiskError> {
        let unit = match s.to_ascii_lowercase().as_str() {
            "b" => Self::Bytes,
            "k" => Self::Kilo,
            "m" => Self::Mega,
            "g" => Self::Giga,
            "t" => Self::Tera,
            "p" => Self::Peta,
            "e" => Self::Exa,
            "*" => Self::Auto,
            _ => return Err(OverdiskError::command(format!("invalid size unit \"{s}\""))),
        };
        Ok(unit)
    }

    fn power(self) -> Option<u32> {
        match self {
            Self::Bytes => Some(0),
            Self::Kilo => Some(1),
            Self::Mega => Some(2),
            Self::Giga => Some(3),
            Self::Tera => Some(4),
            Self::Peta => Some(5),
            Self::Exa => Some(6),
            Self::Auto => None,
        }
    }

    pub fn format(self, bytes: u64) -> String {
        match self.power() {
            Some(0) => bytes.to_string(),
            Some(p) => {
                let scaled = bytes as f64 / 1024f64.powi(p as i32);
                format!("{}", scaled.round() as u64)
            }
            None => {
                if bytes < 1024 {
                    return bytes.to_string();
                }
                let mut value = bytes as f64;
                let mut p = 0;
                while value >= 1024.0 && p < UNIT_LETTERS.len() - 1 {
                    value /= 1024.0;
                    p += 1;
                }
                // 1023.96K would print as 1024.0K.
                if (value * 10.0).round() >= 10240.0 && p < UNIT_LETTERS.len() - 1 {
                    value /= 1024.0;
                    p += 1;
                }
                format!("{value:.1}{}", UNIT_LETTERS[p].to_ascii_uppercase())
            }
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.power() {
            Some(p) => write!(f, "{}", UNIT_LETTERS[p as usize]),
            None => write!(f, "*"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell formatters
// ---------------------------------------------------------------------------

/// `yymmdd-HHMM` in local time, `?` when unknown.
pub fn format_date(time: Option<SystemTime>) -> String {
    match time {
        Some(t) => DateTime::<Local>::from(t).format("%y%m%d-%H%M").to_string(),
        None => "?".to_string(),
    }
}

/// Extra flags (high byte) as hex or `..`, then `ADSHR`.
pub fn format_attributes(attrs: Attributes) -> String {
    let extra = (attrs.bits() & 0xff00) >> 8;
    let mut s = if extra != 0 { format!("{extra:02x}") } else { "..".to_string() };
    s.push('-');
    for (flag, letter) in [
        (Attributes::ARCHIVE, 'A'),
        (Attributes::DIRECTORY, 'D'),
        (Attributes::SYSTEM, 'S'),
        (Attributes::HIDDEN, 'H'),
        (Attributes::READONLY, 'R'),
    ] {
        s.push(if attrs.contains(flag) { letter } else { '.' });
    }
    s
}

/// Shorten `name` to at most `max` chars.
///
/// Keeps the extension and replaces the end of the stem with `<..>`; if the
/// extension alone does not fit, cuts the name and appends `>`.
pub fn trim_name(name: &str, max: usize) -> String {
    let len = name.chars().count();
    if len <= max {
        return name.to_string();
    }
    let ext_len = match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos..].chars().count(),
        _ => 0,
    };
    if ext_len >= max || max <= ext_len + 4 {
        let head: String = name.chars().take(max.saturating_sub(1)).collect();
        return format!("{head}>");
    }
    let stem: String = name.chars().take(max - ext_len - 4).collect();
    let ext: String = name.chars().skip(len - ext_len).collect();
    format!("{stem}<..>{ext}")
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Rows of cells. The last column is the name column: left-aligned, never
/// padded, and trimmed to the space left by the other columns.
#[derive(Debug, Clone)]
pub struct Table {
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(aligns: Vec<Align>) -> Self {
        Self { aligns, rows: Vec::new() }
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.aligns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render to lines no wider than `width` (the name column permitting).
    pub fn render(&self, sep: &str, width: usize) -> Vec<String> {
        let last = self.aligns.len().saturating_sub(1);
        let mut widths = vec![0usize; last];
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let sep_len = sep.chars().count();
        let used: usize = widths.iter().map(|w| w + sep_len).sum();
        // Leave the final column one short so a full-width line does not wrap.
        let name_width = width.saturating_sub(used + 1).max(MIN_NAME_WIDTH);

        self.rows
            .iter()
            .map(|row| {
                let mut line = String::new();
                for (i, cell) in row.iter().enumerate() {
                    if i == last {
                        line.push_str(&trim_name(cell, name_width));
                        break;
                    }
                    let pad = widths[i].saturating_sub(cell.chars().count());
                    match self.aligns[i] {
                        Align::Right => {
                            line.extend(std::iter::repeat(' ').take(pad));
                            line.push_str(cell);
                        }
                        Align::Left => {
                            line.push_str(cell);
                            line.extend(std::iter::repeat(' ').take(pad));
                        }
                    }
                    line.push_str(sep);
                }
                line
            })
            .collect()
    }
}
