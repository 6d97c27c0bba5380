use std::cmp::Ordering;
use std::fmt;

use crate::error::OverdiskError;

/// Which listing a sort flag belongs to. Each accepts its own field letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// `dir`: modify date, size, attributes, name.
    Dir,
    /// `list`: dirs, files, size, name.
    List,
    /// `extcnt`: files, size, name.
    Ext,
}

impl Listing {
    pub fn allowed(self) -> &'static str {
        match self {
            Self::Dir => "*msanMSAN",
            Self::List => "*dfsnDFSN",
            Self::Ext => "*fsnFSN",
        }
    }
}

/// A single-character sort flag.
///
/// Lowercase sorts ascending, uppercase descending, `*` keeps scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder(char);

impl Default for SortOrder {
    fn default() -> Self {
        Self('*')
    }
}

impl SortOrder {
    pub fn parse(listing: Listing, s: &str) -> Result<Self, OverdiskError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if listing.allowed().contains(c) => Ok(Self(c)),
            _ => Err(OverdiskError::command(format!(
                "invalid order flag \"{s}\"; expected one of \"{}\"",
                listing.allowed()
            ))),
        }
    }

    /// Lowercase field letter, or `None` for `*`.
    pub fn key(self) -> Option<char> {
        (self.0 != '*').then(|| self.0.to_ascii_lowercase())
    }

    pub fn descending(self) -> bool {
        self.0.is_ascii_uppercase()
    }

    /// Stable-sort `rows` by `cmp` for `field`, honouring the direction.
    /// A `*` flag leaves the rows untouched.
    pub fn sort_by<T, F>(self, rows: &mut [T], cmp: F)
    where
        F: Fn(char, &T, &T) -> Ordering,
    {
        let Some(field) = self.key() else { return };
        if self.descending() {
            rows.sort_by(|a, b| cmp(field, b, a));
        } else {
            rows.sort_by(|a, b| cmp(field, a, b));
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case-insensitive name ordering, ties broken by exact spelling.
pub fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
