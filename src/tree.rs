//! In-memory mirror of a scanned directory subtree.
//!
//! A [`Dir`] exclusively owns its children and nothing points back up the
//! tree. Moving to a parent is done by re-walking from the root along a
//! list of path components, see [`resolve`].

use crate::entry::EntryRecord;
use crate::error::OverdiskError;

/// A leaf entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub info: EntryRecord,
}

/// A container entry.
///
/// `children` reflects the filesystem as of the last scan of this directory.
/// Unexpanded reparse points keep an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    pub info: EntryRecord,
    pub children: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    File(File),
    Dir(Dir),
}

impl Item {
    /// Wrap a listing record in the matching node type, without children.
    pub fn from_record(info: EntryRecord) -> Self {
        if info.is_dir() {
            Self::Dir(Dir::new(info))
        } else {
            Self::File(File { info })
        }
    }

    pub fn info(&self) -> &EntryRecord {
        match self {
            Self::File(f) => &f.info,
            Self::Dir(d) => &d.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn as_dir(&self) -> Option<&Dir> {
        match self {
            Self::Dir(d) => Some(d),
            Self::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut Dir> {
        match self {
            Self::Dir(d) => Some(d),
            Self::File(_) => None,
        }
    }
}

impl Dir {
    pub fn new(info: EntryRecord) -> Self {
        Self { info, children: Vec::new() }
    }

    /// A root node. The root is never shown in a listing, so only its name
    /// matters.
    pub fn root(name: impl Into<String>, children: Vec<Item>) -> Self {
        Self {
            info: EntryRecord::dir(name),
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn subdirs(&self) -> impl Iterator<Item = &Dir> {
        self.children.iter().filter_map(Item::as_dir)
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.children.iter().filter_map(|c| match c {
            Item::File(f) => Some(f),
            Item::Dir(_) => None,
        })
    }

    /// Immediate subdirectory by name. An exact match wins, otherwise the
    /// first case-insensitive match.
    pub fn child_dir(&self, name: &str) -> Option<&Dir> {
        self.subdirs()
            .find(|d| d.name() == name)
            .or_else(|| self.subdirs().find(|d| d.name().eq_ignore_ascii_case(name)))
    }

    /// Position of the child directory [`child_dir`](Self::child_dir) would return.
    fn child_dir_index(&self, name: &str) -> Option<usize> {
        let is_dir_named = |c: &Item, exact: bool| match c {
            Item::Dir(d) if exact => d.name() == name,
            Item::Dir(d) => d.name().eq_ignore_ascii_case(name),
            Item::File(_) => false,
        };
        self.children
            .iter()
            .position(|c| is_dir_named(c, true))
            .or_else(|| self.children.iter().position(|c| is_dir_named(c, false)))
    }

    /// Follow already-resolved components down from this directory.
    pub fn find(&self, components: &[String]) -> Option<&Dir> {
        components
            .iter()
            .try_fold(self, |dir, name| dir.child_dir(name))
    }

    pub fn find_mut(&mut self, components: &[String]) -> Option<&mut Dir> {
        let mut dir = self;
        for name in components {
            let idx = dir.child_dir_index(name)?;
            dir = dir.children[idx].as_dir_mut()?;
        }
        Some(dir)
    }

    /// Walk a `/`-delimited relative path that may contain `.` and `..`.
    ///
    /// `..` at this directory stays here. Fails with
    /// [`OverdiskError::PathNotFound`] if a component does not name a child
    /// directory.
    pub fn get_subdirectory(&self, relative: &str) -> Result<&Dir, OverdiskError> {
        resolve(self, &[], relative).map(|(_, dir)| dir)
    }
}

pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Resolve `path` against the cursor `base` (components below `root`).
///
/// A path starting with a separator is taken from the root instead.
/// Returns the canonical components of the target (actual child names, not
/// the spelling used in `path`) and the target itself.
pub fn resolve<'a>(
    root: &'a Dir,
    base: &[String],
    path: &str,
) -> Result<(Vec<String>, &'a Dir), OverdiskError> {
    let mut stack: Vec<&'a Dir> = vec![root];
    let mut names: Vec<String> = Vec::new();

    let start: &[String] = if path.starts_with(is_separator) { &[] } else { base };
    let tokens = start
        .iter()
        .map(String::as_str)
        .chain(path.split(is_separator));

    for token in tokens {
        match token {
            "" | "." => {}
            ".." => {
                if stack.len() > 1 {
                    stack.pop();
                    names.pop();
                }
            }
            name => {
                let current = stack[stack.len() - 1];
                let child = current.child_dir(name).ok_or_else(|| {
                    let mut shown = names.clone();
                    shown.push(name.to_string());
                    OverdiskError::PathNotFound { path: shown.join("/") }
                })?;
                names.push(child.name().to_string());
                stack.push(child);
            }
        }
    }

    let target = stack[stack.len() - 1];
    Ok((names, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dir {
        let mut docs = Dir::new(EntryRecord::dir("Docs"));
        docs.children.push(Item::Dir(Dir::new(EntryRecord::dir("old"))));
        docs.children.push(Item::File(File { info: EntryRecord::file("a.txt", 3) }));
        Dir::root(
            "root",
            vec![
                Item::Dir(docs),
                Item::File(File { info: EntryRecord::file("docs", 1) }),
                Item::Dir(Dir::new(EntryRecord::dir("src"))),
            ],
        )
    }

    #[test]
    fn walks_nested_path_case_insensitively() {
        let root = sample();
        let old = root.get_subdirectory("docs/OLD").unwrap();
        assert_eq!(old.name(), "old");
    }

    #[test]
    fn files_are_not_directories() {
        let mut root = sample();
        root.children.remove(0);
        let err = root.get_subdirectory("docs").unwrap_err();
        assert!(matches!(err, OverdiskError::PathNotFound { .. }));
    }

    #[test]
    fn dot_dot_clamps_at_root() {
        let root = sample();
        let (names, dir) = resolve(&root, &[], "../../..").unwrap();
        assert!(names.is_empty());
        assert_eq!(dir.name(), "root");
    }

    #[test]
    fn resolve_relative_to_cursor_and_absolute() {
        let root = sample();
        let base = vec!["Docs".to_string()];

        let (names, _) = resolve(&root, &base, "old/..//./old").unwrap();
        assert_eq!(names, vec!["Docs", "old"]);

        let (names, _) = resolve(&root, &base, "/src").unwrap();
        assert_eq!(names, vec!["src"]);

        let (names, _) = resolve(&root, &base, "\\docs\\old").unwrap();
        assert_eq!(names, vec!["Docs", "old"]);
    }

    #[test]
    fn missing_component_reports_path() {
        let root = sample();
        let err = resolve(&root, &["Docs".to_string()], "nope").unwrap_err();
        assert_eq!(err.to_string(), "no such directory: \"Docs/nope\"");
    }

    #[test]
    fn find_mut_reaches_nested_dir() {
        let mut root = sample();
        let path = vec!["Docs".to_string(), "old".to_string()];
        let old = root.find_mut(&path).unwrap();
        old.children.push(Item::File(File { info: EntryRecord::file("x", 1) }));
        assert_eq!(root.find(&path).unwrap().children.len(), 1);
    }
}
