//! Aggregates computed on demand from the tree.
//!
//! Nothing here is cached on the nodes, so the numbers always describe the
//! tree as of its last scan.

use std::collections::HashMap;

use crate::filter::Filter;
use crate::tree::{Dir, Item};

/// Recursive directory, file and byte totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListStats {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
}

impl ListStats {
    pub fn add(&mut self, other: ListStats) {
        self.dirs += other.dirs;
        self.files += other.files;
        self.bytes += other.bytes;
    }
}

/// Per-extension totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtStats {
    pub files: u64,
    pub bytes: u64,
}

/// Extension table in first-encounter order.
#[derive(Debug, Default, Clone)]
pub struct ExtTable {
    rows: Vec<(String, ExtStats)>,
    index: HashMap<String, usize>,
}

impl ExtTable {
    pub fn record(&mut self, ext: String, bytes: u64) {
        let idx = match self.index.get(&ext) {
            Some(&i) => i,
            None => {
                self.index.insert(ext.clone(), self.rows.len());
                self.rows.push((ext, ExtStats::default()));
                self.rows.len() - 1
            }
        };
        let stats = &mut self.rows[idx].1;
        stats.files += 1;
        stats.bytes += bytes;
    }

    pub fn get(&self, ext: &str) -> Option<ExtStats> {
        self.index.get(ext).map(|&i| self.rows[i].1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> ExtStats {
        self.rows.iter().fold(ExtStats::default(), |acc, (_, s)| ExtStats {
            files: acc.files + s.files,
            bytes: acc.bytes + s.bytes,
        })
    }

    pub fn into_rows(self) -> Vec<(String, ExtStats)> {
        self.rows
    }
}

/// Lowercased extension including the dot, or `""` when there is none.
///
/// Leading dots belong to the name: `.bashrc` has no extension.
pub fn extension(name: &str) -> String {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(pos) => name[stem_start + pos..].to_lowercase(),
        None => String::new(),
    }
}

impl Dir {
    /// Totals for everything below this directory.
    ///
    /// Only files accepted by `filter` are counted. Subdirectories are
    /// always counted; the directory itself is not.
    pub fn list_stats(&self, filter: &Filter) -> ListStats {
        let mut stats = ListStats::default();
        let mut stack: Vec<&Dir> = vec![self];
        while let Some(dir) = stack.pop() {
            for child in &dir.children {
                match child {
                    Item::Dir(d) => {
                        stats.dirs += 1;
                        stack.push(d);
                    }
                    Item::File(f) if filter.accepts(&f.info.name) => {
                        stats.files += 1;
                        stats.bytes += f.info.size;
                    }
                    Item::File(_) => {}
                }
            }
        }
        stats
    }

    /// Add every accepted file below this directory to `table`.
    pub fn add_ext_stats(&self, filter: &Filter, table: &mut ExtTable) {
        let mut stack: Vec<&Dir> = vec![self];
        while let Some(dir) = stack.pop() {
            // Pushed in reverse so the walk visits children in listing order.
            for child in dir.children.iter().rev() {
                if let Item::Dir(d) = child {
                    stack.push(d);
                }
            }
            for file in dir.files().filter(|f| filter.accepts(&f.info.name)) {
                table.record(extension(&file.info.name), file.info.size);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryRecord;
    use crate::tree::File;

    fn file(name: &str, size: u64) -> Item {
        Item::File(File { info: EntryRecord::file(name, size) })
    }

    fn dir(name: &str, children: Vec<Item>) -> Item {
        let mut d = Dir::new(EntryRecord::dir(name));
        d.children = children;
        Item::Dir(d)
    }

    fn sample() -> Dir {
        Dir::root(
            "root",
            vec![
                file("top.TXT", 10),
                dir("a", vec![file("x.txt", 100), file("y.jpg", 200), dir("deep", vec![file("z", 5)])]),
                dir("b", vec![]),
            ],
        )
    }

    #[test]
    fn extension_rules() {
        assert_eq!(extension("a.TXT"), ".txt");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("Makefile"), "");
        assert_eq!(extension(".bashrc"), "");
        assert_eq!(extension(".config.toml"), ".toml");
        assert_eq!(extension("trailing."), ".");
    }

    #[test]
    fn list_stats_excludes_self() {
        let root = sample();
        let stats = root.list_stats(&Filter::default());
        assert_eq!(stats, ListStats { dirs: 3, files: 4, bytes: 315 });

        let a = root.child_dir("a").unwrap();
        assert_eq!(a.list_stats(&Filter::default()), ListStats { dirs: 1, files: 3, bytes: 305 });
    }

    #[test]
    fn filter_suppresses_files_not_dirs() {
        let root = sample();
        let f = Filter::compile(["*.txt"]).unwrap();
        assert_eq!(root.list_stats(&f), ListStats { dirs: 3, files: 2, bytes: 110 });
    }

    #[test]
    fn ext_table_keeps_first_encounter_order() {
        let root = sample();
        let mut table = ExtTable::default();
        root.add_ext_stats(&Filter::default(), &mut table);

        let rows = table.clone().into_rows();
        let exts: Vec<&str> = rows.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(exts, vec![".txt", ".jpg", ""]);
        assert_eq!(table.get(".txt"), Some(ExtStats { files: 2, bytes: 110 }));
        assert_eq!(table.total(), ExtStats { files: 4, bytes: 315 });
    }
}
