//! `dir`, `list` and `extcnt`: the three tabular views of a directory.

use std::cmp::Ordering;

use crate::entry::EntryRecord;
use crate::error::OverdiskError;
use crate::order::cmp_names;
use crate::state::State;
use crate::stats::{ExtStats, ExtTable, ListStats};
use crate::table::{format_attributes, format_date, Align, Table};
use crate::tail::tail_filter;
use crate::tree::Dir;

use super::{at_most_one, Command, CommandResult};

const DIR_MARKER: &str = "<DIR>";
const FILES_ROW: &str = "<files>";
const TOTAL_ROW: &str = "<total>";
const NO_EXTENSION: &str = "<none>";

fn render(state: &State, table: Table) -> CommandResult {
    CommandResult::output(table.render(&state.column_separator, state.columns))
}

// ---------------------------------------------------------------------------
// dir
// ---------------------------------------------------------------------------

fn cmp_entries(field: char, a: &EntryRecord, b: &EntryRecord) -> Ordering {
    let primary = match field {
        'm' => a.modified.cmp(&b.modified),
        's' => a.size.cmp(&b.size),
        'a' => a.attributes.bits().cmp(&b.attributes.bits()),
        _ => Ordering::Equal,
    };
    primary.then_with(|| cmp_names(&a.name, &b.name))
}

/// Immediate children: directories first, then the files the filter accepts.
pub(super) fn dir(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let target = at_most_one(Command::Dir, params)?;
    let (_, dir) = state.locate(target)?;

    let mut dirs: Vec<&EntryRecord> = dir.subdirs().map(|d| &d.info).collect();
    let mut files: Vec<&EntryRecord> = dir
        .files()
        .map(|f| &f.info)
        .filter(|info| state.filter.accepts(&info.name))
        .collect();
    state.dir_order.sort_by(&mut dirs, |k, a, b| cmp_entries(k, a, b));
    state.dir_order.sort_by(&mut files, |k, a, b| cmp_entries(k, a, b));

    let mut table = Table::new(vec![Align::Right, Align::Right, Align::Right, Align::Left]);
    let rows = dirs.into_iter().chain(files).map(|info| {
        let size = if info.is_dir() {
            DIR_MARKER.to_string()
        } else {
            state.unit.format(info.size)
        };
        vec![
            format_date(info.modified),
            size,
            format_attributes(info.attributes),
            info.name.clone(),
        ]
    });
    for row in tail_filter(rows, state.tail_count) {
        table.push(row);
    }
    Ok(render(state, table))
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

struct ListRow {
    name: String,
    stats: ListStats,
    loose_files: bool,
}

impl ListRow {
    fn cells(&self, state: &State) -> Vec<String> {
        let dirs = if self.loose_files { "-".to_string() } else { self.stats.dirs.to_string() };
        vec![
            dirs,
            self.stats.files.to_string(),
            state.unit.format(self.stats.bytes),
            self.name.clone(),
        ]
    }
}

fn cmp_list_rows(field: char, a: &ListRow, b: &ListRow) -> Ordering {
    let primary = match field {
        'd' => a.stats.dirs.cmp(&b.stats.dirs),
        'f' => a.stats.files.cmp(&b.stats.files),
        's' => a.stats.bytes.cmp(&b.stats.bytes),
        _ => Ordering::Equal,
    };
    primary.then_with(|| cmp_names(&a.name, &b.name))
}

/// Recursive totals of `dir`'s children, as rows plus the `<total>` stats.
fn list_rows(dir: &Dir, state: &State) -> (Vec<ListRow>, ListRow, ListStats) {
    let mut total = ListStats::default();
    let rows: Vec<ListRow> = dir
        .subdirs()
        .map(|d| {
            let stats = d.list_stats(&state.filter);
            total.add(stats);
            total.dirs += 1;
            ListRow { name: d.name().to_string(), stats, loose_files: false }
        })
        .collect();

    let mut loose = ListStats::default();
    for file in dir.files().filter(|f| state.filter.accepts(&f.info.name)) {
        loose.files += 1;
        loose.bytes += file.info.size;
    }
    total.add(loose);

    let files_row = ListRow { name: FILES_ROW.to_string(), stats: loose, loose_files: true };
    (rows, files_row, total)
}

/// Child directories with their recursive totals, a `<files>` row for the
/// files directly inside, and a `<total>` row.
///
/// When sorting by a numeric column the `<files>` row is ranked like any
/// other row; otherwise it is pinned below the directories.
pub(super) fn list(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let target = at_most_one(Command::List, params)?;
    let (_, dir) = state.locate(target)?;
    let (mut rows, files_row, total) = list_rows(dir, state);

    let ranked = matches!(state.list_order.key(), Some('d' | 'f' | 's'));
    let pinned = if ranked {
        rows.push(files_row);
        None
    } else {
        Some(files_row)
    };
    state.list_order.sort_by(&mut rows, cmp_list_rows);

    let mut table = Table::new(vec![Align::Right, Align::Right, Align::Right, Align::Left]);
    for row in tail_filter(rows, state.tail_count).chain(pinned) {
        table.push(row.cells(state));
    }
    let total = ListRow { name: TOTAL_ROW.to_string(), stats: total, loose_files: false };
    table.push(total.cells(state));
    Ok(render(state, table))
}

// ---------------------------------------------------------------------------
// extcnt
// ---------------------------------------------------------------------------

fn cmp_ext_rows(field: char, a: &(String, ExtStats), b: &(String, ExtStats)) -> Ordering {
    let primary = match field {
        'f' => a.1.files.cmp(&b.1.files),
        's' => a.1.bytes.cmp(&b.1.bytes),
        _ => Ordering::Equal,
    };
    primary.then_with(|| a.0.cmp(&b.0))
}

/// File counts and sizes per extension, over the whole subtree.
pub(super) fn extcnt(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let target = at_most_one(Command::ExtCnt, params)?;
    let (_, dir) = state.locate(target)?;

    let mut exts = ExtTable::default();
    dir.add_ext_stats(&state.filter, &mut exts);
    let total = exts.total();
    let mut rows = exts.into_rows();
    state.ext_order.sort_by(&mut rows, cmp_ext_rows);

    let mut table = Table::new(vec![Align::Right, Align::Right, Align::Left]);
    for (ext, stats) in tail_filter(rows, state.tail_count) {
        let name = if ext.is_empty() { NO_EXTENSION.to_string() } else { ext };
        table.push(vec![stats.files.to_string(), state.unit.format(stats.bytes), name]);
    }
    table.push(vec![
        total.files.to_string(),
        state.unit.format(total.bytes),
        TOTAL_ROW.to_string(),
    ]);
    Ok(render(state, table))
}
