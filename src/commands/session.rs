//! Navigation, rescanning and the session settings commands.

use std::path::Path;

use crate::error::OverdiskError;
use crate::filter::Filter;
use crate::order::{Listing, SortOrder};
use crate::results::{ScanErrorGroup, ScanStats};
use crate::state::State;
use crate::table::SizeUnit;

use super::{at_most_one, Command, CommandResult};

/// Narrowest accepted `cols` value.
pub const MIN_COLUMNS: usize = 20;

const HELP: &str = r#"
   ? | help               Show this help.
  cd | chdir [dir]        Set (or show) the current directory.
   \ | ..                 Go to the root / the parent directory.
   d | dir [dir]          Show directory contents.
   l | list [dir]         Show per-directory totals.
   e | extcnt [dir]       Show per-extension totals (files only).
   r | root [dir]         Set (or show) the root directory and scan it.
   s | scan [dir]         Rescan a directory.
  se | scanerr [op]       Show scan warnings. op: N (last N scans), -N (the
                          Nth scan from the end), all, count, clear.
   g | go [dir]           Open a directory in the file manager.
   f | filter [rule...]   Set (or show) the file filter. filter "" clears.
   t | tail [N]           Show only the last N (or first -N) rows. 0 = all.
  do | dirorder [flag]    Set (or show) the sort order of dir.
  lo | listorder [flag]   Set (or show) the sort order of list.
  eo | extorder [flag]    Set (or show) the sort order of extcnt.
   u | unit [unit]        Set (or show) the size unit: b k m g t p e *.
       alias [name[=[cmd]]]  Show, delete or set aliases.
       colsep [str]       Set (or show) the column separator.
       cols [n]           Set (or show) the terminal width.
       cls                Clear the screen.
   q | quit               Exit.

dir, list, extcnt, scan and go default to the current directory.
Paths may use / or \; a leading separator starts at the root.

Filter rules are wildcards (* ?) matched against file names. A rule
starting with / excludes. Later rules override earlier ones.

Order flags (lowercase ascending, uppercase descending):
  list         dir            extcnt
  -----------  -------------  -----------
  d dirs       m modify date  f files
  f files      s size         s size
  s size       a attributes   n name
  n name       n name         * unordered
  * unordered  * unordered

Dir display extra attribute flags (hex):
  01 temporary      10 offline
  02 sparse file    20 not content indexed
  04 reparse point  40 encrypted
  08 compressed"#;

pub(super) fn help(params: &[String]) -> Result<CommandResult, OverdiskError> {
    at_most_one(Command::Help, params)?;
    Ok(CommandResult::output(HELP.lines().skip(1).map(str::to_string).collect()))
}

// ---------------------------------------------------------------------------
// Navigation and scanning
// ---------------------------------------------------------------------------

pub(super) fn chdir(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    match at_most_one(Command::Chdir, params)? {
        None => Ok(CommandResult::line(state.current_path().display().to_string())),
        Some(path) => {
            let (components, _) = state.locate(Some(path))?;
            state.current = components;
            Ok(CommandResult::empty())
        }
    }
}

/// Summary line for a finished scan, counting the warnings of its group.
fn scan_summary(state: &State, stats: ScanStats) -> CommandResult {
    let warnings = state.scan_errors.last().map_or(0, |g| g.messages.len());
    CommandResult::line(stats.summary(warnings))
}

pub(super) fn root(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    match at_most_one(Command::Root, params)? {
        None => Ok(CommandResult::line(state.root_path.display().to_string())),
        Some(path) => {
            let stats = state.set_root(Path::new(path))?;
            Ok(scan_summary(state, stats))
        }
    }
}

pub(super) fn scan(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let target = at_most_one(Command::Scan, params)?;
    let (components, _) = state.locate(target)?;
    let stats = state.rescan(&components)?;
    Ok(scan_summary(state, stats))
}

fn show_groups<'a>(
    groups: impl Iterator<Item = (usize, &'a ScanErrorGroup)>,
) -> CommandResult {
    let mut lines = Vec::new();
    for (index, group) in groups {
        let k = group.messages.len();
        lines.push(format!(
            "#{} \"{}\": {k} warning{}",
            index + 1,
            group.start_path.display(),
            if k == 1 { "" } else { "s" }
        ));
        lines.extend(group.messages.iter().map(|m| format!("  {m}")));
    }
    CommandResult::output(lines)
}

pub(super) fn scanerr(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let op = at_most_one(Command::ScanErr, params)?.unwrap_or("1");
    let groups = &state.scan_errors;

    match op.to_lowercase().as_str() {
        "all" => Ok(show_groups(groups.iter().enumerate())),
        "count" => Ok(CommandResult::line(groups.len().to_string())),
        "clear" => {
            state.scan_errors.clear();
            Ok(CommandResult::empty())
        }
        _ => {
            let n: i64 = op
                .parse()
                .map_err(|_| OverdiskError::command(format!("invalid scanerr parameter \"{op}\"")))?;
            let back = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX);
            if n > 0 {
                let skip = groups.len().saturating_sub(back);
                Ok(show_groups(groups.iter().enumerate().skip(skip)))
            } else if n < 0 && back <= groups.len() {
                let index = groups.len() - back;
                Ok(show_groups(std::iter::once((index, &groups[index]))))
            } else if n < 0 {
                Err(OverdiskError::command(format!(
                    "no scan error group {n}; {} recorded",
                    groups.len()
                )))
            } else {
                Err(OverdiskError::command("scanerr: 0 is not a valid group count"))
            }
        }
    }
}

pub(super) fn go(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let target = at_most_one(Command::Go, params)?;
    let (components, _) = state.locate(target)?;
    let path = state.absolute_path(&components);
    state.terminal.open_in_file_manager(&path).map_err(|e| {
        OverdiskError::command(format!("could not open \"{}\": {e}", path.display()))
    })?;
    Ok(CommandResult::empty())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub(super) fn filter(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    if params.is_empty() {
        return Ok(CommandResult::line(state.filter.to_string()));
    }
    state.filter = Filter::compile(params)?;
    Ok(CommandResult::empty())
}

pub(super) fn tail(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    match at_most_one(Command::Tail, params)? {
        None => Ok(CommandResult::line(state.tail_count.to_string())),
        Some(n) => {
            state.tail_count = n
                .parse()
                .map_err(|_| OverdiskError::command(format!("invalid tail count \"{n}\"")))?;
            Ok(CommandResult::empty())
        }
    }
}

/// `dirorder`, `listorder` and `extorder`.
pub(super) fn order(
    command: Command,
    state: &mut State,
    params: &[String],
) -> Result<CommandResult, OverdiskError> {
    let (listing, slot) = match command {
        Command::DirOrder => (Listing::Dir, &mut state.dir_order),
        Command::ListOrder => (Listing::List, &mut state.list_order),
        _ => (Listing::Ext, &mut state.ext_order),
    };
    match at_most_one(command, params)? {
        None => Ok(CommandResult::line(slot.to_string())),
        Some(flag) => {
            *slot = SortOrder::parse(listing, flag)?;
            Ok(CommandResult::empty())
        }
    }
}

pub(super) fn unit(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    match at_most_one(Command::Unit, params)? {
        None => Ok(CommandResult::line(state.unit.to_string())),
        Some(u) => {
            state.unit = SizeUnit::parse(u)?;
            Ok(CommandResult::empty())
        }
    }
}

pub(super) fn alias(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let show = |state: &State, prefix: &str| {
        CommandResult::output(
            state
                .aliases
                .iter()
                .filter(|(name, _)| name.starts_with(prefix))
                .map(|(name, cmd)| format!("{name}={cmd}"))
                .collect(),
        )
    };

    let Some(arg) = at_most_one(Command::Alias, params)? else {
        return Ok(show(&*state, ""));
    };
    let Some((name, value)) = arg.split_once('=') else {
        return Ok(show(&*state, &arg.to_lowercase()));
    };

    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(OverdiskError::command("alias: missing name"));
    }
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return match state.aliases.remove(&name) {
            Some(_) => Ok(CommandResult::empty()),
            None => Err(OverdiskError::command(format!("no alias \"{name}\""))),
        };
    }
    if Command::from_name(&value).is_none() {
        return Err(OverdiskError::command(format!("alias: unknown command \"{value}\"")));
    }
    state.aliases.insert(name, value);
    Ok(CommandResult::empty())
}

pub(super) fn colsep(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    match at_most_one(Command::ColSep, params)? {
        None => Ok(CommandResult::line(format!("\"{}\"", state.column_separator))),
        Some(sep) => {
            state.column_separator = sep.to_string();
            Ok(CommandResult::empty())
        }
    }
}

pub(super) fn cols(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    let Some(arg) = at_most_one(Command::Cols, params)? else {
        return Ok(CommandResult::line(state.columns.to_string()));
    };
    let n: usize = arg
        .parse()
        .ok()
        .filter(|&n| n >= MIN_COLUMNS)
        .ok_or_else(|| {
            OverdiskError::command(format!(
                "invalid column count \"{arg}\"; at least {MIN_COLUMNS} expected"
            ))
        })?;
    state
        .terminal
        .set_width(n)
        .map_err(|e| OverdiskError::command(format!("could not resize terminal: {e}")))?;
    state.columns = n;
    Ok(CommandResult::empty())
}

pub(super) fn cls(state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
    if !params.is_empty() {
        return Err(OverdiskError::command("cls: no parameters expected"));
    }
    state
        .terminal
        .clear_screen()
        .map_err(|e| OverdiskError::command(format!("could not clear screen: {e}")))?;
    Ok(CommandResult::empty())
}
