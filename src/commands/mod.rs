//! Command dispatch.
//!
//! A command line is resolved in two separate steps: the first word is
//! looked up in the session's alias table (user-editable at runtime), then
//! the result is looked up among the canonical command names. Handlers get
//! the session [`State`] and the remaining words.

mod listing;
mod result;
mod session;

pub use result::CommandResult;

use log::debug;

use crate::error::OverdiskError;
use crate::state::State;

/// Canonical commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Chdir,
    Dir,
    List,
    ExtCnt,
    Root,
    Scan,
    ScanErr,
    Go,
    Filter,
    Tail,
    DirOrder,
    ListOrder,
    ExtOrder,
    Unit,
    Alias,
    ColSep,
    Cols,
    Cls,
    Quit,
}

impl Command {
    pub const ALL: [Command; 20] = [
        Self::Help,
        Self::Chdir,
        Self::Dir,
        Self::List,
        Self::ExtCnt,
        Self::Root,
        Self::Scan,
        Self::ScanErr,
        Self::Go,
        Self::Filter,
        Self::Tail,
        Self::DirOrder,
        Self::ListOrder,
        Self::ExtOrder,
        Self::Unit,
        Self::Alias,
        Self::ColSep,
        Self::Cols,
        Self::Cls,
        Self::Quit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Chdir => "chdir",
            Self::Dir => "dir",
            Self::List => "list",
            Self::ExtCnt => "extcnt",
            Self::Root => "root",
            Self::Scan => "scan",
            Self::ScanErr => "scanerr",
            Self::Go => "go",
            Self::Filter => "filter",
            Self::Tail => "tail",
            Self::DirOrder => "dirorder",
            Self::ListOrder => "listorder",
            Self::ExtOrder => "extorder",
            Self::Unit => "unit",
            Self::Alias => "alias",
            Self::ColSep => "colsep",
            Self::Cols => "cols",
            Self::Cls => "cls",
            Self::Quit => "quit",
        }
    }

    /// Look up a canonical (lowercase) command name. `cd` is a second
    /// name of `chdir`, not an alias, so it cannot be removed.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cd" => Some(Self::Chdir),
            _ => Self::ALL.into_iter().find(|c| c.name() == name),
        }
    }

    /// Run the handler for this command.
    pub fn execute(self, state: &mut State, params: &[String]) -> Result<CommandResult, OverdiskError> {
        match self {
            Self::Help => session::help(params),
            Self::Chdir => session::chdir(state, params),
            Self::Dir => listing::dir(state, params),
            Self::List => listing::list(state, params),
            Self::ExtCnt => listing::extcnt(state, params),
            Self::Root => session::root(state, params),
            Self::Scan => session::scan(state, params),
            Self::ScanErr => session::scanerr(state, params),
            Self::Go => session::go(state, params),
            Self::Filter => session::filter(state, params),
            Self::Tail => session::tail(state, params),
            Self::DirOrder | Self::ListOrder | Self::ExtOrder => session::order(self, state, params),
            Self::Unit => session::unit(state, params),
            Self::Alias => session::alias(state, params),
            Self::ColSep => session::colsep(state, params),
            Self::Cols => session::cols(state, params),
            Self::Cls => session::cls(state, params),
            Self::Quit => Ok(CommandResult::quit()),
        }
    }
}

/// Map the first word of a command line to a command.
///
/// `\` and `..` are not names but navigation shorthands; they resolve to
/// `chdir` with themselves as the target.
pub fn resolve_command(state: &State, word: &str) -> Result<Command, OverdiskError> {
    let key = word.to_lowercase();
    let name = state.aliases.get(&key).map_or(key.as_str(), String::as_str);
    Command::from_name(name)
        .ok_or_else(|| OverdiskError::command(format!("unknown command \"{word}\"")))
}

/// Execute one tokenized command line.
pub fn dispatch(state: &mut State, words: &[String]) -> Result<CommandResult, OverdiskError> {
    let Some((first, rest)) = words.split_first() else {
        return Ok(CommandResult::empty());
    };

    if first == "\\" || first == ".." {
        return Command::Chdir.execute(state, words);
    }

    let command = resolve_command(state, first)?;
    debug!("dispatch {first:?} -> {} {rest:?}", command.name());
    command.execute(state, rest)
}

/// The single optional parameter of a command, or a usage error.
fn at_most_one(command: Command, params: &[String]) -> Result<Option<&str>, OverdiskError> {
    match params {
        [] => Ok(None),
        [p] => Ok(Some(p.as_str())),
        _ => Err(OverdiskError::command(format!(
            "{}: at most one parameter expected",
            command.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_round_trips_its_name() {
        for c in Command::ALL {
            assert_eq!(Command::from_name(c.name()), Some(c));
        }
        assert_eq!(Command::from_name("DIR"), None);
        assert_eq!(Command::from_name("cd"), Some(Command::Chdir));
    }

    #[test]
    fn at_most_one_rejects_extra_params() {
        let two = vec!["a".to_string(), "b".to_string()];
        let err = at_most_one(Command::Dir, &two).unwrap_err();
        assert_eq!(err.to_string(), "dir: at most one parameter expected");
        assert_eq!(at_most_one(Command::Dir, &two[..1]).unwrap(), Some("a"));
        assert_eq!(at_most_one(Command::Dir, &[]).unwrap(), None);
    }
}
