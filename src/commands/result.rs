//! Command execution result type.

/// Result of executing a command.
///
/// Commands produce output lines and may ask the shell loop to stop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Output lines to display
    pub output: Vec<String>,
    /// Set by `quit`
    pub quit: bool,
}

impl CommandResult {
    pub fn output(lines: Vec<String>) -> Self {
        Self { output: lines, quit: false }
    }

    pub fn line(line: impl Into<String>) -> Self {
        Self::output(vec![line.into()])
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit() -> Self {
        Self { output: vec![], quit: true }
    }
}
