use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverdiskError {
    // Session
    #[error("{0}")]
    Command(String),

    #[error("no such directory: \"{path}\"")]
    PathNotFound { path: String },

    #[error("not a dir: \"{}\"", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid filter pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("interrupted")]
    Interrupted,

    // Traversal
    #[error("permission denied: \"{}\"", .0.display())]
    PermissionDenied(PathBuf),

    #[error("symlink loop: \"{}\"", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("link not followed: \"{}\" (start with --scan-links)", .0.display())]
    LinkNotFollowed(PathBuf),

    #[error("could not read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OverdiskError {
    /// Shorthand for a user-facing command error.
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// The filesystem path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::LinkNotFollowed(p)
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether a scan can continue after this error.
    ///
    /// Recoverable errors are recorded as scan warnings and the walk moves on
    /// to the next sibling. Everything else stops the current command.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::SymlinkLoop(_)
                | Self::LinkNotFollowed(_)
                | Self::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_errors_are_recoverable() {
        let denied = OverdiskError::PermissionDenied("/x".into());
        assert!(denied.is_recoverable());
        assert_eq!(denied.path(), Some(&PathBuf::from("/x")));

        let cmd = OverdiskError::command("bad");
        assert!(!cmd.is_recoverable());
        assert!(cmd.path().is_none());
        assert_eq!(cmd.to_string(), "bad");
    }

    #[test]
    fn interruption_is_not_recoverable() {
        assert!(!OverdiskError::Interrupted.is_recoverable());
        let link = OverdiskError::LinkNotFollowed("/data/link".into());
        assert!(link.is_recoverable());
        assert!(link.to_string().starts_with("link not followed: \"/data/link\""));
    }

    #[test]
    fn path_not_found_names_the_path() {
        let err = OverdiskError::PathNotFound { path: "a/b".into() };
        assert_eq!(err.to_string(), "no such directory: \"a/b\"");
    }
}
