use std::fs::Metadata;
use std::time::SystemTime;

use bitflags::bitflags;

bitflags! {
    /// File attribute bits.
    ///
    /// Values follow the Windows `FILE_ATTRIBUTE_*` layout so the attribute
    /// column reads the same on every platform. Outside Windows the bits are
    /// derived from the file type and permissions, see [`Attributes::from_metadata`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u32 {
        const READONLY      = 0x0001;
        const HIDDEN        = 0x0002;
        const SYSTEM        = 0x0004;
        const DIRECTORY     = 0x0010;
        const ARCHIVE       = 0x0020;
        const TEMPORARY     = 0x0100;
        const SPARSE        = 0x0200;
        const REPARSE_POINT = 0x0400;
        const COMPRESSED    = 0x0800;
        const OFFLINE       = 0x1000;
        const NOT_INDEXED   = 0x2000;
        const ENCRYPTED     = 0x4000;
    }
}

impl Attributes {
    /// Build attributes from `symlink_metadata` of an entry named `name`.
    ///
    /// `target_is_dir` reports whether a symlink resolves to a directory;
    /// such links become reparse-point directories.
    #[cfg(windows)]
    pub fn from_metadata(_name: &str, meta: &Metadata, target_is_dir: bool) -> Self {
        use std::os::windows::fs::MetadataExt;

        let mut attrs = Self::from_bits_truncate(meta.file_attributes());
        if target_is_dir {
            attrs |= Self::DIRECTORY;
        }
        attrs
    }

    #[cfg(not(windows))]
    pub fn from_metadata(name: &str, meta: &Metadata, target_is_dir: bool) -> Self {
        let ft = meta.file_type();
        let mut attrs = Self::empty();

        if ft.is_dir() || (ft.is_symlink() && target_is_dir) {
            attrs |= Self::DIRECTORY;
        }
        if ft.is_symlink() {
            attrs |= Self::REPARSE_POINT;
        } else if !ft.is_dir() && !ft.is_file() {
            attrs |= Self::SYSTEM;
        }
        if meta.permissions().readonly() {
            attrs |= Self::READONLY;
        }
        if name.starts_with('.') {
            attrs |= Self::HIDDEN;
        }
        attrs
    }
}

/// One record of a single-level directory listing.
///
/// This is all the scanner knows about an entry; the tree's `File` and `Dir`
/// nodes wrap it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Last path component.
    pub name: String,

    /// Size in bytes. Always 0 for directories.
    pub size: u64,

    pub attributes: Attributes,

    pub modified: Option<SystemTime>,

    /// Not every filesystem reports a creation time.
    pub created: Option<SystemTime>,
}

impl EntryRecord {
    /// A plain file record with no timestamps.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            attributes: Attributes::empty(),
            modified: None,
            created: None,
        }
    }

    /// A plain directory record with no timestamps.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            attributes: Attributes::DIRECTORY,
            modified: None,
            created: None,
        }
    }

    pub fn with_attributes(mut self, extra: Attributes) -> Self {
        self.attributes |= extra;
        self
    }

    pub fn is_dir(&self) -> bool {
        self.attributes.contains(Attributes::DIRECTORY)
    }

    pub fn is_reparse_point(&self) -> bool {
        self.attributes.contains(Attributes::REPARSE_POINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reparse_dir_is_still_a_dir() {
        let rec = EntryRecord::dir("link").with_attributes(Attributes::REPARSE_POINT);
        assert!(rec.is_dir());
        assert!(rec.is_reparse_point());
        assert_eq!(rec.size, 0);
    }

    #[cfg(unix)]
    #[test]
    fn derived_attributes_for_hidden_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".profile");
        std::fs::write(&path, "x").unwrap();
        let meta = std::fs::symlink_metadata(&path).unwrap();

        let attrs = Attributes::from_metadata(".profile", &meta, false);
        assert!(attrs.contains(Attributes::HIDDEN));
        assert!(!attrs.contains(Attributes::DIRECTORY));
        assert!(!attrs.contains(Attributes::REPARSE_POINT));
    }
}
