//! Core VFS types.
//!
//! Handles, metadata, and the outcome enums every filesystem operation
//! returns. Outcomes are exhaustive: callers match on them instead of
//! catching errors, and none of them aborts the surrounding session.

use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use webos_types::{Absolute, Permission};

/// File type enumeration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }
}

/// Opaque, backend-local handle addressing one stored object.
///
/// Handles are derived from paths, so a handle may address a location where
/// nothing exists yet; that is how create operations name their target.
/// A handle only means something to the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct INode(Absolute);

impl INode {
    /// Wrap a backend-local path. Backends call this; callers get handles
    /// from `get_inode` / `MountTable::find_inode`.
    pub fn new(local: Absolute) -> Self {
        Self(local)
    }

    /// Handle of the backend root.
    pub fn root() -> Self {
        Self(Absolute::root())
    }

    /// The backend-local path this handle addresses.
    pub fn path(&self) -> &Absolute {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_root()
    }

    /// Handle of the containing directory. The root is its own parent.
    pub fn parent(&self) -> INode {
        Self(self.0.parent())
    }

    /// Handle of a direct child.
    pub fn child(&self, name: &str) -> INode {
        Self(self.0.join(name))
    }
}

impl std::fmt::Display for INode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Metadata of one stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    /// Object type.
    pub kind: FileType,
    /// Size in bytes (files only; 0 otherwise).
    pub size: u64,
    /// Name of the creating user.
    pub owner: String,
    /// Permission entries, keyed by user name.
    pub permissions: BTreeMap<String, Permission>,
    /// Creation time.
    pub created: SystemTime,
    /// Last content or permission change.
    pub modified: SystemTime,
}

impl Stat {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }
}

// ============================================================================
// Operation outcomes
// ============================================================================

/// Outcome of creating a file, directory or symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateFileResult {
    Created,
    /// The acting user may not write the parent directory.
    NoPermission,
    /// The parent does not exist or is not a directory.
    NoParent,
    AlreadyExists,
}

/// Outcome of replacing a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFileResult {
    Written,
    NoPermission,
    NotAFile,
    /// The backend's capacity cannot hold the new contents.
    NotEnoughSpace { data_size: u64, space_left: u64 },
}

/// Outcome of reading a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFileResult {
    /// The complete contents (compared by value).
    Read(Vec<u8>),
    NoPermission,
    NotAFile,
}

/// Outcome of deleting an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteFileResult {
    Deleted,
    NoPermission,
    /// Nothing exists at the handle.
    NotAFile,
}

/// Outcome of merging permission entries into an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangePermissionsResult {
    Changed,
    NoPermission,
    NotFound,
}

/// Outcome of listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListDirectoryResult {
    /// Entries sorted by name.
    Listed(Vec<DirEntry>),
    NoPermission,
    NotADirectory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_file_type() {
        assert!(FileType::File.is_file());
        assert!(!FileType::File.is_dir());
        assert!(FileType::Directory.is_dir());
        assert!(FileType::Symlink.is_symlink());
    }

    #[test]
    fn test_file_type_strings() {
        assert_eq!(FileType::Symlink.to_string(), "symlink");
        assert_eq!(FileType::from_str("directory").unwrap(), FileType::Directory);
        assert!(FileType::from_str("socket").is_err());
    }

    #[test]
    fn test_inode_navigation() {
        let inode = INode::new(Absolute::parse("/a/b").unwrap());
        assert_eq!(inode.parent().path(), &Absolute::parse("/a").unwrap());
        assert_eq!(inode.child("c").to_string(), "/a/b/c");
        assert!(INode::root().is_root());
        assert_eq!(INode::root().parent(), INode::root());
    }

    #[test]
    fn test_dir_entry() {
        let file = DirEntry::file("test.txt");
        assert_eq!(file.name, "test.txt");
        assert!(file.kind.is_file());

        let dir = DirEntry::directory("subdir");
        assert!(dir.kind.is_dir());
    }

    #[test]
    fn test_read_result_compares_content() {
        assert_eq!(ReadFileResult::Read(b"a".to_vec()), ReadFileResult::Read(vec![b'a']));
        assert_ne!(ReadFileResult::Read(b"a".to_vec()), ReadFileResult::Read(Vec::new()));
    }
}
