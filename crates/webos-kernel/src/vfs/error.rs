//! VFS error types.
//!
//! These are configuration and integrity faults: a misconfigured mount table
//! or a path that cannot be resolved at all. Ordinary outcomes such as a
//! missing permission or an existing file are result variants (see
//! [`super::types`]), never errors.

use thiserror::Error;

/// VFS error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// No mount point covers the path.
    #[error("no mount point for path: {0}")]
    NoMountPoint(String),

    /// A backend is already mounted at this point.
    #[error("already mounted: {0}")]
    AlreadyMounted(String),

    /// Mount points must be normalized absolute paths.
    #[error("invalid mount point: {0}")]
    InvalidMountPoint(String),

    /// The root mount can never be removed.
    #[error("a root mount is required")]
    RootMountRequired,

    /// Too many symbolic links while resolving a path.
    #[error("too many symbolic links: {0}")]
    SymlinkLoop(String),
}

impl VfsError {
    /// Create a NoMountPoint error.
    pub fn no_mount_point(path: impl ToString) -> Self {
        Self::NoMountPoint(path.to_string())
    }

    /// Create an AlreadyMounted error.
    pub fn already_mounted(path: impl ToString) -> Self {
        Self::AlreadyMounted(path.to_string())
    }

    /// Create an InvalidMountPoint error.
    pub fn invalid_mount_point(path: impl ToString) -> Self {
        Self::InvalidMountPoint(path.to_string())
    }

    /// Create a SymlinkLoop error.
    pub fn symlink_loop(path: impl ToString) -> Self {
        Self::SymlinkLoop(path.to_string())
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use webos_types::Absolute;

    #[test]
    fn test_messages_carry_path() {
        let err = VfsError::no_mount_point(Absolute::parse("/nothing/here").unwrap());
        assert_eq!(err.to_string(), "no mount point for path: /nothing/here");

        let err = VfsError::already_mounted("/mnt");
        assert_eq!(err.to_string(), "already mounted: /mnt");
    }
}
