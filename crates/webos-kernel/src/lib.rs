//! # webos-kernel
//!
//! Virtual filesystem core of the WebOS simulated operating system.
//!
//! The kernel owns `/`. Further backends are mounted below it at paths like
//! `/mnt/data`, and every operation is routed to the backend owning the
//! longest matching mount point. Backends enforce per-user permissions and
//! report ordinary failures as outcome enums; [`VfsError`] is reserved for
//! faults in the mount table itself.
//!
//! ```text
//! cwd + Path ──► MountTable::find_inode ──► (mount point, INode)
//!                      ▲        │
//!                      │        ▼
//!               ResolveAgain ◄── Filesystem::lookup
//! ```

pub mod config;
pub mod vfs;

pub use config::{ConfigError, MountConfig, UserConfig, VfsConfig};
pub use vfs::{
    ChangePermissionsResult, CreateFileResult, DeleteFileResult, DirEntry, FileType, Filesystem,
    INode, ListDirectoryResult, Located, MountInfo, MountTable, PrimitiveBackend, ReadFileResult,
    SharedMountTable, Stat, VfsError, VfsResult, WriteFileResult, shared_mount_table,
};
