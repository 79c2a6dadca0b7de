//! Virtual filesystem.
//!
//! Key components:
//!
//! - [`Filesystem`] - Permission-checked storage contract for backends
//! - [`MountTable`] - Routes operations to backends based on path
//! - [`PrimitiveBackend`] - In-memory backend with per-user permissions
//! - [`resolve`] - Symlink and `..` resolution, inside one backend and
//!   across mounts
//!
//! ## Design Decisions
//!
//! - **Handles, not paths, inside backends**: the table resolves a global
//!   path to `(mount point, INode)` once and backends act on the handle.
//! - **Outcomes are values**: permission failures, missing parents and the
//!   like are result enums. [`VfsError`] is reserved for configuration and
//!   integrity faults.
//! - **Longest-prefix routing**: MountTable routes to the most specific
//!   mount point that matches, segment-wise.

pub mod backends;
mod error;
mod mount;
mod ops;
pub mod resolve;
mod types;

pub use backends::PrimitiveBackend;
pub use error::{VfsError, VfsResult};
pub use mount::{Located, MountInfo, MountTable, SharedMountTable, shared_mount_table};
pub use ops::Filesystem;
pub use resolve::{Lookup, MAX_SYMLINK_HOPS};
pub use types::{
    ChangePermissionsResult, CreateFileResult, DeleteFileResult, DirEntry, FileType, INode,
    ListDirectoryResult, ReadFileResult, Stat, WriteFileResult,
};
