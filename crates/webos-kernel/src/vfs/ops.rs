//! Filesystem backend trait.
//!
//! A backend stores files, directories and symlinks in its own local
//! namespace rooted at `/`. Every operation addresses an object through an
//! [`INode`] and, when it reads or mutates, the acting [`User`]. Outcomes are
//! returned as enums; a backend never panics or errors on a user-triggered
//! condition.
//!
//! Handle derivation (`get_inode`, `resolve`, `lookup`) has default
//! implementations in [`super::resolve`] built on `file_type` and
//! `read_link`, so a backend only has to implement storage.

use std::collections::HashMap;

use webos_types::{Absolute, BackendId, Path, Permission, User};

use super::resolve::{self, Lookup};
use super::types::{
    ChangePermissionsResult, CreateFileResult, DeleteFileResult, FileType, INode,
    ListDirectoryResult, ReadFileResult, Stat, WriteFileResult,
};
use super::VfsResult;

/// Permission-checked storage contract.
///
/// The model is synchronous and single-threaded: mutations take `&mut self`
/// and run to completion. Preconditions are checked before anything
/// changes, so a rejected operation leaves the store untouched.
pub trait Filesystem: Send + Sync {
    // ========================================================================
    // Identity
    // ========================================================================

    /// Short name of the backend kind, e.g. `"primitive"`.
    fn kind(&self) -> &'static str;

    /// Identifier of this backend instance.
    fn id(&self) -> BackendId;

    // ========================================================================
    // Handles
    // ========================================================================

    /// Handle of the backend root.
    fn root(&self) -> INode {
        INode::root()
    }

    /// Derive the handle for a local path by resolving each segment from
    /// the root. Symlinks met along the way are followed inside this
    /// backend; the final component is not followed.
    fn get_inode(&self, path: &Absolute) -> VfsResult<INode> {
        resolve::resolve_path(self, &self.root(), path.segments())
    }

    /// Resolve one path segment relative to `inode`.
    fn resolve(&self, inode: &INode, segment: &str) -> VfsResult<INode> {
        resolve::resolve_segment(self, inode, segment)
    }

    /// Mount-aware resolution used by the mount table.
    ///
    /// Returns [`Lookup::ResolveAgain`] whenever resolution has to leave
    /// plain descent inside this backend (`..` or a symlink), so the table
    /// can re-route the rest of the path.
    fn lookup(&self, path: &Absolute) -> Lookup {
        resolve::lookup(self, path)
    }

    /// Local path addressed by a handle.
    fn get_path(&self, inode: &INode) -> Absolute {
        inode.path().clone()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Type of the object at the handle, `None` if nothing exists there.
    fn file_type(&self, inode: &INode) -> Option<FileType>;

    /// Target of the symlink at the handle, `None` for anything else.
    fn read_link(&self, inode: &INode) -> Option<Path>;

    /// Metadata of the object at the handle.
    fn stat(&self, inode: &INode) -> Option<Stat>;

    /// Check if an object exists.
    fn exists(&self, inode: &INode) -> bool {
        self.file_type(inode).is_some()
    }

    fn is_file(&self, inode: &INode) -> bool {
        self.file_type(inode).is_some_and(|t| t.is_file())
    }

    fn is_directory(&self, inode: &INode) -> bool {
        self.file_type(inode).is_some_and(|t| t.is_dir())
    }

    fn is_symlink(&self, inode: &INode) -> bool {
        self.file_type(inode).is_some_and(|t| t.is_symlink())
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create an empty file.
    fn create_file(&mut self, inode: &INode, user: &User) -> CreateFileResult;

    /// Create an empty directory.
    fn create_directory(&mut self, inode: &INode, user: &User) -> CreateFileResult;

    /// Create a symlink pointing at `target`.
    fn create_symlink(&mut self, inode: &INode, user: &User, target: Path) -> CreateFileResult;

    // ========================================================================
    // Content
    // ========================================================================

    /// Replace the whole content of a file.
    fn write_to_file(&mut self, inode: &INode, user: &User, data: &[u8]) -> WriteFileResult;

    /// Read the whole content of a file.
    fn read_from_file(&self, inode: &INode, user: &User) -> ReadFileResult;

    /// List the entries of a directory.
    fn list_directory(&self, inode: &INode, user: &User) -> ListDirectoryResult;

    // ========================================================================
    // Removal & permissions
    // ========================================================================

    /// Delete an object; directories take all descendants with them.
    fn delete_file(&mut self, inode: &INode, user: &User) -> DeleteFileResult;

    /// Merge permission entries (keyed by user name) into an object.
    fn change_permissions(
        &mut self,
        inode: &INode,
        user: &User,
        updates: &HashMap<String, Permission>,
    ) -> ChangePermissionsResult;
}
