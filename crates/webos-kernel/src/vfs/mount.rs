//! VFS mount table with longest-prefix routing.
//!
//! Routes filesystem operations to the appropriate backend based on path,
//! and re-resolves paths whose resolution leaves a backend (`..` past its
//! root, symlinks) so that links can cross mount boundaries.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};
use webos_types::{Absolute, BackendId, Path, Permission, Relative, User};

use super::error::{VfsError, VfsResult};
use super::ops::Filesystem;
use super::resolve::{self, Lookup, MAX_SYMLINK_HOPS};
use super::types::{
    ChangePermissionsResult, CreateFileResult, DeleteFileResult, DirEntry, INode,
    ListDirectoryResult, ReadFileResult, Stat, WriteFileResult,
};

/// Information about a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// The mount path (e.g., "/mnt/data").
    pub path: Absolute,
    /// Backend kind, e.g. `"primitive"`.
    pub kind: &'static str,
    /// Backend instance.
    pub id: BackendId,
}

/// A fully resolved location: the owning mount and the backend handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub mount_point: Absolute,
    pub inode: INode,
}

/// Routes filesystem operations to mounted backends.
///
/// Mount points are matched by longest segment prefix. If `/mnt` and
/// `/mnt/data` are both mounted, `/mnt/data/src/main.rs` is routed to the
/// `/mnt/data` mount as local path `/src/main.rs`.
///
/// A root mount always exists: it is supplied at construction and cannot be
/// unmounted.
pub struct MountTable {
    /// Mount points, keyed by normalized path.
    mounts: BTreeMap<Absolute, Box<dyn Filesystem>>,
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountTable")
            .field("mounts", &self.mounts.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Shared mount table for embeddings that drive several sessions.
pub type SharedMountTable = Arc<Mutex<MountTable>>;

/// Wrap a mount table for sharing.
pub fn shared_mount_table(table: MountTable) -> SharedMountTable {
    Arc::new(Mutex::new(table))
}

impl MountTable {
    /// Create a table with `root` mounted at `/`.
    pub fn new(root: impl Filesystem + 'static) -> Self {
        Self::with_root(Box::new(root))
    }

    /// Create a table with an already boxed root backend.
    pub fn with_root(root: Box<dyn Filesystem>) -> Self {
        debug!(backend = %root.id(), kind = root.kind(), "mounted root");
        Self {
            mounts: BTreeMap::from([(Absolute::root(), root)]),
        }
    }

    /// Mount a filesystem at the given path.
    pub fn mount(&mut self, mount_point: Absolute, fs: impl Filesystem + 'static) -> VfsResult<()> {
        self.mount_boxed(mount_point, Box::new(fs))
    }

    /// Mount an already boxed filesystem at the given path.
    ///
    /// Fails without touching the table if the point is taken or contains
    /// `.` / `..` segments.
    pub fn mount_boxed(&mut self, mount_point: Absolute, fs: Box<dyn Filesystem>) -> VfsResult<()> {
        if !mount_point.is_normalized() {
            error!(%mount_point, "mount point is not normalized");
            return Err(VfsError::invalid_mount_point(&mount_point));
        }
        if self.mounts.contains_key(&mount_point) {
            error!(%mount_point, "mount point already in use");
            return Err(VfsError::already_mounted(&mount_point));
        }
        debug!(%mount_point, backend = %fs.id(), kind = fs.kind(), "mounted");
        self.mounts.insert(mount_point, fs);
        Ok(())
    }

    /// Unmount the filesystem at the given path.
    ///
    /// Returns `true` if a mount was removed, `false` if nothing was mounted
    /// there. The root mount cannot be removed.
    pub fn unmount(&mut self, mount_point: &Absolute) -> VfsResult<bool> {
        if mount_point.is_root() {
            warn!("refusing to unmount root");
            return Err(VfsError::RootMountRequired);
        }
        let removed = self.mounts.remove(mount_point).is_some();
        if removed {
            debug!(%mount_point, "unmounted");
        }
        Ok(removed)
    }

    /// List all current mounts, ordered by mount point.
    pub fn list_mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .iter()
            .map(|(path, fs)| MountInfo {
                path: path.clone(),
                kind: fs.kind(),
                id: fs.id(),
            })
            .collect()
    }

    /// The backend mounted exactly at `mount_point`.
    pub fn backend(&self, mount_point: &Absolute) -> VfsResult<&dyn Filesystem> {
        self.mounts
            .get(mount_point)
            .map(|fs| fs.as_ref())
            .ok_or_else(|| VfsError::no_mount_point(mount_point))
    }

    fn backend_mut(&mut self, mount_point: &Absolute) -> VfsResult<&mut dyn Filesystem> {
        match self.mounts.get_mut(mount_point) {
            Some(fs) => Ok(fs.as_mut()),
            None => Err(VfsError::no_mount_point(mount_point)),
        }
    }

    /// Find the mount owning `path`.
    ///
    /// Returns the mount point and the path local to that mount.
    pub fn route(&self, path: &Absolute) -> VfsResult<(Absolute, Absolute)> {
        let (mount_point, _, local) = self.find_mount(path)?;
        Ok((mount_point.clone(), local))
    }

    fn find_mount(&self, path: &Absolute) -> VfsResult<(&Absolute, &dyn Filesystem, Absolute)> {
        let best = self
            .mounts
            .iter()
            .filter(|(mount_point, _)| path.starts_with(mount_point))
            .max_by_key(|(mount_point, _)| mount_point.depth());

        match best {
            Some((mount_point, fs)) => {
                let local = path
                    .strip_prefix(mount_point)
                    .ok_or_else(|| VfsError::no_mount_point(path))?;
                trace!(%path, %mount_point, %local, "routed");
                Ok((mount_point, fs.as_ref(), local))
            }
            None => {
                error!(%path, "no mount point covers path");
                Err(VfsError::no_mount_point(path))
            }
        }
    }

    /// Resolve a global path to its owning mount and backend handle.
    ///
    /// Whenever a backend hands resolution back, the new path is routed from
    /// scratch. Symlink redirects count against [`MAX_SYMLINK_HOPS`].
    pub fn find_inode(&self, path: &Absolute) -> VfsResult<Located> {
        let mut current = without_current_dir(path);
        let mut hops = 0;
        loop {
            let (mount_point, fs, local) = self.find_mount(&current)?;
            match fs.lookup(&local) {
                Lookup::Found(inode) => {
                    return Ok(Located {
                        mount_point: mount_point.clone(),
                        inode,
                    });
                }
                Lookup::ResolveAgain { path: next, via_symlink } => {
                    if via_symlink {
                        hops += 1;
                        if hops > MAX_SYMLINK_HOPS {
                            error!(%path, "symlink hop limit reached");
                            return Err(VfsError::symlink_loop(path));
                        }
                    }
                    let next = match next {
                        Path::Absolute(p) => p,
                        Path::Relative(r) => resolve::rebase(mount_point, &r),
                    };
                    trace!(from = %current, to = %next, via_symlink, "resolving again");
                    current = without_current_dir(&next);
                }
            }
        }
    }

    fn locate(&self, cwd: &Absolute, path: &Path) -> VfsResult<Located> {
        self.find_inode(&path.to_absolute(cwd))
    }

    // ========================================================================
    // Pass-through operations
    // ========================================================================

    #[tracing::instrument(skip(self, cwd, user), fields(user = %user.name), name = "vfs.read")]
    pub fn read(&self, cwd: &Absolute, path: &Path, user: &User) -> VfsResult<ReadFileResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend(&located.mount_point)?
            .read_from_file(&located.inode, user))
    }

    #[tracing::instrument(skip(self, cwd, user, data), fields(user = %user.name, bytes = data.len()), name = "vfs.write")]
    pub fn write(
        &mut self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
        data: &[u8],
    ) -> VfsResult<WriteFileResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend_mut(&located.mount_point)?
            .write_to_file(&located.inode, user, data))
    }

    #[tracing::instrument(skip(self, cwd), name = "vfs.stat")]
    pub fn stat(&self, cwd: &Absolute, path: &Path) -> VfsResult<Option<Stat>> {
        let located = self.locate(cwd, path)?;
        Ok(self.backend(&located.mount_point)?.stat(&located.inode))
    }

    #[tracing::instrument(skip(self, cwd, user), fields(user = %user.name), name = "vfs.create_file")]
    pub fn create_file(
        &mut self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
    ) -> VfsResult<CreateFileResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend_mut(&located.mount_point)?
            .create_file(&located.inode, user))
    }

    #[tracing::instrument(skip(self, cwd, user), fields(user = %user.name), name = "vfs.create_directory")]
    pub fn create_directory(
        &mut self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
    ) -> VfsResult<CreateFileResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend_mut(&located.mount_point)?
            .create_directory(&located.inode, user))
    }

    /// Create a symlink at `path`. The target is stored verbatim and only
    /// interpreted when the link is traversed.
    #[tracing::instrument(skip(self, cwd, user), fields(user = %user.name), name = "vfs.create_symlink")]
    pub fn create_symlink(
        &mut self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
        target: Path,
    ) -> VfsResult<CreateFileResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend_mut(&located.mount_point)?
            .create_symlink(&located.inode, user, target))
    }

    #[tracing::instrument(skip(self, cwd, user), fields(user = %user.name), name = "vfs.delete")]
    pub fn delete(
        &mut self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
    ) -> VfsResult<DeleteFileResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend_mut(&located.mount_point)?
            .delete_file(&located.inode, user))
    }

    #[tracing::instrument(skip(self, cwd, user, updates), fields(user = %user.name), name = "vfs.change_permissions")]
    pub fn change_permissions(
        &mut self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
        updates: &HashMap<String, Permission>,
    ) -> VfsResult<ChangePermissionsResult> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend_mut(&located.mount_point)?
            .change_permissions(&located.inode, user, updates))
    }

    /// List a directory. Mount points directly below it appear as
    /// directories, shadowing same-named entries of the backend.
    #[tracing::instrument(skip(self, cwd, user), fields(user = %user.name), name = "vfs.list_directory")]
    pub fn list_directory(
        &self,
        cwd: &Absolute,
        path: &Path,
        user: &User,
    ) -> VfsResult<ListDirectoryResult> {
        let located = self.locate(cwd, path)?;
        let listed = self
            .backend(&located.mount_point)?
            .list_directory(&located.inode, user);
        let ListDirectoryResult::Listed(mut entries) = listed else {
            return Ok(listed);
        };

        let local = Relative::from_segments(located.inode.path().segments().iter().cloned());
        let global = located.mount_point.join_all(local);
        for mount_point in self.mounts.keys() {
            if mount_point.is_root() || mount_point.parent() != global {
                continue;
            }
            let Some(name) = mount_point.file_name() else {
                continue;
            };
            entries.retain(|entry| entry.name != name);
            entries.push(DirEntry::directory(name));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ListDirectoryResult::Listed(entries))
    }

    pub fn exists(&self, cwd: &Absolute, path: &Path) -> VfsResult<bool> {
        let located = self.locate(cwd, path)?;
        Ok(self.backend(&located.mount_point)?.exists(&located.inode))
    }

    pub fn is_file(&self, cwd: &Absolute, path: &Path) -> VfsResult<bool> {
        let located = self.locate(cwd, path)?;
        Ok(self.backend(&located.mount_point)?.is_file(&located.inode))
    }

    pub fn is_directory(&self, cwd: &Absolute, path: &Path) -> VfsResult<bool> {
        let located = self.locate(cwd, path)?;
        Ok(self
            .backend(&located.mount_point)?
            .is_directory(&located.inode))
    }

    pub fn is_symlink(&self, cwd: &Absolute, path: &Path) -> VfsResult<bool> {
        let located = self.locate(cwd, path)?;
        Ok(self.backend(&located.mount_point)?.is_symlink(&located.inode))
    }

    /// Target of the symlink at `path`, `None` if it is not a symlink.
    pub fn read_link(&self, cwd: &Absolute, path: &Path) -> VfsResult<Option<Path>> {
        let located = self.locate(cwd, path)?;
        Ok(self.backend(&located.mount_point)?.read_link(&located.inode))
    }
}

/// Drop `.` segments; they never change where a path leads.
fn without_current_dir(path: &Absolute) -> Absolute {
    Absolute::from_segments(path.segments().iter().filter(|s| s.as_str() != "."))
}
