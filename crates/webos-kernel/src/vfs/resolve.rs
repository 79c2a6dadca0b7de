//! Symlink and indirection resolution.
//!
//! Two walks share this module:
//!
//! - **Standalone** (`resolve_segment`, `resolve_path`): a backend resolving
//!   paths in its own namespace. `..` strips the last component (the root is
//!   its own parent). A symlink is replaced by its target before the next
//!   segment is appended: absolute targets restart at the backend root,
//!   relative targets start at the symlink's parent.
//! - **Mount-aware** (`lookup`): plain descents stay inside the backend, but
//!   any `..` or symlink hands the rest of the path back to the
//!   [`MountTable`](super::MountTable) as [`Lookup::ResolveAgain`], so the
//!   table can re-route it. That is what lets symlinks cross mounts.
//!
//! The final component of a path is never followed, so a handle can address
//! a symlink itself. Symlink hops are bounded by [`MAX_SYMLINK_HOPS`].

use tracing::warn;
use webos_types::{Absolute, Path, Relative};

use super::error::{VfsError, VfsResult};
use super::ops::Filesystem;
use super::types::INode;

/// Maximum symlinks followed while resolving one path.
pub const MAX_SYMLINK_HOPS: usize = 40;

const PARENT: &str = "..";
const CURRENT: &str = ".";

/// Result of a mount-aware lookup inside one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Resolution finished inside the backend.
    Found(INode),
    /// Resolution must continue at the mount table.
    ///
    /// An absolute `path` is global. A relative `path` is relative to the
    /// backend's mount point; leading `..` segments climb above it.
    ResolveAgain { path: Path, via_symlink: bool },
}

/// Resolve one segment against `inode` within `fs`.
pub fn resolve_segment<F>(fs: &F, inode: &INode, segment: &str) -> VfsResult<INode>
where
    F: Filesystem + ?Sized,
{
    let mut hops = 0;
    step(fs, inode, segment, &mut hops)
}

/// Resolve every segment in order, starting at `start`.
pub fn resolve_path<F>(fs: &F, start: &INode, segments: &[String]) -> VfsResult<INode>
where
    F: Filesystem + ?Sized,
{
    let mut hops = 0;
    walk(fs, start, segments, &mut hops)
}

fn walk<F>(fs: &F, start: &INode, segments: &[String], hops: &mut usize) -> VfsResult<INode>
where
    F: Filesystem + ?Sized,
{
    let mut inode = start.clone();
    for segment in segments {
        inode = step(fs, &inode, segment, hops)?;
    }
    Ok(inode)
}

fn step<F>(fs: &F, inode: &INode, segment: &str, hops: &mut usize) -> VfsResult<INode>
where
    F: Filesystem + ?Sized,
{
    match segment {
        PARENT => return Ok(inode.parent()),
        "" | CURRENT => return Ok(inode.clone()),
        _ => {}
    }

    let mut base = inode.clone();
    while let Some(target) = fs.read_link(&base) {
        *hops += 1;
        if *hops > MAX_SYMLINK_HOPS {
            warn!(link = %base, backend = %fs.id(), "symlink hop limit reached");
            return Err(VfsError::symlink_loop(&base));
        }
        base = match &target {
            Path::Absolute(t) => walk(fs, &fs.root(), t.segments(), hops)?,
            Path::Relative(t) => walk(fs, &base.parent(), t.segments(), hops)?,
        };
    }
    Ok(base.child(segment))
}

/// Walk `path` inside `fs`, handing back to the mount table on `..` or a
/// symlink met mid-path.
pub fn lookup<F>(fs: &F, path: &Absolute) -> Lookup
where
    F: Filesystem + ?Sized,
{
    let segments = path.segments();
    let mut current = fs.root();

    for (i, segment) in segments.iter().enumerate() {
        match segment.as_str() {
            CURRENT => continue,
            PARENT => {
                let mut redirected = if current.is_root() {
                    vec![PARENT.to_string()]
                } else {
                    current.parent().path().segments().to_vec()
                };
                redirected.extend_from_slice(&segments[i + 1..]);
                return Lookup::ResolveAgain {
                    path: Path::Relative(Relative::from_segments(redirected)),
                    via_symlink: false,
                };
            }
            _ => {}
        }

        if let Some(target) = fs.read_link(&current) {
            let tail = segments[i..].iter().cloned();
            let path = match target {
                Path::Absolute(t) => Path::Absolute(t.join_all(Relative::from_segments(tail))),
                Path::Relative(t) => {
                    let parent = current.parent();
                    let spliced = parent
                        .path()
                        .segments()
                        .iter()
                        .chain(t.segments())
                        .cloned()
                        .chain(tail);
                    Path::Relative(Relative::from_segments(spliced))
                }
            };
            return Lookup::ResolveAgain {
                path,
                via_symlink: true,
            };
        }

        current = current.child(segment);
    }

    Lookup::Found(current)
}

/// Anchor a relative `ResolveAgain` path at its mount point, consuming
/// leading `..` segments against the mount point itself.
pub(crate) fn rebase(mount_point: &Absolute, relative: &Relative) -> Absolute {
    let mut base = mount_point.clone();
    let mut segments = relative.segments();
    while let Some((first, rest)) = segments.split_first() {
        if first != PARENT {
            break;
        }
        base = base.parent();
        segments = rest;
    }
    base.join_all(Relative::from_segments(segments.iter().cloned()))
}
