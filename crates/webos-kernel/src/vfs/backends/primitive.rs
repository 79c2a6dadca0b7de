//! In-memory backend with per-user permissions.
//!
//! Every node lives in one ordered map keyed by its local path, so a
//! directory's descendants are exactly the keys under its prefix. All data is
//! ephemeral and owned by the instance.

use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use tracing::debug;
use webos_types::{Absolute, BackendId, Path, Permission, User};

use crate::vfs::ops::Filesystem;
use crate::vfs::types::{
    ChangePermissionsResult, CreateFileResult, DeleteFileResult, DirEntry, FileType, INode,
    ListDirectoryResult, ReadFileResult, Stat, WriteFileResult,
};

/// Node content.
#[derive(Debug, Clone)]
enum Content {
    File(Vec<u8>),
    Directory,
    Symlink(Path),
}

/// One stored object.
#[derive(Debug, Clone)]
struct Node {
    content: Content,
    owner: String,
    permissions: BTreeMap<String, Permission>,
    created: SystemTime,
    modified: SystemTime,
}

impl Node {
    fn new(content: Content, owner: &str, permissions: BTreeMap<String, Permission>) -> Self {
        let now = SystemTime::now();
        Self {
            content,
            owner: owner.to_string(),
            permissions,
            created: now,
            modified: now,
        }
    }

    fn kind(&self) -> FileType {
        match self.content {
            Content::File(_) => FileType::File,
            Content::Directory => FileType::Directory,
            Content::Symlink(_) => FileType::Symlink,
        }
    }

    fn size(&self) -> u64 {
        match &self.content {
            Content::File(data) => data.len() as u64,
            _ => 0,
        }
    }

    fn allows(&self, user: &User, check: impl Fn(&Permission) -> bool) -> bool {
        user.is_root || self.permissions.get(&user.name).is_some_and(check)
    }

    fn can_read(&self, user: &User) -> bool {
        self.allows(user, |p| p.read)
    }

    fn can_write(&self, user: &User) -> bool {
        self.allows(user, |p| p.write)
    }
}

/// In-memory filesystem backend.
///
/// The root directory always exists and carries no permission entries, so
/// only root users can populate a fresh instance.
#[derive(Debug)]
pub struct PrimitiveBackend {
    id: BackendId,
    nodes: BTreeMap<Absolute, Node>,
    capacity: Option<u64>,
}

impl Default for PrimitiveBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveBackend {
    /// Create an empty backend with unlimited capacity.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            Absolute::root(),
            Node::new(Content::Directory, "root", BTreeMap::new()),
        );
        Self {
            id: BackendId::new(),
            nodes,
            capacity: None,
        }
    }

    /// Create an empty backend that holds at most `capacity` bytes of file
    /// content.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Configured capacity in bytes, if any.
    pub fn capacity(&self) -> Option<u64> {
        self.capacity
    }

    /// Total size of all file contents.
    pub fn used_bytes(&self) -> u64 {
        self.nodes.values().map(Node::size).sum()
    }

    fn node(&self, inode: &INode) -> Option<&Node> {
        self.nodes.get(inode.path())
    }

    fn create(&mut self, inode: &INode, user: &User, content: Content) -> CreateFileResult {
        if self.nodes.contains_key(inode.path()) {
            return CreateFileResult::AlreadyExists;
        }
        let parent = match self.node(&inode.parent()) {
            Some(node) if node.kind().is_dir() => node,
            _ => return CreateFileResult::NoParent,
        };
        if !parent.can_write(user) {
            return CreateFileResult::NoPermission;
        }

        let permissions = BTreeMap::from([(user.name.clone(), Permission::DEFAULT)]);
        let node = Node::new(content, &user.name, permissions);
        debug!(backend = %self.id, path = %inode, kind = %node.kind(), user = %user.name, "created");
        self.nodes.insert(inode.path().clone(), node);
        CreateFileResult::Created
    }
}

impl Filesystem for PrimitiveBackend {
    fn kind(&self) -> &'static str {
        "primitive"
    }

    fn id(&self) -> BackendId {
        self.id
    }

    fn file_type(&self, inode: &INode) -> Option<FileType> {
        self.node(inode).map(Node::kind)
    }

    fn read_link(&self, inode: &INode) -> Option<Path> {
        match &self.node(inode)?.content {
            Content::Symlink(target) => Some(target.clone()),
            _ => None,
        }
    }

    fn stat(&self, inode: &INode) -> Option<Stat> {
        self.node(inode).map(|node| Stat {
            kind: node.kind(),
            size: node.size(),
            owner: node.owner.clone(),
            permissions: node.permissions.clone(),
            created: node.created,
            modified: node.modified,
        })
    }

    fn create_file(&mut self, inode: &INode, user: &User) -> CreateFileResult {
        self.create(inode, user, Content::File(Vec::new()))
    }

    fn create_directory(&mut self, inode: &INode, user: &User) -> CreateFileResult {
        self.create(inode, user, Content::Directory)
    }

    fn create_symlink(&mut self, inode: &INode, user: &User, target: Path) -> CreateFileResult {
        self.create(inode, user, Content::Symlink(target))
    }

    fn write_to_file(&mut self, inode: &INode, user: &User, data: &[u8]) -> WriteFileResult {
        let used = self.used_bytes();
        let capacity = self.capacity;
        let Some(node) = self.nodes.get_mut(inode.path()) else {
            return WriteFileResult::NotAFile;
        };
        if !node.kind().is_file() {
            return WriteFileResult::NotAFile;
        }
        if !node.can_write(user) {
            return WriteFileResult::NoPermission;
        }
        let data_size = data.len() as u64;
        if let Some(capacity) = capacity {
            let space_left = capacity.saturating_sub(used - node.size());
            if data_size > space_left {
                return WriteFileResult::NotEnoughSpace {
                    data_size,
                    space_left,
                };
            }
        }

        node.content = Content::File(data.to_vec());
        node.modified = SystemTime::now();
        debug!(backend = %self.id, path = %inode, bytes = data_size, "wrote file");
        WriteFileResult::Written
    }

    fn read_from_file(&self, inode: &INode, user: &User) -> ReadFileResult {
        let Some(node) = self.node(inode) else {
            return ReadFileResult::NotAFile;
        };
        let Content::File(data) = &node.content else {
            return ReadFileResult::NotAFile;
        };
        if !node.can_read(user) {
            return ReadFileResult::NoPermission;
        }
        ReadFileResult::Read(data.clone())
    }

    fn list_directory(&self, inode: &INode, user: &User) -> ListDirectoryResult {
        let Some(node) = self.node(inode) else {
            return ListDirectoryResult::NotADirectory;
        };
        if !node.kind().is_dir() {
            return ListDirectoryResult::NotADirectory;
        }
        if !node.can_read(user) {
            return ListDirectoryResult::NoPermission;
        }

        let depth = inode.path().depth();
        // BTreeMap order keeps the entries sorted by name.
        let entries = self
            .nodes
            .range(inode.path().clone()..)
            .skip(1)
            .take_while(|(path, _)| path.starts_with(inode.path()))
            .filter(|(path, _)| path.depth() == depth + 1)
            .filter_map(|(path, node)| Some(DirEntry::new(path.file_name()?, node.kind())))
            .collect();
        ListDirectoryResult::Listed(entries)
    }

    fn delete_file(&mut self, inode: &INode, user: &User) -> DeleteFileResult {
        let Some(node) = self.node(inode) else {
            return DeleteFileResult::NotAFile;
        };
        if inode.is_root() || !node.can_write(user) {
            return DeleteFileResult::NoPermission;
        }

        let target = inode.path();
        let before = self.nodes.len();
        self.nodes.retain(|path, _| !path.starts_with(target));
        debug!(
            backend = %self.id,
            path = %inode,
            removed = before - self.nodes.len(),
            "deleted"
        );
        DeleteFileResult::Deleted
    }

    fn change_permissions(
        &mut self,
        inode: &INode,
        user: &User,
        updates: &HashMap<String, Permission>,
    ) -> ChangePermissionsResult {
        let Some(node) = self.nodes.get_mut(inode.path()) else {
            return ChangePermissionsResult::NotFound;
        };
        if !node.can_write(user) {
            return ChangePermissionsResult::NoPermission;
        }

        node.permissions
            .extend(updates.iter().map(|(name, perm)| (name.clone(), *perm)));
        node.modified = SystemTime::now();
        debug!(backend = %self.id, path = %inode, entries = updates.len(), "changed permissions");
        ChangePermissionsResult::Changed
    }
}
