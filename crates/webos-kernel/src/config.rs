//! Filesystem configuration.
//!
//! A [`VfsConfig`] describes which backends are mounted where and which users
//! exist. It is stored as RON:
//!
//! ```ron
//! (
//!     mounts: [
//!         (path: "/"),
//!         (path: "/scratch", capacity: Some(65536)),
//!     ],
//!     users: [
//!         (name: "root", home: "/root", root: true),
//!         (name: "alice", home: "/home/alice"),
//!     ],
//! )
//! ```
//!
//! [`VfsConfig::boot`] turns it into a ready [`MountTable`] with every home
//! directory provisioned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use webos_types::{Absolute, Path, PathError, Permission, User};

use crate::vfs::{
    ChangePermissionsResult, CreateFileResult, MountTable, PrimitiveBackend, VfsError,
};

/// Errors raised while loading or booting a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("path error: {0}")]
    Path(#[from] PathError),
    #[error("VFS error: {0}")]
    Vfs(#[from] VfsError),
    #[error("no backend mounted at /")]
    MissingRootMount,
    #[error("cannot provision home directory {0}")]
    HomeUnavailable(String),
}

/// One backend to mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    pub path: Absolute,
    /// Byte limit for file content; unlimited when absent.
    #[serde(default)]
    pub capacity: Option<u64>,
}

impl MountConfig {
    fn backend(&self) -> PrimitiveBackend {
        match self.capacity {
            Some(capacity) => PrimitiveBackend::with_capacity(capacity),
            None => PrimitiveBackend::new(),
        }
    }
}

/// One user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub home: Absolute,
    #[serde(default)]
    pub root: bool,
}

impl From<&UserConfig> for User {
    fn from(config: &UserConfig) -> Self {
        if config.root {
            User::root(config.name.clone(), config.home.clone())
        } else {
            User::new(config.name.clone(), config.home.clone())
        }
    }
}

/// Mounts and users of one simulated machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsConfig {
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for VfsConfig {
    /// A single unlimited root mount and a root user living in `/root`.
    fn default() -> Self {
        Self {
            mounts: vec![MountConfig {
                path: Absolute::root(),
                capacity: None,
            }],
            users: vec![UserConfig {
                name: "root".to_string(),
                home: Absolute::from_segments(["root"]),
                root: true,
            }],
        }
    }
}

impl VfsConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Read and parse a RON configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron(&text)?;
        debug!(path = %path.as_ref().display(), mounts = config.mounts.len(), "loaded config");
        Ok(config)
    }

    /// Serialize to pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Add a mount, parsing its path.
    pub fn with_mount(mut self, path: &str, capacity: Option<u64>) -> Result<Self, ConfigError> {
        self.mounts.push(MountConfig {
            path: Absolute::parse(path)?,
            capacity,
        });
        Ok(self)
    }

    /// Add a user, parsing its home directory.
    pub fn with_user(mut self, name: &str, home: &str, root: bool) -> Result<Self, ConfigError> {
        self.users.push(UserConfig {
            name: name.to_string(),
            home: Absolute::parse(home)?,
            root,
        });
        Ok(self)
    }

    /// All configured users.
    pub fn users(&self) -> Vec<User> {
        self.users.iter().map(User::from).collect()
    }

    /// Look up a configured user by name.
    pub fn user(&self, name: &str) -> Option<User> {
        self.users.iter().find(|u| u.name == name).map(User::from)
    }

    /// Build the mount table and provision every user's home directory.
    pub fn boot(&self) -> Result<MountTable, ConfigError> {
        let root_index = self
            .mounts
            .iter()
            .position(|m| m.path.is_root())
            .ok_or(ConfigError::MissingRootMount)?;

        let mut table = MountTable::new(self.mounts[root_index].backend());
        for (index, mount) in self.mounts.iter().enumerate() {
            if index != root_index {
                table.mount(mount.path.clone(), mount.backend())?;
            }
        }

        let admin = User::root("root", Absolute::root());
        for user in self.users() {
            provision_home(&mut table, &admin, &user)?;
        }

        info!(
            mounts = self.mounts.len(),
            users = self.users.len(),
            "filesystem booted"
        );
        Ok(table)
    }
}

/// Create `user`'s home directory (and missing ancestors) as `admin`, then
/// grant the user default permission on it.
fn provision_home(table: &mut MountTable, admin: &User, user: &User) -> Result<(), ConfigError> {
    let cwd = Absolute::root();
    let home = &user.home_directory;
    let unavailable = || ConfigError::HomeUnavailable(home.to_string());

    for depth in 1..=home.depth() {
        let ancestor = Absolute::from_segments(home.segments()[..depth].iter().cloned());
        match table.create_directory(&cwd, &Path::Absolute(ancestor), admin)? {
            CreateFileResult::Created | CreateFileResult::AlreadyExists => {}
            CreateFileResult::NoParent | CreateFileResult::NoPermission => {
                return Err(unavailable());
            }
        }
    }
    if !table.is_directory(&cwd, &Path::Absolute(home.clone()))? {
        return Err(unavailable());
    }

    let grant = HashMap::from([(user.name.clone(), Permission::DEFAULT)]);
    match table.change_permissions(&cwd, &Path::Absolute(home.clone()), admin, &grant)? {
        ChangePermissionsResult::Changed => {
            debug!(user = %user.name, %home, "provisioned home");
            Ok(())
        }
        _ => Err(unavailable()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{ReadFileResult, WriteFileResult};
    use std::io::Write;

    const SAMPLE: &str = r#"(
        mounts: [
            (path: "/"),
            (path: "/scratch", capacity: Some(8)),
        ],
        users: [
            (name: "root", home: "/root", root: true),
            (name: "alice", home: "/home/alice"),
        ],
    )"#;

    #[test]
    fn test_parse_sample() {
        let config = VfsConfig::from_ron(SAMPLE).unwrap();
        assert_eq!(config.mounts.len(), 2);
        assert_eq!(config.mounts[1].capacity, Some(8));
        assert_eq!(config.mounts[0].capacity, None);

        let alice = config.user("alice").unwrap();
        assert!(!alice.is_root);
        assert_eq!(alice.home_directory.to_string(), "/home/alice");
        assert!(config.user("root").unwrap().is_root);
        assert!(config.user("bob").is_none());
    }

    #[test]
    fn test_relative_mount_path_rejected() {
        let err = VfsConfig::from_ron(r#"(mounts: [(path: "scratch")])"#).unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = VfsConfig::from_ron(SAMPLE).unwrap();
        let text = config.to_ron().unwrap();
        assert_eq!(VfsConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_default_boots() {
        let config = VfsConfig::default();
        let table = config.boot().unwrap();
        assert_eq!(table.list_mounts().len(), 1);
        assert!(table
            .is_directory(&Absolute::root(), &Path::of("/root"))
            .unwrap());
    }

    #[test]
    fn test_missing_root_mount() {
        let config = VfsConfig::from_ron(r#"(mounts: [(path: "/scratch")])"#).unwrap();
        assert!(matches!(config.boot(), Err(ConfigError::MissingRootMount)));
    }

    #[test]
    fn test_duplicate_mount() {
        let config = VfsConfig::from_ron(r#"(mounts: [(path: "/"), (path: "/")])"#).unwrap();
        assert!(matches!(
            config.boot(),
            Err(ConfigError::Vfs(VfsError::AlreadyMounted(_)))
        ));
    }

    #[test]
    fn test_boot_provisions_homes() {
        let config = VfsConfig::from_ron(SAMPLE).unwrap();
        let mut table = config.boot().unwrap();
        let alice = config.user("alice").unwrap();
        let home = alice.home_directory.clone();

        assert_eq!(
            table
                .create_file(&home, &Path::of("notes.txt"), &alice)
                .unwrap(),
            CreateFileResult::Created
        );
        assert_eq!(
            table
                .create_file(&home, &Path::of("/home/intruder"), &alice)
                .unwrap(),
            CreateFileResult::NoPermission
        );
        let stat = table
            .stat(&Absolute::root(), &Path::of("/home/alice"))
            .unwrap()
            .unwrap();
        assert_eq!(stat.permissions.get("alice"), Some(&Permission::DEFAULT));
    }

    #[test]
    fn test_capacity_from_config() {
        let config = VfsConfig::from_ron(SAMPLE).unwrap();
        let mut table = config.boot().unwrap();
        let root = config.user("root").unwrap();
        let cwd = Absolute::root();

        table
            .create_file(&cwd, &Path::of("/scratch/f"), &root)
            .unwrap();
        assert_eq!(
            table
                .write(&cwd, &Path::of("/scratch/f"), &root, b"0123456789")
                .unwrap(),
            WriteFileResult::NotEnoughSpace {
                data_size: 10,
                space_left: 8
            }
        );
        assert_eq!(
            table.read(&cwd, &Path::of("/scratch/f"), &root).unwrap(),
            ReadFileResult::Read(Vec::new())
        );
    }

    #[test]
    fn test_home_blocked_by_file() {
        let mut table = VfsConfig::default().boot().unwrap();
        let admin = User::root("root", Absolute::root());
        table
            .create_file(&Absolute::root(), &Path::of("/srv"), &admin)
            .unwrap();

        let bob = User::new("bob", Absolute::parse("/srv/bob").unwrap());
        let err = provision_home(&mut table, &admin, &bob).unwrap_err();
        assert!(matches!(err, ConfigError::HomeUnavailable(home) if home == "/srv/bob"));
    }

    #[test]
    fn test_builder() {
        let config = VfsConfig::default()
            .with_mount("/tmp", Some(64))
            .unwrap()
            .with_user("carol", "/home/carol", false)
            .unwrap();
        assert_eq!(config.mounts.len(), 2);
        assert_eq!(config.users().len(), 2);
        assert!(config.boot().is_ok());

        let err = VfsConfig::default().with_mount("tmp", None).unwrap_err();
        assert!(matches!(err, ConfigError::Path(PathError::NotAbsolute(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = VfsConfig::load(file.path()).unwrap();
        assert_eq!(config, VfsConfig::from_ron(SAMPLE).unwrap());

        let missing = VfsConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
