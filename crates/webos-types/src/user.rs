//! Users and per-object permissions.
//!
//! A `User` is supplied by whoever drives the simulated OS (shell, login
//! flow). The filesystem never authenticates; it only authorizes users that
//! are already identified.

use serde::{Deserialize, Serialize};

use crate::path::Absolute;

/// An identified user of the simulated OS.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Login name. Permission entries are keyed by this.
    pub name: String,
    /// Where `~` points for this user.
    pub home_directory: Absolute,
    /// Root bypasses every permission check.
    #[serde(default)]
    pub is_root: bool,
}

impl User {
    /// Create an ordinary (non-root) user.
    pub fn new(name: impl Into<String>, home_directory: Absolute) -> Self {
        Self {
            name: name.into(),
            home_directory,
            is_root: false,
        }
    }

    /// Create a user with root privileges.
    pub fn root(name: impl Into<String>, home_directory: Absolute) -> Self {
        Self {
            name: name.into(),
            home_directory,
            is_root: true,
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root {
            write!(f, "{} (root)", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Read / write / execute flags one user holds on one object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Permission {
    /// What an object's creator receives.
    pub const DEFAULT: Permission = Permission {
        read: true,
        write: true,
        execute: false,
    };

    /// No access at all.
    pub const NONE: Permission = Permission {
        read: false,
        write: false,
        execute: false,
    };

    pub const READ_ONLY: Permission = Permission {
        read: true,
        write: false,
        execute: false,
    };

    pub fn new(read: bool, write: bool, execute: bool) -> Self {
        Self {
            read,
            write,
            execute,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_construction() {
        let home = Absolute::parse("/home/amy").unwrap();
        let amy = User::new("amy", home.clone());
        assert_eq!(amy.name, "amy");
        assert_eq!(amy.home_directory, home);
        assert!(!amy.is_root);

        let root = User::root("root", Absolute::parse("/root").unwrap());
        assert!(root.is_root);
    }

    #[test]
    fn test_creator_default_permission() {
        assert_eq!(Permission::DEFAULT, Permission::new(true, true, false));
        assert_eq!(Permission::default(), Permission::NONE);
    }

    #[test]
    fn test_user_display() {
        let amy = User::new("amy", Absolute::parse("/home/amy").unwrap());
        assert_eq!(amy.to_string(), "amy");
        let root = User::root("root", Absolute::root());
        assert_eq!(root.to_string(), "root (root)");
    }

    #[test]
    fn test_user_serde_json_roundtrip() {
        let amy = User::new("amy", Absolute::parse("/home/amy").unwrap());
        let json = serde_json::to_string(&amy).unwrap();
        assert!(json.contains("\"/home/amy\""));
        let parsed: User = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, amy);
    }

    #[test]
    fn test_user_is_root_defaults_to_false() {
        let parsed: User =
            serde_json::from_str(r#"{"name":"guest","home_directory":"/home/guest"}"#).unwrap();
        assert!(!parsed.is_root);
    }
}
