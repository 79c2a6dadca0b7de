//! Shared types for the WebOS virtual filesystem.
//!
//! A pure leaf crate: path algebra, users and permissions, and backend
//! identifiers. It does no I/O and has **no internal dependencies**.
//!
//! # Key Types
//!
//! |------------------|-----------------------------------------------|
//! | Type             | Purpose                                       |
//! |------------------|-----------------------------------------------|
//! | [`Path`]         | Absolute or relative path, parsed from text   |
//! | [`Absolute`]     | Path anchored at `/` (mount points, homes)    |
//! | [`Relative`]     | Path resolved against a working directory     |
//! | [`User`]         | Who is acting (name, home, root flag)         |
//! | [`Permission`]   | read / write / execute on one object          |
//! | [`BackendId`]    | Which backend instance                        |
//! |------------------|-----------------------------------------------|

pub mod ids;
pub mod path;
pub mod user;

// Re-export primary types at crate root for convenience.
pub use ids::BackendId;
pub use path::{Absolute, Path, PathError, Relative};
pub use user::{Permission, User};
