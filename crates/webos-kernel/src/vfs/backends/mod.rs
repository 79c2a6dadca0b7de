//! VFS backends.
//!
//! Backends implement [`Filesystem`](super::Filesystem) for different
//! storage types.

mod primitive;

pub use primitive::PrimitiveBackend;
