//! Content stores: where token payloads live.
//!
//! A [`TokenEntry`](crate::token::TokenEntry) points at its payload through
//! an opaque `content_ref`. A [`ContentStore`] turns that reference into
//! bytes, and must tell "not found" apart from "found but unreadable": the
//! pipeline maps the first to `metadata_missing` and the second to
//! `metadata_invalid`.
//!
//! # Stores
//!
//! - [`DirContentStore`] reads `{base_dir}/{content_ref}` on every call.
//! - [`MemoryContentStore`] holds owned bytes. [`MemoryContentStore::preload`]
//!   snapshots a directory at startup so unreadable fixtures fail fast.

pub mod dir;
pub mod memory;

pub use dir::DirContentStore;
pub use memory::MemoryContentStore;

use crate::error::Result;

/// Read-only access to token payload bytes.
pub trait ContentStore: Send + Sync {
    /// Return the bytes behind `content_ref`.
    ///
    /// # Errors
    ///
    /// `RegistryError::NotFound` when nothing exists at the reference;
    /// `RegistryError::Unreadable` or `RegistryError::Io` when something
    /// exists but cannot be read.
    fn read(&self, content_ref: &str) -> Result<Vec<u8>>;
}
