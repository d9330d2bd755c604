//! Registry snapshots and the reloadable registry handle.
//!
//! A [`RegistrySnapshot`] pairs one immutable [`RegistryIndex`] with the
//! content store its entries point into. [`Registry`] publishes the current
//! snapshot behind an `RwLock<Arc<_>>`: readers clone the `Arc` and keep
//! using that snapshot for as long as they need it, while a reload builds
//! the replacement off to the side and only takes the write lock to swap
//! the pointer.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::content::{ContentStore, DirContentStore, MemoryContentStore};
use crate::error::{RegistryError, Result};
use crate::index::RegistryIndex;
use crate::manifest::Manifest;
use crate::token::TokenEntry;
use crate::trust::PayloadSource;

/// One immutable view of the published tokens and their payloads.
pub struct RegistrySnapshot {
    index: RegistryIndex,
    store: Arc<dyn ContentStore>,
}

impl RegistrySnapshot {
    pub fn new(index: RegistryIndex, store: Arc<dyn ContentStore>) -> Self {
        Self { index, store }
    }

    /// Build a snapshot from `manifest`, reading every payload out of
    /// `static_dir` up front.
    ///
    /// # Errors
    ///
    /// Fails if the directory is missing, a payload is missing or not JSON,
    /// or the entries violate the index invariants.
    pub fn load(static_dir: &Path, manifest: &Manifest) -> Result<Self> {
        let dir = DirContentStore::open(static_dir)?;
        let store = MemoryContentStore::preload(&dir, manifest.content_refs())?;
        let index = RegistryIndex::build(manifest.tokens.iter().cloned())?;
        log::debug!(
            "loaded {} tokens from {} as {}",
            index.len(),
            static_dir.display(),
            index.snapshot_id()
        );
        Ok(Self::new(index, Arc::new(store)))
    }

    pub fn index(&self) -> &RegistryIndex {
        &self.index
    }

    pub fn snapshot_id(&self) -> &str {
        self.index.snapshot_id()
    }

    pub fn entry(&self, uri: &str) -> Result<&TokenEntry> {
        self.index.lookup_by_uri(uri)
    }

    /// Raw payload of the token published under `uri`.
    pub fn token_by_uri(&self, uri: &str) -> Result<Vec<u8>> {
        let entry = self.index.lookup_by_uri(uri)?;
        self.store.read(&entry.content_ref)
    }

    /// Raw payload of the token published under `token_type`/`slug`.
    ///
    /// # Errors
    ///
    /// `RegistryError::InvalidIdentifier` for an empty or `..` slug, before
    /// any lookup happens.
    pub fn token_by_type_slug(&self, token_type: &str, slug: &str) -> Result<Vec<u8>> {
        let entry = self.index.lookup_by_type_slug(token_type, slug)?;
        self.store.read(&entry.content_ref)
    }
}

impl PayloadSource for RegistrySnapshot {
    fn payload(&self, uri: &str) -> Result<Vec<u8>> {
        let bytes = self.token_by_uri(uri)?;
        if bytes.is_empty() {
            return Err(RegistryError::NotFound(format!("payload for {uri}")));
        }
        Ok(bytes)
    }
}

impl fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("snapshot_id", &self.index.snapshot_id())
            .field("tokens", &self.index.len())
            .finish()
    }
}

/// Holder of the current snapshot.
#[derive(Debug)]
pub struct Registry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl Registry {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Pin the current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publish `next` and return the snapshot it replaced. Readers holding
    /// the old snapshot are unaffected.
    pub fn swap(&self, next: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        let next = Arc::new(next);
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, Arc::clone(&next))
        };
        log::info!(
            "registry snapshot {} replaced by {} ({} tokens)",
            previous.snapshot_id(),
            next.snapshot_id(),
            next.index().len()
        );
        previous
    }
}
