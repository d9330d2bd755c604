//! In-memory content store.

use std::collections::HashMap;

use crate::error::{RegistryError, Result};

use super::ContentStore;

/// Owned map from content reference to payload bytes.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    items: HashMap<String, Vec<u8>>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bytes behind `content_ref`.
    pub fn insert(&mut self, content_ref: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.items.insert(content_ref.into(), bytes.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, content_ref: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(content_ref, bytes);
        self
    }

    /// Copy every reference in `refs` out of `source`, requiring each to be
    /// well-formed JSON.
    ///
    /// Used at startup so a missing or corrupt fixture stops the registry
    /// from ever becoming ready instead of failing per request.
    ///
    /// # Errors
    ///
    /// Propagates the source's read error, or returns
    /// `RegistryError::InvalidFileFormat` for bytes that are not JSON.
    pub fn preload<'a>(
        source: &dyn ContentStore,
        refs: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let mut store = Self::new();
        for content_ref in refs {
            if store.items.contains_key(content_ref) {
                continue;
            }
            let bytes = source.read(content_ref)?;
            if serde_json::from_slice::<serde_json::Value>(&bytes).is_err() {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "fixture {content_ref} is not valid JSON"
                )));
            }
            store.insert(content_ref, bytes);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ContentStore for MemoryContentStore {
    fn read(&self, content_ref: &str) -> Result<Vec<u8>> {
        self.items
            .get(content_ref)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("content {content_ref}")))
    }
}
