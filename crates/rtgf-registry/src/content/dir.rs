//! Directory-backed content store.
//!
//! ```text
//! {base_dir}/
//! ├── rrmt-eu-psd3-2025.json
//! ├── imt-eu-sg-2025.json
//! ├── cort-vodafone-visa-2025.json
//! ├── psrt-visa-acq-123.json
//! └── jwks.json
//! ```

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{RegistryError, Result};

use super::ContentStore;

/// Filesystem store resolving references relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct DirContentStore {
    base_dir: PathBuf,
}

impl DirContentStore {
    /// Open a store rooted at `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` if `base_dir` is not a directory.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        if !base_dir.is_dir() {
            return Err(RegistryError::NotFound(format!(
                "static directory {}",
                base_dir.display()
            )));
        }
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Build the path for a reference, refusing anything that would leave
    /// `base_dir`.
    fn resolve_path(&self, content_ref: &str) -> Result<PathBuf> {
        let rel = Path::new(content_ref);
        let safe = !content_ref.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(RegistryError::InvalidIdentifier(format!(
                "content reference {content_ref:?}"
            )));
        }
        Ok(self.base_dir.join(rel))
    }
}

impl ContentStore for DirContentStore {
    fn read(&self, content_ref: &str) -> Result<Vec<u8>> {
        let path = self.resolve_path(content_ref)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RegistryError::NotFound(format!(
                "content {}",
                path.display()
            ))),
            Err(e) => Err(RegistryError::Unreadable {
                uri: content_ref.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
