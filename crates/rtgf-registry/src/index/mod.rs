//! Immutable lookup index over published token entries.
//!
//! [`RegistryIndex`] holds one owned, URI-ordered entry set and two views
//! over it:
//!
//! - by `uri`, the primary key
//! - by `(lowercase(type), slug)`, the human-readable secondary key
//!
//! The index is built once and never mutated. Reloading the registry means
//! building a new index and swapping it in (see [`crate::registry`]).

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};
use crate::token::TokenEntry;

// ── RegistryIndex ────────────────────────────────────────────────────────────

/// Dual-keyed, read-only index over [`TokenEntry`] records.
#[derive(Debug, Clone)]
pub struct RegistryIndex {
    /// Shared entry set, sorted by URI.
    entries: Vec<TokenEntry>,
    /// Primary view: uri → position in `entries`.
    by_uri: HashMap<String, usize>,
    /// Secondary view: (lowercase type, slug) → position in `entries`.
    by_type_slug: HashMap<(String, String), usize>,
    /// `sha256:<hex>` digest over the entry set.
    snapshot_id: String,
}

impl RegistryIndex {
    /// Build an index over `entries`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::EmptyIndex` if no entries are supplied,
    /// `RegistryError::DuplicateUri` if two entries share a URI, and
    /// `RegistryError::DuplicateSlug` if two entries share a type and slug.
    pub fn build(entries: impl IntoIterator<Item = TokenEntry>) -> Result<Self> {
        let mut entries: Vec<TokenEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(RegistryError::EmptyIndex);
        }
        entries.sort_by(|a, b| a.uri.cmp(&b.uri));

        let mut by_uri = HashMap::with_capacity(entries.len());
        let mut by_type_slug = HashMap::with_capacity(entries.len());

        for (pos, entry) in entries.iter().enumerate() {
            if by_uri.insert(entry.uri.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateUri(entry.uri.clone()));
            }
            if let Some(key) = entry.slug_key() {
                if by_type_slug.contains_key(&key) {
                    let (token_type, slug) = key;
                    return Err(RegistryError::DuplicateSlug { token_type, slug });
                }
                by_type_slug.insert(key, pos);
            }
        }

        let snapshot_id = digest_entries(&entries)?;

        Ok(Self {
            entries,
            by_uri,
            by_type_slug,
            snapshot_id,
        })
    }

    /// Look up an entry by its URI.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown URI.
    pub fn lookup_by_uri(&self, uri: &str) -> Result<&TokenEntry> {
        self.by_uri
            .get(uri)
            .map(|&pos| &self.entries[pos])
            .ok_or_else(|| RegistryError::NotFound(format!("token {uri}")))
    }

    /// Look up an entry by type (case-insensitive) and slug (exact).
    ///
    /// The slug is validated before any lookup: an empty slug or one that
    /// contains `..` is rejected even if a matching entry exists.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidIdentifier` for an unsafe slug and
    /// `RegistryError::NotFound` when nothing matches.
    pub fn lookup_by_type_slug(&self, token_type: &str, slug: &str) -> Result<&TokenEntry> {
        validate_slug(slug)?;
        let key = (token_type.trim().to_ascii_lowercase(), slug.to_string());
        self.by_type_slug
            .get(&key)
            .map(|&pos| &self.entries[pos])
            .ok_or_else(|| RegistryError::NotFound(format!("token {}/{}", key.0, key.1)))
    }

    /// Iterate over every entry in URI order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenEntry> {
        self.entries.iter()
    }

    /// Digest identifying this exact entry set.
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a built index; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reject slugs that are empty or look like path traversal.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.contains("..") {
        return Err(RegistryError::InvalidIdentifier(format!(
            "invalid token identifier: {slug:?}"
        )));
    }
    Ok(())
}

fn digest_entries(entries: &[TokenEntry]) -> Result<String> {
    let canonical = serde_json::to_vec(entries)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    Ok(format!("sha256:{}", hex::encode(Sha256::digest(&canonical))))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
