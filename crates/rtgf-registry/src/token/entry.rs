//! Published token metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::time::optional_rfc3339;

use super::kind::TokenType;

/// One published trust artifact.
///
/// Entries are created when an index is built and never mutated afterwards;
/// a reload replaces the whole index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Globally unique token identifier.
    pub uri: String,
    /// Type discriminator.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Human-readable identifier, unique per type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Pointer into the content store holding the payload.
    pub content_ref: String,
    /// Content digest. Advisory only; never checked against the payload.
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, with = "optional_rfc3339")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "nbf", with = "optional_rfc3339")]
    pub not_before: Option<DateTime<Utc>>,
    #[serde(default, rename = "exp", with = "optional_rfc3339")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoked: bool,
}

impl TokenEntry {
    /// Create an entry with only the required fields set.
    pub fn new(
        uri: impl Into<String>,
        token_type: TokenType,
        content_ref: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            token_type,
            slug: None,
            content_ref: content_ref.into(),
            hash: String::new(),
            version: String::new(),
            issued_at: None,
            not_before: None,
            expires_at: None,
            revoked: false,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// Set the validity window. Either bound may be open.
    pub fn with_window(
        mut self,
        not_before: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.not_before = not_before;
        self.expires_at = expires_at;
        self
    }

    pub fn with_revoked(mut self, revoked: bool) -> Self {
        self.revoked = revoked;
        self
    }

    /// Key into the type+slug index, if the entry has a slug.
    pub fn slug_key(&self) -> Option<(String, String)> {
        self.slug
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| (self.token_type.index_key(), s.clone()))
    }

    /// Check `nbf <= exp` when both bounds are present.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidWindow` when the window is inverted.
    pub fn check_window(&self) -> Result<()> {
        match (self.not_before, self.expires_at) {
            (Some(nbf), Some(exp)) if nbf > exp => Err(RegistryError::InvalidWindow {
                uri: self.uri.clone(),
            }),
            _ => Ok(()),
        }
    }
}
