//! Token manifests.
//!
//! A manifest is the JSON list of published entries a registry serves:
//!
//! ```json
//! {
//!   "version": "2025.10",
//!   "tokens": [
//!     {"uri": "urn:lane2:token:IMT:EU:SG:2025", "type": "IMT",
//!      "slug": "eu-sg-2025", "content_ref": "imt-eu-sg-2025.json",
//!      "nbf": "2025-10-01T00:00:00Z", "exp": "2026-10-01T00:00:00Z"}
//!   ]
//! }
//! ```
//!
//! Loading validates each entry's window. Uniqueness is checked when the
//! index is built.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::token::{TokenEntry, TokenType};

/// A versioned set of token entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: String,
    pub tokens: Vec<TokenEntry>,
}

impl Manifest {
    /// Parse and validate a manifest document.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` for malformed JSON and
    /// `RegistryError::InvalidWindow` for an entry with `nbf` after `exp`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes)
            .map_err(|e| RegistryError::InvalidFileFormat(format!("manifest: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                RegistryError::NotFound(format!("manifest {}", path.display()))
            }
            _ => RegistryError::Io(e),
        })?;
        let manifest = Self::from_slice(&bytes)?;
        log::debug!(
            "loaded manifest {} ({} tokens) from {}",
            manifest.version,
            manifest.tokens.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// The built-in sandbox manifest.
    pub fn sandbox() -> Self {
        Self {
            version: "2025.10".into(),
            tokens: default_entries(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.tokens.iter().try_for_each(TokenEntry::check_window)
    }

    /// Distinct content references, sorted.
    pub fn content_refs(&self) -> BTreeSet<&str> {
        self.tokens.iter().map(|t| t.content_ref.as_str()).collect()
    }
}

/// Sandbox entries served when no manifest is configured.
///
/// `RMT` and `RRMT` identifiers share one payload so both spellings of the
/// regulatory token resolve.
pub fn default_entries() -> Vec<TokenEntry> {
    vec![
        sandbox_entry(
            "urn:lane2:token:RRMT:EU:PSD3:3.2",
            TokenType::Rrmt,
            "eu-psd3-2025",
            "rrmt-eu-psd3-2025.json",
            "sha256:60c9cb7b4d86288db2380db33cc73990b3e020b49de67c77c821f93b192b609d",
            "2025.10",
            ymd(2027, 10, 1),
        ),
        sandbox_entry(
            "urn:lane2:token:RMT:EU:PSD3:3.2",
            TokenType::Rmt,
            "eu-psd3-2025",
            "rrmt-eu-psd3-2025.json",
            "sha256:60c9cb7b4d86288db2380db33cc73990b3e020b49de67c77c821f93b192b609d",
            "2025.10",
            ymd(2027, 10, 1),
        ),
        sandbox_entry(
            "urn:lane2:token:IMT:EU:SG:2025",
            TokenType::Imt,
            "eu-sg-2025",
            "imt-eu-sg-2025.json",
            "sha256:5370d8ce844964219638555bffc4b73b2c2517440dadf667df42418e764bcf29",
            "2025.10",
            ymd(2027, 10, 1),
        ),
        sandbox_entry(
            "urn:lane2:token:CORT:VODAFONE.VISA:2025",
            TokenType::Cort,
            "vodafone-visa-2025",
            "cort-vodafone-visa-2025.json",
            "sha256:0649ebea135eab14331b4219b80b02f95448711d99e54101dc9187e2055de374",
            "2025-Q4",
            ymd(2027, 10, 1),
        ),
        sandbox_entry(
            "urn:lane2:token:PSRT:VISA:ACQ-123",
            TokenType::Psrt,
            "visa-acq-123",
            "psrt-visa-acq-123.json",
            "sha256:f65422602eddf94d612c3cc5033adad2afba7b436051331745cbae8df18a3c7f",
            "2025-01",
            ymd(2027, 10, 1),
        ),
    ]
}

fn sandbox_entry(
    uri: &str,
    token_type: TokenType,
    slug: &str,
    content_ref: &str,
    hash: &str,
    version: &str,
    expires_at: Option<DateTime<Utc>>,
) -> TokenEntry {
    let issued = ymd(2025, 10, 1);
    let mut entry = TokenEntry::new(uri, token_type, content_ref)
        .with_slug(slug)
        .with_hash(hash)
        .with_version(version)
        .with_window(issued, expires_at);
    entry.issued_at = issued;
    entry
}

fn ymd(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single()
}
