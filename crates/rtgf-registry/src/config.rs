//! Registry configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional JSON file, then environment variables. Binaries apply their
//! command-line flags on top.
//!
//! | Variable              | Field           |
//! |-----------------------|-----------------|
//! | `RTGF_STATIC_DIR`     | `static_dir`    |
//! | `RTGF_URL`            | `base_url`      |
//! | `RTGF_INITIAL_EPOCH`  | `initial_epoch` |
//! | `FIXED_TIME`          | `fixed_time`    |

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSettings;
use crate::error::{RegistryError, Result};
use crate::time::{now_or, optional_rfc3339, parse_rfc3339};

pub const ENV_STATIC_DIR: &str = "RTGF_STATIC_DIR";
pub const ENV_URL: &str = "RTGF_URL";
pub const ENV_INITIAL_EPOCH: &str = "RTGF_INITIAL_EPOCH";
pub const ENV_FIXED_TIME: &str = "FIXED_TIME";

/// Which trust verifier the service composes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifierKind {
    #[default]
    Structural,
    Ed25519,
}

impl FromStr for VerifierKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" => Ok(Self::Structural),
            "ed25519" => Ok(Self::Ed25519),
            other => Err(RegistryError::Config(format!("unknown verifier {other:?}"))),
        }
    }
}

impl fmt::Display for VerifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structural => "structural",
            Self::Ed25519 => "ed25519",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding token payloads and the issuer key set.
    pub static_dir: PathBuf,
    /// Token manifest. The sandbox entries are served when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    pub initial_epoch: u64,
    /// Public base URL, used to make the catalog's JWKS link absolute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Key set file name inside `static_dir`.
    pub jwks_file: String,
    pub verifier: VerifierKind,
    /// Clock override for reproducible verdicts.
    #[serde(with = "optional_rfc3339")]
    pub fixed_time: Option<DateTime<Utc>>,
    pub catalog: CatalogSettings,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("./static/tokens"),
            manifest: None,
            initial_epoch: 1,
            base_url: None,
            jwks_file: "jwks.json".into(),
            verifier: VerifierKind::Structural,
            fixed_time: None,
            catalog: CatalogSettings::default(),
        }
    }
}

impl RegistryConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                RegistryError::NotFound(format!("config {}", path.display()))
            }
            _ => RegistryError::Io(e),
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RegistryError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults or `path`, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_STATIC_DIR) {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(url) = get(ENV_URL) {
            self.base_url = Some(url.trim().trim_end_matches('/').to_string());
        }
        if let Some(raw) = get(ENV_INITIAL_EPOCH) {
            self.initial_epoch = raw.trim().parse().map_err(|_| {
                RegistryError::Config(format!("{ENV_INITIAL_EPOCH} must be an integer, got {raw:?}"))
            })?;
        }
        if let Some(raw) = get(ENV_FIXED_TIME) {
            // An unparseable clock override falls back to the wall clock.
            match parse_rfc3339(&raw) {
                Ok(ts) => self.fixed_time = Some(ts),
                Err(e) => log::warn!("ignoring {ENV_FIXED_TIME}: {e}"),
            }
        }
        Ok(())
    }

    /// The clock the service verifies against.
    pub fn now(&self) -> DateTime<Utc> {
        now_or(self.fixed_time)
    }

    pub fn jwks_path(&self) -> PathBuf {
        self.static_dir.join(&self.jwks_file)
    }
}
