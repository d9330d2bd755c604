//! Verification service.
//!
//! [`VerificationService`] is what the binaries talk to. It owns the
//! reloadable [`Registry`], the process-wide [`RevocationEpoch`], and the
//! verifier mode chosen at startup, and exposes the registry's external
//! operations over them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::config::{RegistryConfig, VerifierKind};
use crate::crypto::KeySet;
use crate::epoch::RevocationEpoch;
use crate::error::{RegistryError, Result};
use crate::manifest::Manifest;
use crate::registry::{Registry, RegistrySnapshot};
use crate::trust::VerifierMode;
use crate::verify::{VerificationPipeline, VerificationRequest, VerificationVerdict};

/// Registry, epoch and verifier composed into one handle.
#[derive(Debug)]
pub struct VerificationService {
    config: RegistryConfig,
    registry: Registry,
    epoch: RevocationEpoch,
    mode: VerifierMode,
    jwks: Value,
}

impl VerificationService {
    /// Load everything `config` points at.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal to startup: a missing static directory or
    /// payload, an invalid manifest, duplicate identifiers, or an unusable
    /// key set in `ed25519` mode.
    pub fn open(config: RegistryConfig) -> Result<Self> {
        let snapshot = load_snapshot(&config)?;
        let (jwks, mode) = load_keys(&config)?;
        log::info!(
            "registry ready: {} tokens, snapshot {}, verifier {}, epoch {}",
            snapshot.index().len(),
            snapshot.snapshot_id(),
            mode.name(),
            config.initial_epoch
        );
        Ok(Self::from_parts(config, snapshot, mode, jwks))
    }

    /// Compose a service from already-built parts.
    pub fn from_parts(
        config: RegistryConfig,
        snapshot: RegistrySnapshot,
        mode: VerifierMode,
        jwks: Value,
    ) -> Self {
        let epoch = RevocationEpoch::new(config.initial_epoch);
        Self {
            config,
            registry: Registry::new(snapshot),
            epoch,
            mode,
            jwks,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn verifier_name(&self) -> &'static str {
        self.mode.name()
    }

    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.registry.snapshot()
    }

    /// Verify against the configured clock.
    pub fn verify(&self, request: &VerificationRequest) -> VerificationVerdict {
        self.verify_at(request, self.config.now())
    }

    /// Verify at an explicit instant, against one pinned snapshot.
    pub fn verify_at(&self, request: &VerificationRequest, now: DateTime<Utc>) -> VerificationVerdict {
        let verifier = self.mode.bind(self.registry.snapshot());
        VerificationPipeline::new(verifier.as_ref(), &self.epoch).verify(request, now)
    }

    pub fn read_epoch(&self) -> u64 {
        self.epoch.read()
    }

    pub fn bump_epoch(&self) -> u64 {
        self.epoch.bump()
    }

    pub fn token_by_uri(&self, uri: &str) -> Result<Vec<u8>> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(RegistryError::InvalidIdentifier("missing uri".into()));
        }
        self.registry.snapshot().token_by_uri(uri)
    }

    pub fn token_by_type_slug(&self, token_type: &str, slug: &str) -> Result<Vec<u8>> {
        self.registry.snapshot().token_by_type_slug(token_type, slug)
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::publish(
            self.registry.snapshot().snapshot_id(),
            &self.config.catalog,
            self.config.base_url.as_deref(),
        )
    }

    /// The issuer key set document as published.
    pub fn jwks(&self) -> &Value {
        &self.jwks
    }

    /// Rebuild the snapshot from the configured sources and swap it in.
    /// On failure the current snapshot stays in place.
    ///
    /// Returns the new snapshot id.
    pub fn reload(&self) -> Result<String> {
        let next = load_snapshot(&self.config)?;
        let id = next.snapshot_id().to_string();
        self.registry.swap(next);
        Ok(id)
    }
}

fn load_snapshot(config: &RegistryConfig) -> Result<RegistrySnapshot> {
    let manifest = match &config.manifest {
        Some(path) => Manifest::load(path)?,
        None => Manifest::sandbox(),
    };
    RegistrySnapshot::load(&config.static_dir, &manifest)
}

fn load_keys(config: &RegistryConfig) -> Result<(Value, VerifierMode)> {
    let path = config.jwks_path();
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if config.verifier == VerifierKind::Ed25519 {
                return Err(RegistryError::NotFound(format!("key set {}", path.display())));
            }
            log::warn!("no key set at {}; publishing an empty one", path.display());
            return Ok((serde_json::json!({ "keys": [] }), VerifierMode::Structural));
        }
        Err(e) => return Err(RegistryError::Io(e)),
    };
    let jwks: Value = serde_json::from_slice(&bytes)
        .map_err(|e| RegistryError::InvalidFileFormat(format!("{}: {e}", path.display())))?;

    let mode = match config.verifier {
        VerifierKind::Structural => VerifierMode::Structural,
        VerifierKind::Ed25519 => {
            let keys = KeySet::from_jwks(&bytes)?;
            if keys.is_empty() {
                return Err(RegistryError::InvalidKey(format!(
                    "{} has no Ed25519 keys",
                    path.display()
                )));
            }
            VerifierMode::Ed25519(Arc::new(keys))
        }
    };
    Ok((jwks, mode))
}
