//! Ed25519 key pairs and issuer key sets.
//!
//! Issuers publish their verifying keys as a JWKS document
//! (`{"keys":[{"kty":"OKP","crv":"Ed25519","kid":..,"x":..}]}`) where `x`
//! is the base64url-encoded 32-byte public key. [`KeySet`] is the parsed,
//! read-only form of that document.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{RegistryError, Result};

/// An Ed25519 key pair for signing token payloads.
///
/// The signing key is zeroized on drop to prevent private key leakage.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(bytes)
            .map_err(|e| RegistryError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Export the public half as a JWK under `kid`.
    pub fn to_jwk(&self, kid: impl Into<String>) -> Jwk {
        Jwk::ed25519(kid, &self.verifying_key)
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

/// One JSON Web Key as published in a JWKS document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub crv: String,
    #[serde(default)]
    pub kid: String,
    #[serde(default)]
    pub x: String,
}

impl Jwk {
    /// Build an `OKP`/`Ed25519` JWK.
    pub fn ed25519(kid: impl Into<String>, key: &VerifyingKey) -> Self {
        Self {
            kty: "OKP".into(),
            crv: "Ed25519".into(),
            kid: kid.into(),
            x: URL_SAFE_NO_PAD.encode(key.to_bytes()),
        }
    }

    fn is_ed25519(&self) -> bool {
        self.kty == "OKP" && self.crv == "Ed25519"
    }

    fn verifying_key(&self) -> Result<VerifyingKey> {
        let raw = URL_SAFE_NO_PAD
            .decode(self.x.trim_end_matches('='))
            .map_err(|e| RegistryError::InvalidKey(format!("jwk {}: bad x: {e}", self.kid)))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| RegistryError::InvalidKey(format!("jwk {}: x must be 32 bytes", self.kid)))?;
        Ed25519KeyPair::verifying_key_from_bytes(&bytes)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

/// Verifying keys indexed by key id.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, VerifyingKey>,
}

impl KeySet {
    /// Parse a JWKS document. Keys that are not `OKP`/`Ed25519` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` for malformed JSON and
    /// `RegistryError::InvalidKey` for a malformed Ed25519 key or a missing
    /// `kid`.
    pub fn from_jwks(bytes: &[u8]) -> Result<Self> {
        let doc: JwksDocument = serde_json::from_slice(bytes)
            .map_err(|e| RegistryError::InvalidFileFormat(format!("jwks: {e}")))?;
        let mut set = Self::default();
        for jwk in doc.keys {
            if !jwk.is_ed25519() {
                log::debug!("skipping non-Ed25519 jwk {} ({})", jwk.kid, jwk.kty);
                continue;
            }
            if jwk.kid.is_empty() {
                return Err(RegistryError::InvalidKey("jwk without kid".into()));
            }
            let key = jwk.verifying_key()?;
            set.keys.insert(jwk.kid, key);
        }
        Ok(set)
    }

    /// Add a key under `kid`, replacing any existing key with that id.
    pub fn insert(&mut self, kid: impl Into<String>, key: VerifyingKey) {
        self.keys.insert(kid.into(), key);
    }

    /// Look up the verifying key for `kid`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownKey` when the id is not in the set.
    pub fn get(&self, kid: &str) -> Result<&VerifyingKey> {
        self.keys
            .get(kid)
            .ok_or_else(|| RegistryError::UnknownKey(kid.to_string()))
    }

    /// Serialize back to a JWKS document, sorted by `kid`.
    pub fn to_jwks(&self) -> serde_json::Value {
        let mut keys: Vec<Jwk> = self
            .keys
            .iter()
            .map(|(kid, key)| Jwk::ed25519(kid.clone(), key))
            .collect();
        keys.sort_by(|a, b| a.kid.cmp(&b.kid));
        serde_json::json!({ "keys": keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
