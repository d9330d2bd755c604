//! Trust verification: the pluggable seam between the pipeline and
//! whatever decides a token is authentic.
//!
//! The pipeline only ever talks to [`TrustVerifier`]. Two implementations
//! ship:
//! - [`StructuralVerifier`] checks the payload's type discriminator
//!   against the role, no cryptography.
//! - [`SignatureVerifier`] checks a detached Ed25519 proof against an
//!   issuer [`KeySet`](crate::crypto::KeySet), then the discriminator.
//!
//! Both read payloads through a [`PayloadSource`], normally a pinned
//! [`RegistrySnapshot`](crate::registry::RegistrySnapshot).

pub mod signature;
pub mod structural;

use std::sync::Arc;

pub use signature::SignatureVerifier;
pub use structural::StructuralVerifier;

use crate::crypto::KeySet;
use crate::error::{RegistryError, Result};
use serde_json::{Map, Value};

use crate::token::{declared_type, Role};

/// Resolves a token URI to its raw payload bytes.
pub trait PayloadSource: Send + Sync {
    /// # Errors
    ///
    /// `RegistryError::NotFound` for an unknown URI or missing content;
    /// any other error means the content exists but cannot be read.
    fn payload(&self, uri: &str) -> Result<Vec<u8>>;
}

impl<T: PayloadSource + ?Sized> PayloadSource for Arc<T> {
    fn payload(&self, uri: &str) -> Result<Vec<u8>> {
        (**self).payload(uri)
    }
}

/// The capability the verification pipeline depends on.
pub trait TrustVerifier: Send + Sync {
    /// Fetch the raw payload for `uri`.
    ///
    /// # Errors
    ///
    /// `RegistryError::NotFound` when the token is unknown or has no
    /// content; any other error when the content is unreadable.
    fn resolve_payload(&self, uri: &str) -> Result<Vec<u8>>;

    /// Confirm that `uri` is an authentic token for `role`.
    ///
    /// Only `rmt`, `cort`, and `psrt` are verified. An unknown URI is a
    /// verification failure like any other.
    fn verify_role(&self, role: Role, uri: &str) -> Result<()>;
}

/// Which verifier to compose at startup.
#[derive(Debug, Clone)]
pub enum VerifierMode {
    Structural,
    Ed25519(Arc<KeySet>),
}

impl VerifierMode {
    /// Bind the selected verifier to a payload source.
    pub fn bind<S>(&self, source: S) -> Box<dyn TrustVerifier>
    where
        S: PayloadSource + 'static,
    {
        match self {
            Self::Structural => Box::new(StructuralVerifier::new(source)),
            Self::Ed25519(keys) => Box::new(SignatureVerifier::new(source, Arc::clone(keys))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Ed25519(_) => "ed25519",
        }
    }
}

/// Reject roles that are not subject to type/signature verification.
pub(crate) fn require_signed_role(role: Role) -> Result<()> {
    if role.is_signed() {
        Ok(())
    } else {
        Err(RegistryError::UnsignedRole(role.as_str().to_string()))
    }
}

/// Compare the payload's discriminator to the role, case-insensitively.
/// A missing or non-string `type` never matches.
pub(crate) fn check_type(role: Role, uri: &str, payload: &Map<String, Value>) -> Result<()> {
    let declared = declared_type(payload);
    if role.accepts(declared) {
        Ok(())
    } else {
        Err(RegistryError::InvalidTypeDiscriminator {
            uri: uri.to_string(),
            expected: role.canonical_type().to_string(),
            actual: declared.to_string(),
        })
    }
}
