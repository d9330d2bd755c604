//! Ed25519 signature verifier.
//!
//! Verification checks, in order:
//! 1. The token resolves and its payload is a JSON object
//! 2. The payload carries a `proof` naming a known issuer key
//! 3. The proof signature covers the canonical payload
//! 4. The declared type matches the role

use std::sync::Arc;

use crate::crypto::signing::{canonical_bytes, verify_from_base64};
use crate::crypto::KeySet;
use crate::error::Result;
use crate::token::payload::parse_object;
use crate::token::{Proof, Role};

use super::{check_type, require_signed_role, PayloadSource, TrustVerifier};

/// Cryptographic verifier over a [`PayloadSource`] and an issuer key set.
#[derive(Debug, Clone)]
pub struct SignatureVerifier<S> {
    source: S,
    keys: Arc<KeySet>,
}

impl<S: PayloadSource> SignatureVerifier<S> {
    pub fn new(source: S, keys: Arc<KeySet>) -> Self {
        Self { source, keys }
    }
}

impl<S: PayloadSource> TrustVerifier for SignatureVerifier<S> {
    fn resolve_payload(&self, uri: &str) -> Result<Vec<u8>> {
        self.source.payload(uri)
    }

    fn verify_role(&self, role: Role, uri: &str) -> Result<()> {
        require_signed_role(role)?;
        let bytes = self.source.payload(uri)?;
        let object = parse_object(&bytes)?;
        let proof = Proof::from_object(uri, &object)?;
        let key = self.keys.get(&proof.kid)?;
        let message = canonical_bytes(&object)?;
        if let Err(e) = verify_from_base64(key, &message, &proof.sig) {
            log::warn!("signature check failed for {uri} (kid {}): {e}", proof.kid);
            return Err(e);
        }

        check_type(role, uri, &object)
    }
}
