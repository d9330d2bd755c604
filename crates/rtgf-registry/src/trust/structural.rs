//! Structural stand-in verifier.
//!
//! Confirms that a token exists and that its payload declares the type the
//! role expects. It performs no cryptography and is meant to be replaced by
//! [`SignatureVerifier`](super::SignatureVerifier) where issuer keys exist.

use crate::error::Result;
use crate::token::payload::parse_object;
use crate::token::Role;

use super::{check_type, require_signed_role, PayloadSource, TrustVerifier};

/// Type-discriminator verifier over a [`PayloadSource`].
#[derive(Debug, Clone)]
pub struct StructuralVerifier<S> {
    source: S,
}

impl<S: PayloadSource> StructuralVerifier<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: PayloadSource> TrustVerifier for StructuralVerifier<S> {
    fn resolve_payload(&self, uri: &str) -> Result<Vec<u8>> {
        self.source.payload(uri)
    }

    fn verify_role(&self, role: Role, uri: &str) -> Result<()> {
        require_signed_role(role)?;
        let bytes = self.source.payload(uri)?;
        let payload = parse_object(&bytes)?;
        check_type(role, uri, &payload)
    }
}
