//! Ed25519 signing and verification of token payloads.
//!
//! A signed payload carries `proof: {kid, sig}`. The signature covers the
//! canonical JSON of the payload with `proof` removed: object keys sorted
//! recursively, no insignificant whitespace.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde_json::{Map, Value};

use crate::error::{RegistryError, Result};

/// Field name of the detached proof inside a payload.
pub const PROOF_FIELD: &str = "proof";

/// Sign a message with an Ed25519 signing key.
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

/// Verify an Ed25519 signature against a public key and message.
pub fn verify(verifying_key: &VerifyingKey, message: &[u8], signature: &Signature) -> Result<()> {
    verifying_key
        .verify(message, signature)
        .map_err(|_| RegistryError::SignatureInvalid)
}

/// Sign a message and return the signature as a base64-encoded string.
pub fn sign_to_base64(signing_key: &SigningKey, message: &[u8]) -> String {
    STANDARD.encode(sign(signing_key, message).to_bytes())
}

/// Verify a base64-encoded signature.
pub fn verify_from_base64(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature_b64: &str,
) -> Result<()> {
    let sig_bytes = STANDARD
        .decode(signature_b64)
        .map_err(|e| RegistryError::InvalidKey(format!("invalid base64 signature: {e}")))?;

    let sig_array: [u8; 64] = sig_bytes
        .try_into()
        .map_err(|_| RegistryError::InvalidKey("signature must be 64 bytes".into()))?;

    verify(verifying_key, message, &Signature::from_bytes(&sig_array))
}

/// Canonical signing input for a payload object: `proof` removed, keys
/// sorted at every level, compact encoding.
pub fn canonical_bytes(payload: &Map<String, Value>) -> Result<Vec<u8>> {
    let mut unsigned = payload.clone();
    unsigned.remove(PROOF_FIELD);
    serde_json::to_vec(&canonicalize(Value::Object(unsigned)))
        .map_err(|e| RegistryError::SerializationError(e.to_string()))
}

/// Attach a `proof` to `payload`, signing its canonical form with `kid`'s key.
pub fn seal_payload(
    signing_key: &SigningKey,
    kid: &str,
    payload: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let message = canonical_bytes(payload)?;
    let mut sealed = payload.clone();
    sealed.insert(
        PROOF_FIELD.to_string(),
        serde_json::json!({ "kid": kid, "sig": sign_to_base64(signing_key, &message) }),
    );
    Ok(sealed)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
