//! Structural views of a token payload.
//!
//! Payloads are owned by the content store; the registry only reads the
//! handful of fields it needs and ignores the rest. The pipeline's metadata
//! stage decodes `nbf`, `exp` and `revoked` only. `type` and `proof` are
//! read separately, by the trust verifiers, so a malformed discriminator or
//! proof never affects the metadata checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RegistryError, Result};
use crate::time::parse_rfc3339;

/// Field name of the type discriminator inside a payload.
pub const TYPE_FIELD: &str = "type";

/// Detached Ed25519 proof carried inside a signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Key id resolved against the issuer key set.
    pub kid: String,
    /// Base64 signature over the canonical payload without `proof`.
    pub sig: String,
}

impl Proof {
    /// Decode the proof carried by the payload of `uri`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::MissingProof` when `proof` is absent or is not
    /// a `{kid, sig}` object.
    pub fn from_object(uri: &str, object: &Map<String, Value>) -> Result<Self> {
        let raw = object
            .get(crate::crypto::signing::PROOF_FIELD)
            .ok_or_else(|| RegistryError::MissingProof(uri.to_string()))?;
        serde_json::from_value(raw.clone()).map_err(|e| {
            log::debug!("malformed proof on {uri}: {e}");
            RegistryError::MissingProof(uri.to_string())
        })
    }
}

/// Validity window and revocation flag of a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub nbf: Option<String>,
    #[serde(default)]
    pub exp: Option<String>,
    #[serde(default)]
    pub revoked: Option<bool>,
}

impl TokenPayload {
    /// Parse raw payload bytes. The payload must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` if the bytes are not a JSON
    /// object or `nbf`, `exp` or `revoked` has the wrong shape.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let object = parse_object(bytes)?;
        serde_json::from_value(Value::Object(object))
            .map_err(|e| RegistryError::InvalidFileFormat(format!("token payload: {e}")))
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.unwrap_or(false)
    }

    /// Parsed `nbf`. Absent or empty means unbounded.
    pub fn not_before(&self) -> Result<Option<DateTime<Utc>>> {
        parse_bound(self.nbf.as_deref())
    }

    /// Parsed `exp`. Absent or empty means unbounded.
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>> {
        parse_bound(self.exp.as_deref())
    }
}

/// The declared type discriminator, or `""` when absent or not a string.
pub fn declared_type(object: &Map<String, Value>) -> &str {
    object
        .get(TYPE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Parse bytes into a JSON object map.
pub(crate) fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RegistryError::InvalidFileFormat(
            "token payload is not a JSON object".into(),
        )),
        Err(e) => Err(RegistryError::InvalidFileFormat(format!(
            "token payload: {e}"
        ))),
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_rfc3339(s).map(Some),
    }
}
