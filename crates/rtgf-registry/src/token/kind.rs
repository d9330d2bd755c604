//! Token types and trust roles.
//!
//! A [`TokenType`] is the discriminator a published token carries; a
//! [`Role`] is the slot a relying party fills in a verification request.
//! The two vocabularies overlap but are not identical: the `rmt` role is
//! satisfied by a regional `RRMT` token (or a plain `RMT`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RegistryError;

/// Token type discriminator. Compared case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenType {
    /// Regulatory mandate token.
    Rmt,
    /// Regional regulatory mandate token.
    Rrmt,
    /// Corridor token.
    Cort,
    /// Payment service role token.
    Psrt,
    /// Interoperability mandate token.
    Imt,
    /// AML screening token.
    Amls,
    /// AML verification token.
    Amlv,
}

impl TokenType {
    /// Every known token type.
    pub const ALL: [TokenType; 7] = [
        Self::Rmt,
        Self::Rrmt,
        Self::Cort,
        Self::Psrt,
        Self::Imt,
        Self::Amls,
        Self::Amlv,
    ];

    /// Return the canonical upper-case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rmt => "RMT",
            Self::Rrmt => "RRMT",
            Self::Cort => "CORT",
            Self::Psrt => "PSRT",
            Self::Imt => "IMT",
            Self::Amls => "AMLS",
            Self::Amlv => "AMLV",
        }
    }

    /// Lower-case key used by the type+slug index.
    pub fn index_key(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Case-insensitive comparison against a raw discriminator.
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(self.as_str())
    }

    /// Guess the type from a `urn:...:token:<TYPE>:...` identifier.
    pub fn detect_from_uri(uri: &str) -> Option<Self> {
        [
            Self::Rrmt,
            Self::Cort,
            Self::Psrt,
            Self::Imt,
            Self::Rmt,
            Self::Amls,
            Self::Amlv,
        ]
        .into_iter()
        .find(|t| uri.contains(&format!(":{}:", t.as_str())))
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.matches(s))
            .ok_or_else(|| RegistryError::InvalidIdentifier(format!("unknown token type: {s}")))
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A slot in a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Rmt,
    Imt,
    Cort,
    Psrt,
    Amls,
    Amlv,
}

impl Role {
    /// Roles every request must fill, in evaluation order.
    pub const MANDATORY: [Role; 4] = [Self::Rmt, Self::Imt, Self::Cort, Self::Psrt];

    /// Roles whose tokens go through type/signature verification, in order.
    /// `imt` is exempt.
    pub const SIGNED: [Role; 3] = [Self::Rmt, Self::Cort, Self::Psrt];

    /// Lower-case role name as used in request fields and reason strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rmt => "rmt",
            Self::Imt => "imt",
            Self::Cort => "cort",
            Self::Psrt => "psrt",
            Self::Amls => "amls",
            Self::Amlv => "amlv",
        }
    }

    /// The token type a payload must declare to fill this role.
    ///
    /// The rmt role is canonically `RRMT`, but [`Role::accepts`] also takes a
    /// plain `RMT` discriminator so payloads issued under the `RMT` URI
    /// spelling verify.
    pub fn canonical_type(&self) -> TokenType {
        match self {
            Self::Rmt => TokenType::Rrmt,
            Self::Imt => TokenType::Imt,
            Self::Cort => TokenType::Cort,
            Self::Psrt => TokenType::Psrt,
            Self::Amls => TokenType::Amls,
            Self::Amlv => TokenType::Amlv,
        }
    }

    /// Whether a raw payload discriminator satisfies this role.
    pub fn accepts(&self, raw_type: &str) -> bool {
        match self {
            Self::Rmt => TokenType::Rrmt.matches(raw_type) || TokenType::Rmt.matches(raw_type),
            other => other.canonical_type().matches(raw_type),
        }
    }

    /// Whether this role takes part in type/signature verification.
    pub fn is_signed(&self) -> bool {
        Self::SIGNED.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
