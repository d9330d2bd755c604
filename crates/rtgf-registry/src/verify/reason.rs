//! Machine-readable rejection reasons.
//!
//! The rendered strings are what relying parties match on. Changing one is
//! a wire break.

use std::fmt;

use crate::token::Role;

/// Why a verification request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// `missing_<role>`: the identifier is absent or blank.
    Missing(Role),
    /// `metadata_missing:<uri>`: the token or its payload cannot be found.
    MetadataMissing(String),
    /// `metadata_invalid:<uri>`: the payload exists but cannot be read or parsed.
    MetadataInvalid(String),
    /// `token_revoked:<uri>`
    TokenRevoked(String),
    /// `token_not_yet_valid:<uri>`
    TokenNotYetValid(String),
    /// `token_expired:<uri>`
    TokenExpired(String),
    /// `invalid_nbf:<uri>`: `nbf` is present but not RFC 3339.
    InvalidNotBefore(String),
    /// `invalid_exp:<uri>`: `exp` is present but not RFC 3339.
    InvalidExpiry(String),
    /// `invalid_<role>`: type or signature verification failed.
    InvalidRole(Role),
    /// `invalid_request`: the request body could not be decoded.
    InvalidRequest,
}

impl Reason {
    /// The token URI the reason refers to, if any.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::MetadataMissing(uri)
            | Self::MetadataInvalid(uri)
            | Self::TokenRevoked(uri)
            | Self::TokenNotYetValid(uri)
            | Self::TokenExpired(uri)
            | Self::InvalidNotBefore(uri)
            | Self::InvalidExpiry(uri) => Some(uri),
            Self::Missing(_) | Self::InvalidRole(_) | Self::InvalidRequest => None,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(role) => write!(f, "missing_{role}"),
            Self::MetadataMissing(uri) => write!(f, "metadata_missing:{uri}"),
            Self::MetadataInvalid(uri) => write!(f, "metadata_invalid:{uri}"),
            Self::TokenRevoked(uri) => write!(f, "token_revoked:{uri}"),
            Self::TokenNotYetValid(uri) => write!(f, "token_not_yet_valid:{uri}"),
            Self::TokenExpired(uri) => write!(f, "token_expired:{uri}"),
            Self::InvalidNotBefore(uri) => write!(f, "invalid_nbf:{uri}"),
            Self::InvalidExpiry(uri) => write!(f, "invalid_exp:{uri}"),
            Self::InvalidRole(role) => write!(f, "invalid_{role}"),
            Self::InvalidRequest => f.write_str("invalid_request"),
        }
    }
}
