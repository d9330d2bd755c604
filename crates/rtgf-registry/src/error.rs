//! Error types for the RTGF registry.
//!
//! Registry, content-store, and verifier failures are strongly typed and
//! propagated without panicking. Verification failures that a relying party
//! sees are not errors: the pipeline folds them into a [`Reason`] on the
//! verdict instead.
//!
//! [`Reason`]: crate::verify::Reason

/// Registry error types covering index construction, lookups, content
/// resolution, and trust verification.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid token identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Registry index has no entries")]
    EmptyIndex,

    #[error("Duplicate token uri: {0}")]
    DuplicateUri(String),

    #[error("Duplicate slug {slug:?} for token type {token_type}")]
    DuplicateSlug { token_type: String, slug: String },

    #[error("Token {uri} has nbf after exp")]
    InvalidWindow { uri: String },

    #[error("Token {uri} has unexpected type {actual:?} (want {expected})")]
    InvalidTypeDiscriminator {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("Role {0} does not carry a signed token")]
    UnsignedRole(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Token {0} carries no proof")]
    MissingProof(String),

    #[error("Unknown key id: {0}")]
    UnknownKey(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Payload unreadable for {uri}: {reason}")]
    Unreadable { uri: String, reason: String },

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Return `true` for the "unknown identifier" class of failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
