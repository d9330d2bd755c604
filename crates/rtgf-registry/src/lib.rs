//! RTGF registry: trust-registry index and token-bundle verification.
//!
//! Publishes regulatory, corridor, and participant tokens (RMT/RRMT, IMT,
//! CORT, PSRT, AMLS, AMLV) through an immutable dual-keyed index, verifies
//! token bundles through an ordered check pipeline behind a pluggable
//! trust verifier, and maintains a global revocation epoch that relying
//! parties use to invalidate cached verdicts.

pub mod catalog;
pub mod config;
pub mod content;
pub mod crypto;
pub mod epoch;
pub mod error;
pub mod index;
pub mod manifest;
pub mod registry;
pub mod service;
pub mod time;
pub mod token;
pub mod trust;
pub mod verify;

// Re-export primary types
pub use error::{RegistryError, Result};
pub use index::RegistryIndex;
pub use token::{Role, TokenEntry, TokenPayload, TokenType};

pub use epoch::RevocationEpoch;
pub use registry::{Registry, RegistrySnapshot};
pub use trust::{PayloadSource, SignatureVerifier, StructuralVerifier, TrustVerifier, VerifierMode};
pub use verify::{Reason, TokenSet, VerificationPipeline, VerificationRequest, VerificationVerdict};

pub use catalog::{Catalog, CatalogSettings, Corridor};
pub use config::{RegistryConfig, VerifierKind};
pub use content::{ContentStore, DirContentStore, MemoryContentStore};
pub use crypto::{Ed25519KeyPair, Jwk, KeySet};
pub use manifest::Manifest;
pub use service::VerificationService;
