//! Cryptographic primitives for the registry.
//!
//! This module provides:
//! - Ed25519 key pairs and JWKS issuer key sets
//! - Canonical payload signing and signature verification

pub mod keys;
pub mod signing;

pub use keys::{Ed25519KeyPair, Jwk, KeySet};
