//! Published registry catalog.
//!
//! The catalog tells relying parties which snapshot the registry is
//! serving, where each issuer's keys live, and which token types each
//! corridor requires.

use serde::{Deserialize, Serialize};

use crate::token::{Role, TokenType};

/// Issuer used when none is configured.
pub const DEFAULT_ISSUER: &str = "did:org:rtgf.eu";

/// Path of the key set relative to the registry's base URL.
pub const JWKS_PATH: &str = "/jwks.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub iss: String,
    pub jwks: String,
}

/// A payment corridor and the token types a bundle on it must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corridor {
    pub id: String,
    pub required_tokens: Vec<TokenType>,
}

impl Corridor {
    pub fn new(id: impl Into<String>, required_tokens: Vec<TokenType>) -> Self {
        Self {
            id: id.into(),
            required_tokens,
        }
    }

    /// Request roles filled by the required token types, in request order.
    pub fn required_roles(&self) -> Vec<Role> {
        [
            Role::Rmt,
            Role::Imt,
            Role::Cort,
            Role::Psrt,
            Role::Amls,
            Role::Amlv,
        ]
        .into_iter()
        .filter(|role| self.required_tokens.iter().any(|t| role.accepts(t.as_str())))
        .collect()
    }
}

/// Issuer and corridor settings the catalog is published from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub issuer: String,
    pub corridors: Vec<Corridor>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.into(),
            corridors: vec![Corridor::new(
                "EU:THA:CRAFT-01",
                vec![TokenType::Rmt, TokenType::Imt, TokenType::Cort, TokenType::Psrt],
            )],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub registry_snapshot_id: String,
    pub issuers: Vec<Issuer>,
    pub corridors: Vec<Corridor>,
}

impl Catalog {
    /// Publish `settings` against the snapshot `snapshot_id`.
    pub fn publish(snapshot_id: &str, settings: &CatalogSettings, base_url: Option<&str>) -> Self {
        Self {
            registry_snapshot_id: snapshot_id.to_string(),
            issuers: vec![Issuer {
                iss: settings.issuer.clone(),
                jwks: jwks_url(base_url),
            }],
            corridors: settings.corridors.clone(),
        }
    }

    pub fn corridor(&self, id: &str) -> Option<&Corridor> {
        self.corridors.iter().find(|c| c.id == id)
    }
}

/// Absolute JWKS URL when a base URL is known, otherwise the bare path.
pub fn jwks_url(base_url: Option<&str>) -> String {
    match base_url.map(|u| u.trim().trim_end_matches('/')) {
        Some(base) if !base.is_empty() => format!("{base}{JWKS_PATH}"),
        _ => JWKS_PATH.to_string(),
    }
}
