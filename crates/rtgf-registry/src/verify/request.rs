//! Wire types for verification.

use serde::{Deserialize, Serialize};

use crate::token::Role;

use super::Reason;

/// The token identifiers of one bundle, one per role.
///
/// Missing fields decode as empty strings so the pipeline can report
/// `missing_<role>` instead of the request failing to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(default)]
    pub rmt: String,
    #[serde(default)]
    pub imt: String,
    #[serde(default)]
    pub cort: String,
    #[serde(default)]
    pub psrt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amls: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amlv: Option<String>,
}

impl TokenSet {
    /// The identifier supplied for `role`, `""` when absent.
    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Rmt => &self.rmt,
            Role::Imt => &self.imt,
            Role::Cort => &self.cort,
            Role::Psrt => &self.psrt,
            Role::Amls => self.amls.as_deref().unwrap_or(""),
            Role::Amlv => self.amlv.as_deref().unwrap_or(""),
        }
    }
}

/// `{"tokens": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    #[serde(default)]
    pub tokens: TokenSet,
}

impl VerificationRequest {
    /// Request for the four mandatory roles.
    pub fn new(
        rmt: impl Into<String>,
        imt: impl Into<String>,
        cort: impl Into<String>,
        psrt: impl Into<String>,
    ) -> Self {
        Self {
            tokens: TokenSet {
                rmt: rmt.into(),
                imt: imt.into(),
                cort: cort.into(),
                psrt: psrt.into(),
                amls: None,
                amlv: None,
            },
        }
    }
}

/// Outcome of a verification. `reason` is empty exactly when `valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationVerdict {
    pub valid: bool,
    pub rev_epoch: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl VerificationVerdict {
    pub fn accepted(rev_epoch: u64) -> Self {
        Self {
            valid: true,
            rev_epoch,
            reason: String::new(),
        }
    }

    pub fn rejected(reason: &Reason, rev_epoch: u64) -> Self {
        Self {
            valid: false,
            rev_epoch,
            reason: reason.to_string(),
        }
    }
}
