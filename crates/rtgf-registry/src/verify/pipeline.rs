//! The verification pipeline.
//!
//! Stages, each short-circuiting:
//!
//! 1. Presence of `rmt`, `imt`, `cort`, `psrt`, in that order.
//! 2. Per token, in role order: resolve the payload, parse it, then check
//!    revocation, `nbf` and `exp` (both bounds inclusive).
//! 3. Type/signature verification of `rmt`, `cort`, `psrt`.
//!
//! The pipeline holds no state of its own. The clock is an argument, so a
//! verdict depends only on the request, `now`, the pinned verifier, and
//! the epoch value read at the end.

use chrono::{DateTime, Utc};

use crate::epoch::RevocationEpoch;
use crate::token::{Role, TokenPayload};
use crate::trust::TrustVerifier;

use super::{Reason, TokenSet, VerificationRequest, VerificationVerdict};

type Check = std::result::Result<(), Reason>;

/// Ordered chain of checks over one request.
pub struct VerificationPipeline<'a> {
    verifier: &'a dyn TrustVerifier,
    epoch: &'a RevocationEpoch,
}

impl<'a> VerificationPipeline<'a> {
    pub fn new(verifier: &'a dyn TrustVerifier, epoch: &'a RevocationEpoch) -> Self {
        Self { verifier, epoch }
    }

    /// Evaluate `request` at `now`. Never fails: every rejection is folded
    /// into the verdict's reason.
    pub fn verify(&self, request: &VerificationRequest, now: DateTime<Utc>) -> VerificationVerdict {
        let outcome = self.evaluate(request, now);
        let rev_epoch = self.epoch.read();
        match outcome {
            Ok(()) => {
                log::debug!("verification accepted at epoch {rev_epoch}");
                VerificationVerdict::accepted(rev_epoch)
            }
            Err(reason) => {
                log::debug!("verification rejected: {reason}");
                VerificationVerdict::rejected(&reason, rev_epoch)
            }
        }
    }

    /// Run the checks and return the first failure.
    pub fn evaluate(&self, request: &VerificationRequest, now: DateTime<Utc>) -> Check {
        let tokens = &request.tokens;
        check_presence(tokens)?;
        for role in Role::MANDATORY {
            self.check_metadata(tokens.get(role), now)?;
        }
        for role in Role::SIGNED {
            self.check_role(role, tokens.get(role))?;
        }
        Ok(())
    }

    fn check_metadata(&self, uri: &str, now: DateTime<Utc>) -> Check {
        let payload = self.resolve(uri)?;
        check_revoked(uri, &payload)?;
        check_not_before(uri, &payload, now)?;
        check_expiry(uri, &payload, now)
    }

    fn resolve(&self, uri: &str) -> std::result::Result<TokenPayload, Reason> {
        let bytes = match self.verifier.resolve_payload(uri) {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => return Err(Reason::MetadataMissing(uri.to_string())),
            Err(e) if e.is_not_found() => return Err(Reason::MetadataMissing(uri.to_string())),
            Err(e) => {
                log::debug!("payload for {uri} unreadable: {e}");
                return Err(Reason::MetadataInvalid(uri.to_string()));
            }
        };
        TokenPayload::parse(&bytes).map_err(|e| {
            log::debug!("payload for {uri} unparseable: {e}");
            Reason::MetadataInvalid(uri.to_string())
        })
    }

    fn check_role(&self, role: Role, uri: &str) -> Check {
        self.verifier.verify_role(role, uri).map_err(|e| {
            log::debug!("{role} token {uri} failed verification: {e}");
            Reason::InvalidRole(role)
        })
    }
}

fn check_presence(tokens: &TokenSet) -> Check {
    match Role::MANDATORY
        .into_iter()
        .find(|&role| tokens.get(role).trim().is_empty())
    {
        Some(role) => Err(Reason::Missing(role)),
        None => Ok(()),
    }
}

fn check_revoked(uri: &str, payload: &TokenPayload) -> Check {
    if payload.is_revoked() {
        return Err(Reason::TokenRevoked(uri.to_string()));
    }
    Ok(())
}

fn check_not_before(uri: &str, payload: &TokenPayload, now: DateTime<Utc>) -> Check {
    match payload.not_before() {
        Ok(Some(nbf)) if now < nbf => Err(Reason::TokenNotYetValid(uri.to_string())),
        Ok(_) => Ok(()),
        Err(_) => Err(Reason::InvalidNotBefore(uri.to_string())),
    }
}

fn check_expiry(uri: &str, payload: &TokenPayload, now: DateTime<Utc>) -> Check {
    match payload.expires_at() {
        Ok(Some(exp)) if now > exp => Err(Reason::TokenExpired(uri.to_string())),
        Ok(_) => Ok(()),
        Err(_) => Err(Reason::InvalidExpiry(uri.to_string())),
    }
}
