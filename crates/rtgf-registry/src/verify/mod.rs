//! Token-bundle verification.
//!
//! A [`VerificationRequest`] names one token per role. The
//! [`VerificationPipeline`] runs an ordered, short-circuiting chain of
//! checks over it and always answers with a [`VerificationVerdict`]; the
//! first failing check decides the verdict's [`Reason`].

pub mod pipeline;
pub mod reason;
pub mod request;

pub use pipeline::VerificationPipeline;
pub use reason::Reason;
pub use request::{TokenSet, VerificationRequest, VerificationVerdict};
