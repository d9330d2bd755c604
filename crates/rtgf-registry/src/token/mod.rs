//! Published token entries, payload views, types and roles.

pub mod entry;
pub mod kind;
pub mod payload;

pub use entry::TokenEntry;
pub use kind::{Role, TokenType};
pub use payload::{declared_type, Proof, TokenPayload};
