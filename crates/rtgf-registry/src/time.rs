//! Time utilities for the registry.
//!
//! All timestamps are RFC 3339 strings on the wire and `DateTime<Utc>` in
//! memory. Nothing in the verification path reads the wall clock; callers
//! obtain `now` here (or from a configured override) and pass it in.

use chrono::{DateTime, Utc};

use crate::error::{RegistryError, Result};

/// Return the current wall-clock time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Return `fixed` when set, otherwise the current wall-clock time.
pub fn now_or(fixed: Option<DateTime<Utc>>) -> DateTime<Utc> {
    fixed.unwrap_or_else(now_utc)
}

/// Parse an RFC 3339 timestamp with any offset and normalise it to UTC.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RegistryError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Format a timestamp as RFC 3339 with a `Z` suffix and whole seconds.
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

/// Serde adapter for optional RFC 3339 fields where the empty string means
/// "absent", matching the fixture format published by the registry.
pub mod optional_rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::to_rfc3339(dt)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_rfc3339(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
