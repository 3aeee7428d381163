//! Diagnostics stamping for error instances
//!
//! Every [`PaymentError`](crate::error::PaymentError) carries exactly one
//! [`Diagnostics`] value, created when the error is constructed. The id is the
//! correlation handle shown to support staff and attached to logs and
//! analytics; the timestamp backs the `createdAt` info key.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Info key holding the creation timestamp
pub const CREATED_AT_KEY: &str = "createdAt";

/// Correlation id and creation time of one logical failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    id: String,
    created_at: DateTime<Utc>,
}

impl Diagnostics {
    /// Mint a fresh diagnostics id for a new failure
    pub fn new() -> Self {
        Self::with_id(generate_diagnostics_id())
    }

    /// Stamp with an id that was issued elsewhere (server payload, 3DS SDK)
    ///
    /// An empty id is never accepted; a fresh one is minted instead.
    pub fn with_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = if id.trim().is_empty() {
            generate_diagnostics_id()
        } else {
            id
        };
        Self {
            id,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// RFC 3339 rendering used for the `createdAt` info key
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a new diagnostics id (UUID v4)
pub fn generate_diagnostics_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_ids_are_unique_uuids() {
        let first = Diagnostics::new();
        let second = Diagnostics::new();

        assert_ne!(first.id(), second.id());
        assert!(Uuid::parse_str(first.id()).is_ok());
    }

    #[test]
    fn test_external_id_is_preserved() {
        let diagnostics = Diagnostics::with_id("d-1");
        assert_eq!(diagnostics.id(), "d-1");
    }

    #[test]
    fn test_blank_external_id_is_replaced() {
        let diagnostics = Diagnostics::with_id("  ");
        assert!(Uuid::parse_str(diagnostics.id()).is_ok());
    }

    #[test]
    fn test_created_at_is_rfc3339() {
        let diagnostics = Diagnostics::new();
        let rendered = diagnostics.created_at_rfc3339();
        assert!(DateTime::parse_from_rfc3339(&rendered).is_ok());
    }
}
