//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers in the receipt stack. These prevent
//! accidental identifier confusion — you cannot pass an `InvoiceId` where a
//! `ReceiptId` is expected, so a receipt can never be attached to the wrong
//! record by a transposed argument.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a payment intent (merchant invoice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub Uuid);

/// Unique identifier for a minted (or minting) payment receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId(pub Uuid);

/// Unique identifier for a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationId(pub Uuid);

impl InvoiceId {
    /// Generate a new random invoice identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl ReceiptId {
    /// Generate a new random receipt identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl VerificationId {
    /// Generate a new random verification identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvoiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for VerificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invoice:{}", self.0)
    }
}

impl std::fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "receipt:{}", self.0)
    }
}

impl std::fmt::Display for VerificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "verify:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct() {
        assert_ne!(InvoiceId::new().0, InvoiceId::new().0);
    }

    #[test]
    fn display_is_prefixed() {
        let id = ReceiptId::new();
        assert!(id.to_string().starts_with("receipt:"));
    }

    #[test]
    fn serde_roundtrip() {
        let id = InvoiceId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: InvoiceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
