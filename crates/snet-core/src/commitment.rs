//! Party commitments.
//!
//! Payer and merchant identifiers are free-form strings (node pubkeys,
//! account labels, LNURLs) that routinely exceed the 31-byte short-string
//! limit of the field domain. On-chain receipts therefore carry a
//! *commitment* to each party: a domain-separated SHA-256 of the
//! identifier, folded into a felt. The mapping is deterministic, so the
//! same party always yields the same on-chain value, but it is one-way.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::felt::Felt;

/// Domain separator for party commitments. Changing it changes every
/// on-chain party value, so it is fixed for the life of the deployment.
const PARTY_DOMAIN: &[u8] = b"snet/party/v1";

/// A field-domain commitment to a party identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyCommitment(Felt);

impl PartyCommitment {
    /// Commit to a party identifier. The identifier is trimmed first so
    /// that incidental whitespace does not fork the commitment.
    pub fn of(identifier: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(PARTY_DOMAIN);
        hasher.update(b":");
        hasher.update(identifier.trim().as_bytes());
        Self(Felt::from_hash_bytes(&hasher.finalize()))
    }

    /// The underlying field element, for contract call arguments.
    pub fn as_felt(&self) -> Felt {
        self.0
    }
}

impl std::fmt::Display for PartyCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_is_deterministic() {
        let a = PartyCommitment::of("02abc...node");
        let b = PartyCommitment::of("02abc...node");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_parties_distinct_commitments() {
        assert_ne!(PartyCommitment::of("alice"), PartyCommitment::of("bob"));
    }

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(PartyCommitment::of(" alice "), PartyCommitment::of("alice"));
    }

    #[test]
    fn long_identifiers_are_accepted() {
        let long = "lnurl1".repeat(40);
        let c = PartyCommitment::of(&long);
        assert!(!c.as_felt().is_zero());
    }
}
