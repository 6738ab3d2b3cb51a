use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Material used to derive an [`AccountId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountMaterial {
    /// Derived from an ed25519 public key (32 bytes).
    PublicKey([u8; 32]),
    /// Derived from a parent account and a label (e.g. a receiver
    /// instance owned by a protocol account).
    Derived { parent: [u8; 32], label: String },
}

/// Persistent cryptographic identity for a ledger account.
///
/// An `AccountId` is derived deterministically from [`AccountMaterial`]
/// using BLAKE3; the same material always produces the same identity.
/// The all-zero id is reserved: it is never a valid mint recipient or
/// transfer party, and every gate rejects it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    hash: [u8; 32],
}

impl AccountId {
    /// Derive an `AccountId` from account material.
    pub fn derive(material: &AccountMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"evl-account-v1:");
        match material {
            AccountMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            AccountMaterial::Derived { parent, label } => {
                hasher.update(b"derived:");
                hasher.update(parent);
                hasher.update(b":");
                hasher.update(label.as_bytes());
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) account for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&AccountMaterial::PublicKey(bytes))
    }

    /// The reserved zero account.
    pub const fn zero() -> Self {
        Self { hash: [0u8; 32] }
    }

    /// Returns `true` if this is the reserved zero account.
    pub fn is_zero(&self) -> bool {
        self.hash == [0u8; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("ac:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("ac:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }

    /// Create from a raw 32-byte hash. Use `derive()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short_id())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let material = AccountMaterial::PublicKey([42u8; 32]);
        let id1 = AccountId::derive(&material);
        let id2 = AccountId::derive(&material);
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_keys_produce_different_ids() {
        let id1 = AccountId::derive(&AccountMaterial::PublicKey([1; 32]));
        let id2 = AccountId::derive(&AccountMaterial::PublicKey([2; 32]));
        assert_ne!(id1, id2);
    }

    #[test]
    fn derived_identity_includes_label() {
        let parent = [5u8; 32];
        let id1 = AccountId::derive(&AccountMaterial::Derived {
            parent,
            label: "receiver-a".into(),
        });
        let id2 = AccountId::derive(&AccountMaterial::Derived {
            parent,
            label: "receiver-b".into(),
        });
        assert_ne!(id1, id2);
    }

    #[test]
    fn ephemeral_ids_are_unique() {
        let id1 = AccountId::ephemeral();
        let id2 = AccountId::ephemeral();
        assert_ne!(id1, id2);
    }

    #[test]
    fn zero_account_is_zero() {
        assert!(AccountId::zero().is_zero());
        assert!(!AccountId::ephemeral().is_zero());
    }

    #[test]
    fn derived_ids_are_never_zero() {
        // The BLAKE3 image of any material is not the zero hash.
        let id = AccountId::derive(&AccountMaterial::PublicKey([0; 32]));
        assert!(!id.is_zero());
    }

    #[test]
    fn short_id_format() {
        let id = AccountId::derive(&AccountMaterial::PublicKey([0; 32]));
        let short = id.short_id();
        assert!(short.starts_with("ac:"));
        assert_eq!(short.len(), 11); // "ac:" + 8 hex chars
    }

    #[test]
    fn hex_roundtrip() {
        let id = AccountId::derive(&AccountMaterial::PublicKey([99; 32]));
        let hex = id.to_hex();
        let parsed = AccountId::from_hex(&hex).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let id = AccountId::derive(&AccountMaterial::PublicKey([99; 32]));
        let prefixed = format!("ac:{}", id.to_hex());
        let parsed = AccountId::from_hex(&prefixed).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_short_input() {
        let err = AccountId::from_hex("deadbeef").unwrap_err();
        assert!(matches!(err, TypeError::InvalidLength { expected: 32, .. }));
    }

    #[test]
    fn serde_roundtrip() {
        let id = AccountId::derive(&AccountMaterial::PublicKey([10; 32]));
        let json = serde_json::to_string(&id).unwrap();
        let parsed: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
