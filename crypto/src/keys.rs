//! Staker identities
//!
//! A staker is identified by an ed25519 public key. Inside ticket proofs the
//! key travels in its 32-byte compressed Edwards-Y form; that form is only
//! decoded when a proof is verified.

use crate::CryptoError;
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw compressed public key bytes as carried in a ticket proof
///
/// Not validated on construction; see [`CompressedPublicKey::decompress`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressedPublicKey([u8; PUBLIC_KEY_LENGTH]);

impl CompressedPublicKey {
    pub const LENGTH: usize = PUBLIC_KEY_LENGTH;

    pub fn from_raw(raw: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(raw)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; PUBLIC_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::LengthMismatch {
                    expected: PUBLIC_KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(raw))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim().trim_start_matches("0x"))
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode into a curve point
    pub fn decompress(&self) -> Result<StakerPublicKey, CryptoError> {
        VerifyingKey::from_bytes(&self.0)
            .map(StakerPublicKey)
            .map_err(|_| CryptoError::MalformedPublicKey)
    }
}

impl fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedPublicKey({})", self.to_hex())
    }
}

impl Serialize for CompressedPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CompressedPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_hex(&encoded).map_err(serde::de::Error::custom)
    }
}

/// A decoded staker public key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakerPublicKey(VerifyingKey);

impl StakerPublicKey {
    /// Compressed encoding used as hashing input and in ticket proofs
    pub fn compressed(&self) -> CompressedPublicKey {
        CompressedPublicKey(self.0.to_bytes())
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for StakerPublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

/// Staker key pair held by the operator
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate new random keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte secret
    pub fn from_secret(secret: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    /// Create keypair from private key hex
    pub fn from_private_key_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let secret: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_secret(secret))
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> StakerPublicKey {
        StakerPublicKey(self.signing_key.verifying_key())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().compressed())
            .finish_non_exhaustive()
    }
}
