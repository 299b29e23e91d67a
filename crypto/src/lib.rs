//! Beacon Relay Cryptography
//!
//! Hash values and staker identities shared by the selection core

use thiserror::Error;

pub mod hash;
pub mod keys;

pub use hash::{HashValue, HASH_LENGTH};
pub use keys::{CompressedPublicKey, KeyPair, StakerPublicKey};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Malformed public key")]
    MalformedPublicKey,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
