//! Sortition error types
//!
//! Every rejection of adversarial or malformed input is one of these
//! variants, returned as a value. Only `InvalidArgument` signals a caller bug.

use beacon_crypto::CryptoError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortitionError {
    /// Byte sequence has the wrong length for the type it encodes
    #[error("Length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Virtual staker index outside `[1, count]`
    #[error("Virtual staker index {index} out of range [1, {count}]")]
    IndexOutOfRange { index: u64, count: u64 },

    /// Encoded ticket is not valid hex
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Claimed ticket value differs from the recomputed one
    #[error("Ticket value does not match its proof")]
    ValueMismatch,

    /// Proof carries a public key that is not a curve point
    #[error("Malformed staker public key")]
    MalformedPublicKey,

    /// Caller violated a precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<CryptoError> for SortitionError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::LengthMismatch { expected, actual } => {
                SortitionError::LengthMismatch { expected, actual }
            }
            CryptoError::MalformedPublicKey => SortitionError::MalformedPublicKey,
            CryptoError::InvalidHex(message) => SortitionError::InvalidEncoding(message),
            other => SortitionError::InvalidArgument(other.to_string()),
        }
    }
}

/// Type alias for sortition results
pub type SortitionResult<T> = Result<T, SortitionError>;
