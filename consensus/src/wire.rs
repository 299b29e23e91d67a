//! Fixed-layout byte encoding for gossiped tickets
//!
//! ```text
//! | value (32) | compressed staker public key (32) | virtual staker index, LE (8) |
//! ```

use crate::errors::{SortitionError, SortitionResult};
use crate::ticket::{Ticket, TicketProof};
use beacon_crypto::{CompressedPublicKey, HashValue, HASH_LENGTH};

/// Encoded ticket length in bytes
pub const TICKET_WIRE_LENGTH: usize = HASH_LENGTH + CompressedPublicKey::LENGTH + 8;

/// Byte encoding capability
pub trait WireFormat: Sized {
    fn encode(&self) -> Vec<u8>;
    fn decode(bytes: &[u8]) -> SortitionResult<Self>;

    fn encode_hex(&self) -> String {
        hex::encode(self.encode())
    }

    fn decode_hex(encoded: &str) -> SortitionResult<Self> {
        let bytes = hex::decode(encoded.trim().trim_start_matches("0x"))
            .map_err(|e| SortitionError::InvalidEncoding(e.to_string()))?;
        Self::decode(&bytes)
    }
}

impl WireFormat for Ticket {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TICKET_WIRE_LENGTH);
        out.extend_from_slice(&self.value.raw_bytes());
        out.extend_from_slice(self.proof.staker_public_key.as_bytes());
        out.extend_from_slice(&self.proof.virtual_staker_index.to_le_bytes());
        out
    }

    /// Key bytes are carried as-is; decoding them is left to verification
    fn decode(bytes: &[u8]) -> SortitionResult<Self> {
        if bytes.len() != TICKET_WIRE_LENGTH {
            return Err(SortitionError::LengthMismatch {
                expected: TICKET_WIRE_LENGTH,
                actual: bytes.len(),
            });
        }

        let (value, rest) = bytes.split_at(HASH_LENGTH);
        let (key, index) = rest.split_at(CompressedPublicKey::LENGTH);

        let mut index_bytes = [0u8; 8];
        index_bytes.copy_from_slice(index);

        Ok(Ticket {
            value: HashValue::from_bytes(value)?,
            proof: TicketProof {
                staker_public_key: CompressedPublicKey::from_slice(key)?,
                virtual_staker_index: u64::from_le_bytes(index_bytes),
            },
        })
    }
}
