//! Sortition tickets
//!
//! A staker controlling `n` virtual staker slots derives one ticket per slot:
//!
//! ```text
//! value = SHA-256(beacon_output || compressed_public_key || le_u64(virtual_staker_index))
//! ```
//!
//! The derivation is a pure function of its inputs so that any observer can
//! recompute and check a claimed ticket.

use crate::errors::{SortitionError, SortitionResult};
use beacon_crypto::{CompressedPublicKey, HashValue, StakerPublicKey};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// How a ticket value was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketProof {
    pub staker_public_key: CompressedPublicKey,
    pub virtual_staker_index: u64,
}

/// A sortition credential
///
/// Tickets are ordered by value first (lowest wins), then by the proof's
/// public key bytes and virtual staker index. See `selection.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub value: HashValue,
    pub proof: TicketProof,
}

impl Ticket {
    pub fn staker(&self) -> &CompressedPublicKey {
        &self.proof.staker_public_key
    }
}

/// Hash input layout shared by generation and verification
pub(crate) fn ticket_value(
    beacon_output: &[u8],
    staker_public_key: &CompressedPublicKey,
    virtual_staker_index: u64,
) -> HashValue {
    let index = virtual_staker_index.to_le_bytes();
    let parts: [&[u8]; 3] = [beacon_output, staker_public_key.as_bytes(), &index];
    HashValue::sha256_concat(&parts)
}

pub(crate) fn check_index(
    virtual_staker_index: u64,
    virtual_staker_count: u64,
) -> SortitionResult<()> {
    if virtual_staker_index < 1 || virtual_staker_index > virtual_staker_count {
        return Err(SortitionError::IndexOutOfRange {
            index: virtual_staker_index,
            count: virtual_staker_count,
        });
    }
    Ok(())
}

/// Derive the ticket for one virtual staker slot
pub fn calculate_ticket(
    beacon_output: &[u8],
    staker: &StakerPublicKey,
    virtual_staker_index: u64,
    virtual_staker_count: u64,
) -> SortitionResult<Ticket> {
    check_index(virtual_staker_index, virtual_staker_count)?;

    let staker_public_key = staker.compressed();
    Ok(Ticket {
        value: ticket_value(beacon_output, &staker_public_key, virtual_staker_index),
        proof: TicketProof {
            staker_public_key,
            virtual_staker_index,
        },
    })
}

/// Derive tickets for all slots `1..=virtual_staker_count`
///
/// Slots are hashed in parallel; the result is in slot order. The whole set
/// is held in memory, so large stakes should go through
/// `generate_ticket_range` one chunk at a time.
pub fn generate_tickets(
    beacon_output: &[u8],
    staker: &StakerPublicKey,
    virtual_staker_count: u64,
) -> Vec<Ticket> {
    generate_ticket_range(beacon_output, staker, 1..=virtual_staker_count)
}

/// Derive tickets for a contiguous run of slots; index 0 is skipped
pub fn generate_ticket_range(
    beacon_output: &[u8],
    staker: &StakerPublicKey,
    slots: RangeInclusive<u64>,
) -> Vec<Ticket> {
    let staker_public_key = staker.compressed();
    let (first, last) = slots.into_inner();
    (first.max(1)..=last)
        .into_par_iter()
        .map(|virtual_staker_index| Ticket {
            value: ticket_value(beacon_output, &staker_public_key, virtual_staker_index),
            proof: TicketProof {
                staker_public_key,
                virtual_staker_index,
            },
        })
        .collect()
}
