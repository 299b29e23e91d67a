//! Ticket verification
//!
//! Recomputes a ticket from its proof and rejects it unless the claimed
//! value matches. Nothing here trusts the submitter and nothing mutates
//! shared state, so pools are verified as a parallel map.

use crate::errors::{SortitionError, SortitionResult};
use crate::ticket::{check_index, ticket_value, Ticket};
use beacon_crypto::CompressedPublicKey;
use rayon::prelude::*;

/// Lookup of registered virtual staker counts
///
/// Implemented by the staking registry. Unknown stakers report 0, so every
/// ticket they claim is out of range.
pub trait StakerDirectory {
    fn virtual_staker_count(&self, staker: &CompressedPublicKey) -> u64;
}

impl<T: StakerDirectory + ?Sized> StakerDirectory for &T {
    fn virtual_staker_count(&self, staker: &CompressedPublicKey) -> u64 {
        (**self).virtual_staker_count(staker)
    }
}

/// Verify a single ticket against the beacon output of its round
///
/// Checks run in order: slot range, key decoding, value.
pub fn verify_ticket(
    ticket: &Ticket,
    beacon_output: &[u8],
    virtual_staker_count: u64,
) -> SortitionResult<()> {
    let proof = &ticket.proof;
    check_index(proof.virtual_staker_index, virtual_staker_count)?;
    proof.staker_public_key.decompress()?;

    let expected = ticket_value(
        beacon_output,
        &proof.staker_public_key,
        proof.virtual_staker_index,
    );
    if expected != ticket.value {
        return Err(SortitionError::ValueMismatch);
    }
    Ok(())
}

/// Verifier bound to one round's beacon output and staker directory
pub struct TicketVerifier<'a, D> {
    beacon_output: &'a [u8],
    directory: D,
}

impl<'a, D: StakerDirectory + Sync> TicketVerifier<'a, D> {
    pub fn new(beacon_output: &'a [u8], directory: D) -> Self {
        Self {
            beacon_output,
            directory,
        }
    }

    pub fn verify(&self, ticket: &Ticket) -> SortitionResult<()> {
        let count = self.directory.virtual_staker_count(ticket.staker());
        verify_ticket(ticket, self.beacon_output, count)
    }

    /// Verify every ticket in parallel; results are in pool order
    pub fn verify_pool(&self, pool: &[Ticket]) -> Vec<SortitionResult<()>> {
        pool.par_iter().map(|ticket| self.verify(ticket)).collect()
    }

    /// Split a pool into accepted tickets and rejections with their reason
    pub fn partition_pool(
        &self,
        pool: Vec<Ticket>,
    ) -> (Vec<Ticket>, Vec<(Ticket, SortitionError)>) {
        let results = self.verify_pool(&pool);

        let mut accepted = Vec::with_capacity(pool.len());
        let mut rejected = Vec::new();
        for (ticket, result) in pool.into_iter().zip(results) {
            match result {
                Ok(()) => accepted.push(ticket),
                Err(reason) => {
                    log::debug!(
                        "Rejected ticket {} from staker {} slot {}: {}",
                        ticket.value,
                        ticket.staker(),
                        ticket.proof.virtual_staker_index,
                        reason
                    );
                    rejected.push((ticket, reason));
                }
            }
        }
        (accepted, rejected)
    }
}
