//! Group selection: lowest tickets win
//!
//! Tickets are ranked by a strict total order so that every observer sorts
//! a pool identically:
//!
//! 1. ticket value, ascending (big-endian integer order)
//! 2. compressed staker public key bytes
//! 3. virtual staker index
//!
//! Keys 2 and 3 only matter for byte-identical values. Two tickets that
//! agree on all three keys are the same ticket.

use crate::errors::{SortitionError, SortitionResult};
use crate::ticket::Ticket;
use beacon_crypto::CompressedPublicKey;
use std::cmp::Ordering;

impl Ord for Ticket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| {
                self.proof
                    .staker_public_key
                    .cmp(&other.proof.staker_public_key)
            })
            .then_with(|| {
                self.proof
                    .virtual_staker_index
                    .cmp(&other.proof.virtual_staker_index)
            })
    }
}

impl PartialOrd for Ticket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the `group_size` lowest tickets, in ascending order
///
/// Returns the whole sorted pool when it holds fewer than `group_size`
/// tickets. A staker may appear once per winning slot.
pub fn select_group(mut pool: Vec<Ticket>, group_size: usize) -> SortitionResult<Vec<Ticket>> {
    if group_size == 0 {
        return Err(SortitionError::InvalidArgument(
            "group size must be greater than zero".to_string(),
        ));
    }

    if pool.len() > group_size {
        pool.select_nth_unstable(group_size - 1);
        pool.truncate(group_size);
    }
    pool.sort_unstable();
    Ok(pool)
}

/// Member list of a selected group, in rank order
pub fn selected_members(selected: &[Ticket]) -> Vec<CompressedPublicKey> {
    selected.iter().map(|ticket| *ticket.staker()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{generate_tickets, TicketProof};
    use beacon_crypto::{HashValue, KeyPair};

    fn ticket(value_tail: u8, key_byte: u8, index: u64) -> Ticket {
        let mut raw = [0u8; 32];
        raw[31] = value_tail;
        Ticket {
            value: HashValue::from(raw),
            proof: TicketProof {
                staker_public_key: CompressedPublicKey::from_raw([key_byte; 32]),
                virtual_staker_index: index,
            },
        }
    }

    #[test]
    fn test_lowest_tickets_win() {
        let pool = vec![
            ticket(9, 1, 1),
            ticket(3, 2, 1),
            ticket(7, 3, 1),
            ticket(1, 4, 1),
            ticket(5, 5, 1),
        ];
        let selected = select_group(pool, 3).unwrap();
        let values: Vec<u8> = selected.iter().map(|t| t.value.raw_bytes()[31]).collect();
        assert_eq!(values, vec![1, 3, 5]);
    }

    #[test]
    fn test_small_pool_returned_sorted() {
        let pool = vec![ticket(4, 1, 1), ticket(2, 1, 2)];
        let selected = select_group(pool, 5).unwrap();
        assert_eq!(selected, vec![ticket(2, 1, 2), ticket(4, 1, 1)]);
    }

    #[test]
    fn test_empty_pool() {
        assert!(select_group(Vec::new(), 4).unwrap().is_empty());
    }

    #[test]
    fn test_zero_group_size_rejected() {
        assert!(matches!(
            select_group(vec![ticket(1, 1, 1)], 0),
            Err(SortitionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_equal_values_break_ties_on_proof() {
        let a = ticket(5, 1, 2);
        let b = ticket(5, 2, 1);
        let c = ticket(5, 1, 1);
        assert!(c < a);
        assert!(a < b);
        assert_eq!(a.cmp(&a), Ordering::Equal);

        let forward = select_group(vec![a, b, c], 2).unwrap();
        let reverse = select_group(vec![c, b, a], 2).unwrap();
        assert_eq!(forward, vec![c, a]);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_selection_independent_of_pool_order() {
        let staker_a = KeyPair::from_secret([1u8; 32]).public_key();
        let staker_b = KeyPair::from_secret([2u8; 32]).public_key();
        let mut pool = generate_tickets(b"entry", &staker_a, 6);
        pool.extend(generate_tickets(b"entry", &staker_b, 6));

        let mut reversed = pool.clone();
        reversed.reverse();

        let selected = select_group(pool.clone(), 5).unwrap();
        assert_eq!(selected, select_group(reversed, 5).unwrap());
        assert_eq!(selected.len(), 5);

        let worst_selected = selected.last().unwrap();
        for t in pool.iter().filter(|t| !selected.contains(*t)) {
            assert!(worst_selected.value <= t.value);
        }
    }

    #[test]
    fn test_members_repeat_for_multiple_slots() {
        let selected = vec![ticket(1, 7, 1), ticket(2, 8, 1), ticket(3, 7, 2)];
        let members = selected_members(&selected);
        assert_eq!(
            members,
            vec![
                CompressedPublicKey::from_raw([7; 32]),
                CompressedPublicKey::from_raw([8; 32]),
                CompressedPublicKey::from_raw([7; 32]),
            ]
        );
    }
}
