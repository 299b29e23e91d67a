//! Responder group selection for relay requests

use beacon_crypto::HashValue;
use num_bigint::BigUint;

/// Index of the group that answers the next relay request
///
/// `previous_entry mod number_of_groups`, or 0 when no group is registered.
pub fn next_group_index(previous_entry: &BigUint, number_of_groups: usize) -> usize {
    if number_of_groups == 0 {
        return 0;
    }

    let remainder = previous_entry % BigUint::from(number_of_groups);
    // remainder < number_of_groups, so it fits in a single digit
    remainder.to_u64_digits().first().copied().unwrap_or(0) as usize
}

/// Same rule applied to a beacon output read as a big-endian integer
pub fn next_group_index_for_entry(previous_entry: &HashValue, number_of_groups: usize) -> usize {
    next_group_index(&previous_entry.to_big_uint(), number_of_groups)
}
