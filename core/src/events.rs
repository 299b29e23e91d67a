//! Chain event records
//!
//! Plain projections of the staking and group registration events observed
//! on chain. Decoding the chain's own encoding happens before these exist.

use beacon_crypto::CompressedPublicKey;
use serde::{Deserialize, Serialize};

/// A staker joined the staking contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerRegistration {
    pub index: u64,
    pub member_id: CompressedPublicKey,
}

/// A group published its public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRegistration {
    pub group_public_key: Vec<u8>,
    pub request_id: u64,
    pub activation_block_height: u64,
}
