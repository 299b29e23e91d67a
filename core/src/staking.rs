//! Staking registry: who may submit tickets, and how many

use crate::config::NodeConfig;
use crate::events::StakerRegistration;
use beacon_consensus::{SortitionError, StakerDirectory};
use beacon_crypto::CompressedPublicKey;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakerRecord {
    pub index: u64,
    pub stake: u64,
}

pub struct StakingRegistry {
    minimum_stake: u64,
    stakers: HashMap<CompressedPublicKey, StakerRecord>,
}

impl StakingRegistry {
    pub fn new(minimum_stake: u64) -> Result<Self, SortitionError> {
        if minimum_stake == 0 {
            return Err(SortitionError::InvalidArgument(
                "minimum stake must be greater than zero".to_string(),
            ));
        }
        Ok(StakingRegistry {
            minimum_stake,
            stakers: HashMap::new(),
        })
    }

    /// Registry seeded from the `[[stakers]]` section
    pub fn from_config(config: &NodeConfig) -> Result<Self, SortitionError> {
        let mut registry = Self::new(config.relay.minimum_stake)?;
        for (registration, stake) in config.staker_registrations() {
            registry.register(&registration, stake);
        }
        Ok(registry)
    }

    /// Record a staker; a repeated registration replaces the previous stake
    pub fn register(&mut self, registration: &StakerRegistration, stake: u64) {
        let record = StakerRecord {
            index: registration.index,
            stake,
        };
        if self.stakers.insert(registration.member_id, record).is_some() {
            log::debug!("Updated stake for {} to {}", registration.member_id, stake);
        }
    }

    pub fn update_stake(&mut self, member_id: &CompressedPublicKey, stake: u64) -> bool {
        match self.stakers.get_mut(member_id) {
            Some(record) => {
                record.stake = stake;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, member_id: &CompressedPublicKey) -> Option<StakerRecord> {
        self.stakers.remove(member_id)
    }

    pub fn get(&self, member_id: &CompressedPublicKey) -> Option<&StakerRecord> {
        self.stakers.get(member_id)
    }

    pub fn minimum_stake(&self) -> u64 {
        self.minimum_stake
    }

    /// Slots owned by a stake amount
    pub fn slots_for_stake(&self, stake: u64) -> u64 {
        stake / self.minimum_stake
    }

    pub fn is_eligible(&self, member_id: &CompressedPublicKey) -> bool {
        self.virtual_staker_count(member_id) > 0
    }

    pub fn count(&self) -> usize {
        self.stakers.len()
    }

    pub fn eligible_count(&self) -> usize {
        self.stakers
            .values()
            .filter(|record| record.stake >= self.minimum_stake)
            .count()
    }

    pub fn total_virtual_stakers(&self) -> u64 {
        self.stakers
            .values()
            .map(|record| self.slots_for_stake(record.stake))
            .sum()
    }
}

impl StakerDirectory for StakingRegistry {
    fn virtual_staker_count(&self, staker: &CompressedPublicKey) -> u64 {
        self.stakers
            .get(staker)
            .map(|record| self.slots_for_stake(record.stake))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(byte: u8) -> CompressedPublicKey {
        CompressedPublicKey::from_raw([byte; 32])
    }

    fn registration(index: u64, byte: u8) -> StakerRegistration {
        StakerRegistration {
            index,
            member_id: member(byte),
        }
    }

    #[test]
    fn test_virtual_staker_count() {
        let mut registry = StakingRegistry::new(1000).unwrap();
        registry.register(&registration(0, 1), 5000);
        registry.register(&registration(1, 2), 1999);
        registry.register(&registration(2, 3), 999);

        assert_eq!(registry.virtual_staker_count(&member(1)), 5);
        assert_eq!(registry.virtual_staker_count(&member(2)), 1);
        assert_eq!(registry.virtual_staker_count(&member(3)), 0);
        assert_eq!(registry.virtual_staker_count(&member(4)), 0);
        assert_eq!(registry.total_virtual_stakers(), 6);
    }

    #[test]
    fn test_eligibility() {
        let mut registry = StakingRegistry::new(100).unwrap();
        registry.register(&registration(0, 1), 100);
        registry.register(&registration(1, 2), 99);

        assert!(registry.is_eligible(&member(1)));
        assert!(!registry.is_eligible(&member(2)));
        assert!(!registry.is_eligible(&member(3)));
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.eligible_count(), 1);
    }

    #[test]
    fn test_reregistration_and_updates() {
        let mut registry = StakingRegistry::new(10).unwrap();
        registry.register(&registration(0, 1), 10);
        registry.register(&registration(0, 1), 30);
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.virtual_staker_count(&member(1)), 3);

        assert!(registry.update_stake(&member(1), 50));
        assert!(!registry.update_stake(&member(2), 50));
        assert_eq!(registry.virtual_staker_count(&member(1)), 5);

        assert_eq!(
            registry.remove(&member(1)),
            Some(StakerRecord { index: 0, stake: 50 })
        );
        assert_eq!(registry.virtual_staker_count(&member(1)), 0);
    }

    #[test]
    fn test_zero_minimum_stake_rejected() {
        assert!(matches!(
            StakingRegistry::new(0),
            Err(SortitionError::InvalidArgument(_))
        ));
    }
}
