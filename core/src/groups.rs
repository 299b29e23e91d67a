//! Registry of active groups and responder lookup

use crate::config::{ConfigError, NodeConfig, RelayConfig};
use crate::events::GroupRegistration;
use beacon_consensus::next_group_index;
use beacon_crypto::HashValue;
use num_bigint::BigUint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredGroup {
    pub index: usize,
    pub public_key: Vec<u8>,
    pub request_id: u64,
    pub activation_block_height: u64,
}

impl RegisteredGroup {
    /// Last block at which the group may still answer a request
    pub fn expiry_block(&self, group_active_time: u64, relay_request_timeout: u64) -> u64 {
        self.activation_block_height
            .saturating_add(group_active_time)
            .saturating_add(relay_request_timeout)
    }
}

/// Groups in registration order; a group's position is its index
#[derive(Debug)]
pub struct GroupRegistry {
    groups: Vec<RegisteredGroup>,
    group_active_time: u64,
    relay_request_timeout: u64,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::with_relay_config(&RelayConfig::default())
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry using the relay's group expiry windows
    pub fn with_relay_config(relay: &RelayConfig) -> Self {
        Self {
            groups: Vec::new(),
            group_active_time: relay.group_active_time,
            relay_request_timeout: relay.relay_request_timeout,
        }
    }

    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::with_relay_config(&config.relay);
        for registration in config.group_registrations()? {
            registry.register(registration);
        }
        Ok(registry)
    }

    /// Append a group; returns its index, or `None` if the key is known
    pub fn register(&mut self, registration: GroupRegistration) -> Option<usize> {
        if self.is_registered(&registration.group_public_key) {
            log::debug!(
                "Ignoring duplicate group {}",
                hex::encode(&registration.group_public_key)
            );
            return None;
        }

        let index = self.groups.len();
        self.groups.push(RegisteredGroup {
            index,
            public_key: registration.group_public_key,
            request_id: registration.request_id,
            activation_block_height: registration.activation_block_height,
        });
        Some(index)
    }

    pub fn is_registered(&self, public_key: &[u8]) -> bool {
        self.groups.iter().any(|group| group.public_key == public_key)
    }

    pub fn get_by_key(&self, public_key: &[u8]) -> Option<&RegisteredGroup> {
        self.groups.iter().find(|group| group.public_key == public_key)
    }

    /// A group is stale once `current_block` is past its activation plus the
    /// active time and the relay request timeout. Unknown groups are stale.
    pub fn is_stale(&self, public_key: &[u8], current_block: u64) -> bool {
        match self.get_by_key(public_key) {
            Some(group) => {
                group.expiry_block(self.group_active_time, self.relay_request_timeout)
                    < current_block
            }
            None => true,
        }
    }

    pub fn get(&self, index: usize) -> Option<&RegisteredGroup> {
        self.groups.get(index)
    }

    pub fn count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group that must answer the request following `previous_entry`
    pub fn responder(&self, previous_entry: &BigUint) -> Option<&RegisteredGroup> {
        if self.groups.is_empty() {
            return None;
        }
        self.groups
            .get(next_group_index(previous_entry, self.groups.len()))
    }

    pub fn responder_for_entry(&self, previous_entry: &HashValue) -> Option<&RegisteredGroup> {
        self.responder(&previous_entry.to_big_uint())
    }
}
