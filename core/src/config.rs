//! Relay node configuration (TOML)
//!
//! ```toml
//! [relay]
//! group_size = 5
//! minimum_stake = 1000
//! verification_workers = 0
//! group_active_time = 10
//! relay_request_timeout = 8
//!
//! [[stakers]]
//! public_key = "<64 hex chars>"
//! stake = 5000
//!
//! [[groups]]
//! public_key = "<hex>"
//! request_id = 1
//! activation_block_height = 10
//! ```

use crate::events::{GroupRegistration, StakerRegistration};
use beacon_crypto::CompressedPublicKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_GROUP_SIZE: usize = 5;
pub const DEFAULT_MINIMUM_STAKE: u64 = 1;
pub const DEFAULT_GROUP_ACTIVE_TIME: u64 = 10;
pub const DEFAULT_RELAY_REQUEST_TIMEOUT: u64 = 8;

/// Upper bound on dedicated verification threads
pub const MAX_VERIFICATION_WORKERS: usize = 256;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid group size: {0} (must be > 0)")]
    InvalidGroupSize(usize),

    #[error("Invalid minimum stake: must be > 0")]
    InvalidMinimumStake,

    #[error("Invalid verification worker count: {0} (max {max})", max = MAX_VERIFICATION_WORKERS)]
    InvalidWorkerCount(usize),

    #[error("Invalid group entry {index}: {message}")]
    InvalidGroup { index: usize, message: String },
}

/// Selection parameters shared by every round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Members per candidate group
    pub group_size: usize,

    /// Stake backing one virtual staker slot
    pub minimum_stake: u64,

    /// Threads used to verify a ticket pool; 0 uses the global rayon pool
    pub verification_workers: usize,

    /// Blocks after activation during which a group may be picked
    pub group_active_time: u64,

    /// Blocks a picked group has to publish its entry
    pub relay_request_timeout: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            minimum_stake: DEFAULT_MINIMUM_STAKE,
            verification_workers: 0,
            group_active_time: DEFAULT_GROUP_ACTIVE_TIME,
            relay_request_timeout: DEFAULT_RELAY_REQUEST_TIMEOUT,
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_size == 0 {
            return Err(ConfigError::InvalidGroupSize(self.group_size));
        }
        if self.minimum_stake == 0 {
            return Err(ConfigError::InvalidMinimumStake);
        }
        if self.verification_workers > MAX_VERIFICATION_WORKERS {
            return Err(ConfigError::InvalidWorkerCount(self.verification_workers));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerConfig {
    pub public_key: CompressedPublicKey,
    pub stake: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Hex-encoded group public key
    pub public_key: String,
    pub request_id: u64,
    pub activation_block_height: u64,
}

/// Full node configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub stakers: Vec<StakerConfig>,

    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = toml::from_str(contents)?;
        config.relay.validate()?;
        Ok(config)
    }

    /// Staker entries as registration records, indexed in file order
    pub fn staker_registrations(&self) -> Vec<(StakerRegistration, u64)> {
        self.stakers
            .iter()
            .enumerate()
            .map(|(index, staker)| {
                (
                    StakerRegistration {
                        index: index as u64,
                        member_id: staker.public_key,
                    },
                    staker.stake,
                )
            })
            .collect()
    }

    pub fn group_registrations(&self) -> Result<Vec<GroupRegistration>, ConfigError> {
        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let group_public_key =
                    hex::decode(group.public_key.trim_start_matches("0x")).map_err(|e| {
                        ConfigError::InvalidGroup {
                            index,
                            message: e.to_string(),
                        }
                    })?;
                if group_public_key.is_empty() {
                    return Err(ConfigError::InvalidGroup {
                        index,
                        message: "empty public key".to_string(),
                    });
                }
                Ok(GroupRegistration {
                    group_public_key,
                    request_id: group.request_id,
                    activation_block_height: group.activation_block_height,
                })
            })
            .collect()
    }
}
