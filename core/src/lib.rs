//! Beacon Relay Node Core
//!
//! The node-side collaborators of the selection core: configuration,
//! chain event records, staking and group registries, and the per-round
//! selection state machine.

pub mod config;
pub mod events;
pub mod groups;
pub mod round;
pub mod staking;

pub use config::{ConfigError, NodeConfig, RelayConfig};
pub use events::{GroupRegistration, StakerRegistration};
pub use groups::{GroupRegistry, RegisteredGroup};
pub use round::{RoundError, RoundPhase, SelectionOutcome, SelectionRound};
pub use staking::{StakerRecord, StakingRegistry};
