//! Group selection round
//!
//! One round gathers the ticket pool for a beacon output, verifies it as a
//! whole and picks the candidate group. The round owns its phase:
//!
//! ```text
//! Gathering --close_submissions--> Verifying --finalize--> Selected
//!     \                                |
//!      `------------abandon------------'--> Abandoned
//! ```

use crate::config::{ConfigError, RelayConfig};
use beacon_consensus::{
    select_group, selected_members, SortitionError, StakerDirectory, Ticket, TicketVerifier,
};
use beacon_crypto::CompressedPublicKey;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    /// Accepting tickets from the gossip layer
    Gathering,
    /// Pool closed, waiting for verification and selection
    Verifying,
    Selected,
    Abandoned { reason: String },
}

impl RoundPhase {
    pub fn is_final(&self) -> bool {
        matches!(self, RoundPhase::Selected | RoundPhase::Abandoned { .. })
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundPhase::Gathering => write!(f, "gathering"),
            RoundPhase::Verifying => write!(f, "verifying"),
            RoundPhase::Selected => write!(f, "selected"),
            RoundPhase::Abandoned { reason } => write!(f, "abandoned ({})", reason),
        }
    }
}

#[derive(Error, Debug)]
pub enum RoundError {
    #[error("Cannot {operation} while {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: RoundPhase,
    },

    #[error("Verification worker pool: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sortition(#[from] SortitionError),
}

/// Result of a finalized round
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// Winning tickets, lowest first
    pub selected: Vec<Ticket>,
    /// Staker of each winning ticket, in rank order
    pub members: Vec<CompressedPublicKey>,
    pub rejected: Vec<(Ticket, SortitionError)>,
    /// Configured group size
    pub requested: usize,
}

impl SelectionOutcome {
    /// Fewer valid tickets than seats; the caller decides whether to abort
    pub fn is_short(&self) -> bool {
        self.selected.len() < self.requested
    }

    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.selected.len())
    }
}

pub struct SelectionRound {
    beacon_output: Vec<u8>,
    config: RelayConfig,
    phase: RoundPhase,
    pool: Vec<Ticket>,
    seen: HashSet<Ticket>,
}

impl SelectionRound {
    pub fn new(beacon_output: Vec<u8>, config: RelayConfig) -> Result<Self, RoundError> {
        config.validate()?;
        Ok(Self {
            beacon_output,
            config,
            phase: RoundPhase::Gathering,
            pool: Vec::new(),
            seen: HashSet::new(),
        })
    }

    pub fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    pub fn beacon_output(&self) -> &[u8] {
        &self.beacon_output
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    fn require(&self, expected: RoundPhase, operation: &'static str) -> Result<(), RoundError> {
        if self.phase != expected {
            return Err(RoundError::InvalidPhase {
                operation,
                phase: self.phase.clone(),
            });
        }
        Ok(())
    }

    /// Add a gossiped ticket; returns false for a retransmitted duplicate
    pub fn submit(&mut self, ticket: Ticket) -> Result<bool, RoundError> {
        self.require(RoundPhase::Gathering, "submit tickets")?;

        if !self.seen.insert(ticket) {
            log::debug!(
                "Duplicate ticket from {} slot {}",
                ticket.staker(),
                ticket.proof.virtual_staker_index
            );
            return Ok(false);
        }
        self.pool.push(ticket);
        Ok(true)
    }

    /// Submit many tickets; returns how many were new
    pub fn submit_all<I>(&mut self, tickets: I) -> Result<usize, RoundError>
    where
        I: IntoIterator<Item = Ticket>,
    {
        let mut added = 0;
        for ticket in tickets {
            if self.submit(ticket)? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn close_submissions(&mut self) -> Result<(), RoundError> {
        self.require(RoundPhase::Gathering, "close submissions")?;
        log::debug!("Closed submissions with {} tickets", self.pool.len());
        self.phase = RoundPhase::Verifying;
        Ok(())
    }

    /// Give up on the round, e.g. when the gathering deadline passed
    pub fn abandon(&mut self, reason: impl Into<String>) -> Result<(), RoundError> {
        if self.phase.is_final() {
            return Err(RoundError::InvalidPhase {
                operation: "abandon",
                phase: self.phase.clone(),
            });
        }
        let reason = reason.into();
        log::warn!("⚠️  Abandoning selection round: {}", reason);
        self.pool.clear();
        self.seen.clear();
        self.phase = RoundPhase::Abandoned { reason };
        Ok(())
    }

    /// Dedicated verification threads, or `None` for the global rayon pool
    fn verification_pool(&self) -> Result<Option<rayon::ThreadPool>, RoundError> {
        match self.config.verification_workers {
            0 => Ok(None),
            workers => rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map(Some)
                .map_err(|e| RoundError::WorkerPool(e.to_string())),
        }
    }

    /// Verify the closed pool and select the candidate group
    ///
    /// On error the round stays in `Verifying` with its pool intact, so the
    /// call can be retried.
    pub fn finalize<D>(&mut self, directory: D) -> Result<SelectionOutcome, RoundError>
    where
        D: StakerDirectory + Sync,
    {
        self.require(RoundPhase::Verifying, "finalize")?;

        self.config.validate()?;
        let workers = self.verification_pool()?;

        let pool = std::mem::take(&mut self.pool);
        let submitted = pool.len();
        let (accepted, rejected) = {
            let verifier = TicketVerifier::new(&self.beacon_output, directory);
            match workers {
                Some(workers) => workers.install(|| verifier.partition_pool(pool)),
                None => verifier.partition_pool(pool),
            }
        };

        let selected = select_group(accepted, self.config.group_size)?;
        let members = selected_members(&selected);
        self.seen.clear();
        self.phase = RoundPhase::Selected;

        log::info!(
            "✓ Selected {} of {} members from {} tickets ({} rejected)",
            selected.len(),
            self.config.group_size,
            submitted,
            rejected.len()
        );

        let outcome = SelectionOutcome {
            selected,
            members,
            rejected,
            requested: self.config.group_size,
        };
        if outcome.is_short() {
            log::warn!(
                "⚠️  Candidate group is {} members short",
                outcome.missing()
            );
        }
        Ok(outcome)
    }
}
