//! Beacon Relay Group Selection
//!
//! Ticket-based sortition for threshold relay groups: stakers derive one
//! ticket per virtual staker slot from the previous beacon output, every
//! observer verifies the tickets it receives, and the lowest tickets form
//! the next candidate group. Relay requests are routed to an existing group
//! by reducing the previous entry modulo the number of groups.
//!
//! Everything in this crate is pure computation. Networking, persistence
//! and chain access belong to the caller.

pub mod errors;
pub mod group_index;
pub mod selection;
pub mod ticket;
pub mod verification;
pub mod wire;

pub use errors::{SortitionError, SortitionResult};
pub use group_index::{next_group_index, next_group_index_for_entry};
pub use selection::{select_group, selected_members};
pub use ticket::{calculate_ticket, generate_ticket_range, generate_tickets, Ticket, TicketProof};
pub use verification::{verify_ticket, StakerDirectory, TicketVerifier};
pub use wire::{WireFormat, TICKET_WIRE_LENGTH};
