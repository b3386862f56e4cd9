//! Ethernet PHY handling
//!
//! The MAC talks to its transceivers only through the [`MdioBus`] trait, so
//! everything here runs equally against [`GmiiBus`] on real hardware and a
//! simulated PHY bank in tests.
//!
//! - [`generic`]: PHY records, the discovery table and speed/duplex
//!   resolution shared by negotiation and the live link query
//! - [`negotiation`]: the discovery and autonegotiation state machine run
//!   at initialization
//!
//! # Example
//!
//! ```ignore
//! use ph_sis190_mac::hal::GmiiBus;
//! use ph_sis190_mac::phy::{negotiate, PhyTable};
//!
//! let mut phys = PhyTable::new();
//! let mut bus = GmiiBus::new(&mut regs, &mut delay);
//! let outcome = negotiate(&mut bus, ChipModel::Sis191, &mut phys)?;
//! if let Some(link) = outcome.link {
//!     // program the MAC for link.speed / link.duplex
//! }
//! ```
//!
//! [`MdioBus`]: crate::hal::MdioBus
//! [`GmiiBus`]: crate::hal::GmiiBus

pub mod generic;
pub mod negotiation;

pub use generic::{LinkState, LinkStatus, PhyMedium, PhyRecord, PhyTable, resolve_link};
pub use negotiation::{Negotiation, NegotiationState, Negotiator, negotiate};
