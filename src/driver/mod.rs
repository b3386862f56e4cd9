//! Core driver components for the SiS 190/191 Ethernet controller.
//!
//! This module contains the controller and the types it exchanges with its
//! caller:
//!
//! - [`config`] - Configuration types, chip identification and builders
//! - [`error`] - Error types and result aliases
//! - [`sge`] - The device controller: lifecycle, data path, link, interrupts
//! - [`filtering`] - Receive filter modes and the station address
//! - [`interrupt`] - Interrupt status decoding and event dispatch
//! - [`stats`] - Traffic and error counters
//!
//! # Example
//!
//! ```ignore
//! use ph_sis190_mac::driver::{PciResources, Sge, SgeConfig};
//!
//! let pci = PciResources::new(vendor_id, device_id, irq, cfg_0x73);
//! let mut sge = Sge::<_, _, _>::new(regs, delay, host, pci, SgeConfig::new());
//! let mac = sge.initialize()?;
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod filtering;
pub mod interrupt;
pub mod sge;
pub mod stats;

// Re-exports for convenience
pub use config::{
    Capabilities, ChipModel, Duplex, PciResources, RxFilterMode, SgeConfig, Speed, State,
    parse_station_address,
};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use interrupt::{EventHandler, InterruptEvents, InterruptStatus};
pub use sge::{Sge, SgeDefault, SgeSmall};
pub use stats::Statistics;
