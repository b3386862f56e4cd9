//! SiS 190/191 Ethernet Driver Core
//!
//! A `no_std`, `no_alloc` Rust implementation of the control core of the SiS
//! 190 (Fast Ethernet) and SiS 191 (Gigabit Ethernet) PCI network controllers.
//!
//! The crate owns everything between the PCI function and the network stack:
//! register sequencing, the descriptor rings, PHY discovery and link
//! negotiation, interrupt decoding and statistics. The host supplies the
//! register window, a delay source, contiguous DMA memory and the interrupt
//! line through small traits.
//!
//! # Architecture
//!
//! 1. **Controller** ([`driver::sge`]): lifecycle, TX/RX, link and interrupts
//! 2. **PHY Layer** ([`phy`]): transceiver discovery and autonegotiation
//! 3. **HAL Layer** ([`hal`]): register window, management bus, EEPROM, host
//!    DMA memory and interrupt line
//!
//! # Features
//!
//! - `defmt`: Log through defmt and derive `defmt::Format` on public types
//! - `log`: Log through the `log` facade
//! - `smoltcp`: Enable smoltcp network stack integration
//! - `critical-section`: Enable ISR-safe `SharedSge` wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_sis190_mac::{PciResources, Sge, SgeConfig};
//! use ph_sis190_mac::hal::MmioWindow;
//!
//! let regs = unsafe { MmioWindow::new(bar0, bar0_len) }.ok_or(Error::Config(ConfigError::RegisterWindow))?;
//! let pci = PciResources::new(vendor_id, device_id, irq, cfg_0x73);
//!
//! let mut sge: SgeDefault<_, _, _> = Sge::new(regs, delay, host, pci, SgeConfig::new());
//! let mac = sge.initialize()?;
//!
//! // Interrupt context
//! let events = sge.handle_interrupt()?;
//! if events.rx_available {
//!     while let Ok(len) = sge.receive(&mut buf) {
//!         // process buf[..len]
//!     }
//! }
//!
//! // Every 100 ms
//! let stats = sge.tick();
//! ```
//!
//! # Memory Requirements
//!
//! With the default 32-entry rings and 2048-byte buffers the host provides
//! about 129 KiB of DMA memory below 4 GiB, see [`Sge::memory_usage`].

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in the manifest.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// Logging shims; must come first so the macros are visible everywhere
#[macro_use]
mod fmt;

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod phy;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{
    Capabilities, ChipModel, Duplex, PciResources, RxFilterMode, SgeConfig, Speed, State,
};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::interrupt::{EventHandler, InterruptEvents, InterruptStatus};
pub use driver::sge::{Sge, SgeDefault, SgeSmall};
pub use driver::stats::Statistics;

// Re-export host seams
pub use hal::{DmaAllocator, DmaRegion, IrqError, IrqLine, MmioWindow, RegisterIo};

// Re-export PHY types
pub use phy::{LinkState, LinkStatus, NegotiationState, PhyMedium, PhyRecord, PhyTable};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{SharedSge, SharedSgeDefault};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Polls
        AUTONEG_ATTEMPTS,
        AUTONEG_INTERVAL_US,
        // Frame/buffer sizes
        BUF_SIZE,
        ETH_HEADER_SIZE,
        LINK_STABLE_ATTEMPTS,
        LINK_STABLE_INTERVAL_US,
        MAC_ADDR_LEN,
        MIN_FRAME_SIZE,
        MTU,
        // PCI identification
        PCI_DEVICE_SIS190,
        PCI_DEVICE_SIS191,
        PCI_VENDOR_SIS,
        // Ring lengths
        RX_RING_LEN,
        // Timing
        STATS_TICK_INTERVAL_MS,
        TX_RING_LEN,
    };
}
