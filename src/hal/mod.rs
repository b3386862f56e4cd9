//! Hardware Abstraction Layer
//!
//! This module provides the seams between the driver and the host: register
//! access, the PHY management bus, the serial EEPROM, DMA memory and the
//! interrupt line.
//!
//! # Modules
//!
//! - [`mmio`]: Register window trait and bounds-checked MMIO implementation
//! - [`mdio`]: MII management bus over `GMIICONTROL`
//! - [`eeprom`]: Serial EEPROM reads over `ROMINTERFACE`
//! - [`dma`]: Contiguous DMA memory regions and the host allocator trait
//! - [`irq`]: Host interrupt line trait
//! - [`poll`]: Bounded and unbounded retry-with-delay helper
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.

pub mod dma;
pub mod eeprom;
pub mod irq;
pub mod mdio;
pub mod mmio;
pub mod poll;

// Re-export commonly used types
pub use dma::{DmaAllocator, DmaRegion};
pub use eeprom::Eeprom;
pub use irq::{IrqError, IrqLine};
pub use mdio::{GmiiBus, MdioBus};
pub use mmio::{MmioWindow, RegisterIo};
pub use poll::{Poll, PollOutcome};
