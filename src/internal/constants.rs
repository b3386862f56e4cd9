//! Centralized Constants
//!
//! This module provides a single source of truth for the sizes, poll bounds
//! and identifiers used throughout the driver.
//!
//! # Note
//!
//! Hardware register bit definitions remain in [`register`](super::register)
//! and [`phy_regs`](super::phy_regs) as they are specific to those blocks.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Per-slot DMA buffer size for both rings
pub const BUF_SIZE: usize = 2048;

/// Minimum Ethernet frame size (excluding CRC); shorter payloads are zero padded
pub const MIN_FRAME_SIZE: usize = 60;

/// Standard Ethernet MTU
pub const MTU: usize = 1500;

/// Ethernet header size (destination, source, EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// MAC address length
pub const MAC_ADDR_LEN: usize = 6;

/// Size of one hardware descriptor in bytes
pub const DESCRIPTOR_SIZE: usize = 16;

/// Alignment requested for rings and buffer pools
pub const DMA_ALIGN: usize = 4096;

// =============================================================================
// Ring Lengths
// =============================================================================

/// Default number of receive descriptors
pub const RX_RING_LEN: usize = 32;

/// Default number of transmit descriptors
pub const TX_RING_LEN: usize = 32;

// =============================================================================
// PCI Identification
// =============================================================================

/// Silicon Integrated Systems PCI vendor ID
pub const PCI_VENDOR_SIS: u16 = 0x1039;

/// SiS 190 Fast Ethernet device ID
pub const PCI_DEVICE_SIS190: u16 = 0x0190;

/// SiS 191 Gigabit Ethernet device ID
pub const PCI_DEVICE_SIS191: u16 = 0x0191;

// =============================================================================
// Timing Constants
// =============================================================================

/// Settle time after writing an MII read command
pub const MII_READ_SETTLE_US: u32 = 50;

/// Settle time after writing an MII write command
pub const MII_WRITE_SETTLE_US: u32 = 500;

/// Delay between MII completion polls
pub const MII_POLL_INTERVAL_US: u32 = 50;

/// Settle time after writing an EEPROM read command
pub const EEPROM_SETTLE_US: u32 = 500;

/// Delay between EEPROM completion polls
pub const EEPROM_POLL_INTERVAL_US: u32 = 100;

/// Link-stabilization poll: maximum attempts
pub const LINK_STABLE_ATTEMPTS: u32 = 10_000;

/// Link-stabilization poll: delay between attempts
pub const LINK_STABLE_INTERVAL_US: u32 = 1_000;

/// Autonegotiation-complete poll: maximum attempts
pub const AUTONEG_ATTEMPTS: u32 = 1_000;

/// Autonegotiation-complete poll: delay between attempts
pub const AUTONEG_INTERVAL_US: u32 = 100;

/// Hold time of the interrupt-control soft-disable pulse during reset
pub const RESET_PULSE_US: u32 = 100;

/// Quiesce time after masking interrupts on stop
pub const STOP_QUIESCE_US: u32 = 2_000;

/// Hold time of the interrupt-control soft-disable pulse on stop
pub const STOP_PULSE_US: u32 = 50;

/// Period at which the host should call `tick` (10 Hz)
pub const STATS_TICK_INTERVAL_MS: u32 = 100;

// =============================================================================
// PHY Bus
// =============================================================================

/// Number of addresses on the MII management bus
pub const PHY_ADDR_COUNT: usize = 32;

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;
