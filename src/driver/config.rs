//! Configuration types for the SiS 190/191 driver

use super::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    MAC_ADDR_LEN, PCI_DEVICE_SIS190, PCI_DEVICE_SIS191, PCI_VENDOR_SIS,
};

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    #[default]
    Mbps10,
    /// 100 Mbps
    Mbps100,
    /// 1000 Mbps
    Mbps1000,
}

impl Speed {
    /// Speed in megabits per second
    #[must_use]
    pub const fn as_mbps(self) -> u32 {
        match self {
            Speed::Mbps10 => 10,
            Speed::Mbps100 => 100,
            Speed::Mbps1000 => 1000,
        }
    }
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    #[default]
    Half,
    /// Full duplex
    Full,
}

/// Chip variant, distinguished by PCI device ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipModel {
    /// SiS 190: 10/100 Mb/s only
    Sis190,
    /// SiS 191: 10/100/1000 Mb/s
    Sis191,
}

impl ChipModel {
    /// Identify the chip from its PCI vendor and device IDs
    #[must_use]
    pub const fn from_pci_ids(vendor_id: u16, device_id: u16) -> Option<Self> {
        if vendor_id != PCI_VENDOR_SIS {
            return None;
        }
        match device_id {
            PCI_DEVICE_SIS190 => Some(ChipModel::Sis190),
            PCI_DEVICE_SIS191 => Some(ChipModel::Sis191),
            _ => None,
        }
    }

    /// Whether the MAC can run at 1000 Mb/s
    #[must_use]
    pub const fn is_gigabit(self) -> bool {
        matches!(self, ChipModel::Sis191)
    }

    /// Marketing name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ChipModel::Sis190 => "SiS 190 Fast Ethernet",
            ChipModel::Sis191 => "SiS 191 Gigabit Ethernet",
        }
    }
}

/// Resources handed over by the PCI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PciResources {
    /// PCI vendor ID
    pub vendor_id: u16,
    /// PCI device ID
    pub device_id: u16,
    /// Interrupt line
    pub irq: u8,
    /// Bit 0 of config byte 0x73: station address stored in the southbridge
    pub apc_station_address: bool,
}

impl PciResources {
    /// Describe a device from its IDs, IRQ and PCI config byte 0x73
    #[must_use]
    pub const fn new(vendor_id: u16, device_id: u16, irq: u8, cfg_0x73: u8) -> Self {
        Self {
            vendor_id,
            device_id,
            irq,
            apc_station_address: cfg_0x73 & 0x01 != 0,
        }
    }
}

/// Receive filter mode requested by the network stack
///
/// The device always accepts frames addressed to its own station address;
/// these flags widen acceptance. Multicast acceptance is not per-group: the
/// hash table is always set to accept every group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxFilterMode {
    /// Accept every frame
    pub promiscuous: bool,
    /// Accept all multicast frames
    pub all_multicast: bool,
    /// Accept multicast frames for a group list
    pub multicast_list: bool,
    /// Accept broadcast frames
    pub broadcast: bool,
}

impl RxFilterMode {
    /// Own address only
    pub const UNICAST: Self = Self {
        promiscuous: false,
        all_multicast: false,
        multicast_list: false,
        broadcast: false,
    };

    /// Own address plus broadcast
    pub const BROADCAST: Self = Self {
        broadcast: true,
        ..Self::UNICAST
    };

    /// Every frame on the wire
    pub const PROMISCUOUS: Self = Self {
        promiscuous: true,
        ..Self::UNICAST
    };

    /// Enable or disable promiscuous reception
    #[must_use]
    pub const fn with_promiscuous(mut self, enable: bool) -> Self {
        self.promiscuous = enable;
        self
    }

    /// Enable or disable reception of all multicast
    #[must_use]
    pub const fn with_all_multicast(mut self, enable: bool) -> Self {
        self.all_multicast = enable;
        self
    }

    /// Enable or disable reception of listed multicast groups
    #[must_use]
    pub const fn with_multicast_list(mut self, enable: bool) -> Self {
        self.multicast_list = enable;
        self
    }

    /// Enable or disable reception of broadcast
    #[must_use]
    pub const fn with_broadcast(mut self, enable: bool) -> Self {
        self.broadcast = enable;
        self
    }
}

/// Features the device advertises to the network stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Multicast reception
    pub multicast: bool,
    /// Broadcast reception
    pub broadcast: bool,
    /// Station address can be changed at runtime
    pub settable_address: bool,
}

/// Driver configuration
///
/// Use the builder methods to customize:
/// ```ignore
/// let config = SgeConfig::new()
///     .with_station_address(Some([0x02, 0x00, 0x00, 0x12, 0x34, 0x56]))
///     .with_rx_filter(RxFilterMode::BROADCAST);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SgeConfig {
    /// Station address override; `None` reads it from the EEPROM
    pub station_address: Option<[u8; MAC_ADDR_LEN]>,
    /// Receive filter applied at the end of initialization, if any
    pub rx_filter: Option<RxFilterMode>,
}

impl Default for SgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SgeConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub const fn new() -> Self {
        Self {
            station_address: None,
            rx_filter: None,
        }
    }

    /// Override the station address
    #[must_use]
    pub const fn with_station_address(mut self, addr: Option<[u8; MAC_ADDR_LEN]>) -> Self {
        self.station_address = addr;
        self
    }

    /// Apply a receive filter once the device is running
    #[must_use]
    pub const fn with_rx_filter(mut self, mode: RxFilterMode) -> Self {
        self.rx_filter = Some(mode);
        self
    }
}

/// Parse a station address written as six `:`-separated hex bytes.
///
/// All six fields must be present; a partial address is rejected rather
/// than padded.
pub fn parse_station_address(text: &str) -> ConfigResult<[u8; MAC_ADDR_LEN]> {
    let mut addr = [0u8; MAC_ADDR_LEN];
    let mut fields = text.trim().split(':');
    for byte in &mut addr {
        let field = fields.next().ok_or(ConfigError::InvalidStationAddress)?;
        if field.is_empty() || field.len() > 2 {
            return Err(ConfigError::InvalidStationAddress);
        }
        *byte = u8::from_str_radix(field, 16).map_err(|_| ConfigError::InvalidStationAddress)?;
    }
    if fields.next().is_some() {
        return Err(ConfigError::InvalidStationAddress);
    }
    Ok(addr)
}

/// Driver state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not yet initialized
    #[default]
    Uninitialized,
    /// Initialized, rings live, TX/RX engines enabled
    Running,
    /// Stopped and reset; DMA memory released
    Stopped,
}

// =============================================================================
// Tests
// =============================================================================
