//! Register map for the SiS 190/191 MAC
//!
//! Offsets are relative to the start of the memory-mapped register window
//! (BAR 0). All registers are 32 bits wide except [`offset::RX_MAC_CONTROL`]
//! (16 bits) and the six byte-wide station address registers starting at
//! [`offset::RX_MAC_ADDR`].

/// Byte offsets of the device registers
pub mod offset {
    /// Transmit engine control
    pub const TX_CONTROL: usize = 0x00;
    /// Transmit descriptor ring base (bus address)
    pub const TX_DESC_START: usize = 0x04;
    pub const RESERVED0: usize = 0x08;
    /// Next transmit descriptor pointer (read-only)
    pub const TX_NEXT_DESC: usize = 0x0c;
    /// Receive engine control
    pub const RX_CONTROL: usize = 0x10;
    /// Receive descriptor ring base (bus address)
    pub const RX_DESC_START: usize = 0x14;
    pub const RESERVED1: usize = 0x18;
    /// Next receive descriptor pointer (read-only)
    pub const RX_NEXT_DESC: usize = 0x1c;
    /// Interrupt status (write back to acknowledge)
    pub const INTR_STATUS: usize = 0x20;
    /// Interrupt mask
    pub const INTR_MASK: usize = 0x24;
    /// Interrupt control
    pub const INTR_CONTROL: usize = 0x28;
    /// Interrupt moderation timer
    pub const INTR_TIMER: usize = 0x2c;
    /// Power management control
    pub const PM_CONTROL: usize = 0x30;
    pub const RESERVED2: usize = 0x34;
    /// Serial EEPROM control
    pub const ROM_CONTROL: usize = 0x38;
    /// Serial EEPROM command/data interface
    pub const ROM_INTERFACE: usize = 0x3c;
    /// Station control (speed, duplex, RGMII)
    pub const STATION_CONTROL: usize = 0x40;
    /// MII/GMII management interface
    pub const GMII_CONTROL: usize = 0x44;
    pub const GMAC_IO_CR: usize = 0x48;
    pub const GMAC_IO_CTL: usize = 0x4c;
    /// Transmit MAC control
    pub const TX_MAC_CONTROL: usize = 0x50;
    /// Transmit MAC time limit
    pub const TX_MAC_TIME_LIMIT: usize = 0x54;
    /// RGMII delay calibration
    pub const RGMII_DELAY: usize = 0x58;
    pub const RESERVED3: usize = 0x5c;
    /// Receive MAC control (16-bit, carries the filter bits)
    pub const RX_MAC_CONTROL: usize = 0x60;
    /// First of six byte-wide station address registers
    pub const RX_MAC_ADDR: usize = 0x62;
    /// Multicast hash table, low word
    pub const RX_HASH_TABLE: usize = 0x68;
    /// Multicast hash table, high word
    pub const RX_HASH_TABLE2: usize = 0x6c;
    /// Wake-on-LAN control
    pub const RX_WAKE_ON_LAN: usize = 0x70;
    /// Wake-on-LAN pattern data
    pub const RX_WAKE_ON_LAN_DATA: usize = 0x74;
    /// Receive packet size control
    pub const RX_MPS_CONTROL: usize = 0x78;
    pub const RESERVED4: usize = 0x7c;

    /// Size of the register window
    pub const WINDOW_SIZE: usize = 0x80;
}

/// TX_CONTROL / RX_CONTROL bits
pub mod dma_ctl {
    /// Engine enable
    pub const ENABLE: u32 = 0x0000_0001;
    /// Poll demand: re-read the descriptor at the engine's cursor
    pub const POLL: u32 = 0x0000_0010;
    /// TX_CONTROL value written during reset
    pub const TX_RESET_VALUE: u32 = 0x0000_1c00;
    /// RX_CONTROL value written during reset
    pub const RX_RESET_VALUE: u32 = 0x001e_1c00;
}

/// INTR_STATUS / INTR_MASK bits
pub mod intr {
    /// Software interrupt
    pub const SOFT_INT: u32 = 0x4000_0000;
    /// Moderation timer expired
    pub const TIMEUP: u32 = 0x2000_0000;
    /// PHY link state changed
    pub const LINK_CHANGE: u32 = 0x0001_0000;
    /// Receive queue ran empty
    pub const RX_IDLE: u32 = 0x0000_0080;
    /// Frame received
    pub const RX_DONE: u32 = 0x0000_0040;
    /// Transmit queue ran empty
    pub const TX_IDLE: u32 = 0x0000_0008;
    /// Frame transmitted
    pub const TX_DONE: u32 = 0x0000_0004;
    /// Receive engine halted
    pub const RX_HALT: u32 = 0x0000_0002;
    /// Transmit engine halted
    pub const TX_HALT: u32 = 0x0000_0001;

    /// Set of interrupts the driver unmasks and dispatches
    pub const RECOGNIZED: u32 =
        TX_DONE | TX_IDLE | RX_DONE | RX_IDLE | RX_HALT | TX_HALT | LINK_CHANGE;

    /// Value read back from a removed or unresponsive device
    pub const DEVICE_GONE: u32 = 0xffff_ffff;
    /// Write-one-to-clear value for every status bit
    pub const CLEAR_ALL: u32 = 0xffff_ffff;
}

/// INTR_CONTROL bits
pub mod intr_ctl {
    /// Soft-disable pulse
    pub const SOFT_DISABLE: u32 = 0x8000;
}

/// STATION_CONTROL fields
pub mod station {
    /// Speed field mask
    pub const SPEED_MASK: u32 = 0x0000_0c00;
    /// 10 Mb/s
    pub const SPEED_10: u32 = 0x0000_0400;
    /// 100 Mb/s
    pub const SPEED_100: u32 = 0x0000_0800;
    /// 1000 Mb/s
    pub const SPEED_1000: u32 = 0x0000_0c00;
    /// Full duplex
    pub const FDX: u32 = 0x0000_1000;
    /// RGMII interface select
    pub const RGMII: u32 = 0x0000_8000;
    /// Interface mode field cleared before reprogramming speed
    pub const MODE_MASK: u32 = 0x0f00_0000;
    /// GMII/RGMII clocking (bits 24..25)
    pub const GMII_CLOCK: u32 = 3 << 24;
    /// Common enable bit set for every speed
    pub const LINK_ENABLE: u32 = 1 << 26;
    /// Reset value for MII boards
    pub const RESET_VALUE: u32 = 0x0400_0001;
    /// Reset value for RGMII boards
    pub const RESET_VALUE_RGMII: u32 = RESET_VALUE | RGMII;
}

/// RX_MAC_CONTROL filter bits
pub mod rx_mac {
    /// Accept broadcast
    pub const BCAST: u16 = 0x0800;
    /// Accept multicast (subject to the hash table)
    pub const MCAST: u16 = 0x0400;
    /// Accept frames addressed to the station address
    pub const MYPHYS: u16 = 0x0200;
    /// Accept all unicast (promiscuous)
    pub const ALLPHYS: u16 = 0x0100;
    /// All filter bits
    pub const FILTER_MASK: u16 = BCAST | MCAST | MYPHYS | ALLPHYS;
    /// Reset value
    pub const RESET_VALUE: u32 = 0x12;
    /// Hash table value accepting every multicast group
    pub const HASH_ACCEPT_ALL: u32 = 0xffff_ffff;
}

/// GMII_CONTROL command encoding
pub mod gmii {
    /// Request in progress; cleared by hardware on completion
    pub const REQ: u32 = 0x10;
    /// Read operation
    pub const READ: u32 = 0x00;
    /// Write operation
    pub const WRITE: u32 = 0x20;
    /// PHY address field shift
    pub const PHY_SHIFT: u32 = 6;
    /// Register address field shift
    pub const REG_SHIFT: u32 = 11;
    /// Data field shift
    pub const DATA_SHIFT: u32 = 16;
    /// Data field mask
    pub const DATA_MASK: u32 = 0xffff_0000;
}

/// ROM_INTERFACE command encoding and EEPROM layout
pub mod eeprom {
    /// Request in progress; cleared by hardware on completion
    pub const REQ: u32 = 0x80;
    /// Read operation
    pub const READ: u32 = 0x0200;
    /// Word offset field shift
    pub const OFFSET_SHIFT: u32 = 10;
    /// Data field shift
    pub const DATA_SHIFT: u32 = 16;

    /// Word 0: signature
    pub const SIGNATURE: u16 = 0x00;
    /// Word 1: clock configuration
    pub const CLOCK: u16 = 0x01;
    /// Word 2: board information
    pub const INFO: u16 = 0x02;
    /// Words 3..5: station address, low byte first
    pub const MAC_ADDR: u16 = 0x03;

    /// INFO bit marking an RGMII board
    pub const INFO_RGMII: u16 = 0x0080;
}

/// Values used by the remaining reset writes
pub mod reset {
    pub const PM_CONTROL: u32 = 0xffc0_0000;
    pub const TX_MAC_CONTROL: u32 = 0x0000_2364;
    pub const TX_MAC_TIME_LIMIT: u32 = 0x0000_000f;
    pub const WAKE_ON_LAN: u32 = 0x80ff_0000;
}

/// RGMII_DELAY calibration pulse
pub mod rgmii {
    /// Calibration value written first
    pub const DELAY_PULSE: u32 = 0x0441;
    /// Default written back afterwards
    pub const DELAY_DEFAULT: u32 = 0x0440;
}
