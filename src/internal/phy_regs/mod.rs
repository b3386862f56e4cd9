//! MII/GMII PHY register definitions
//!
//! Clause 22 registers used by discovery and link resolution, plus the
//! 1000BASE-T control/status pair read on Gigabit-capable parts.

/// PHY register addresses
pub mod reg {
    /// Basic Mode Control Register
    pub const CONTROL: u8 = 0x00;
    /// Basic Mode Status Register
    pub const STATUS: u8 = 0x01;
    /// PHY Identifier 1
    pub const ID0: u8 = 0x02;
    /// PHY Identifier 2
    pub const ID1: u8 = 0x03;
    /// Auto-Negotiation Advertisement
    pub const ANAR: u8 = 0x04;
    /// Auto-Negotiation Link Partner Ability
    pub const ANLPAR: u8 = 0x05;
    /// Auto-Negotiation Expansion
    pub const ANER: u8 = 0x06;
    /// 1000BASE-T Control (our Gigabit advertisement)
    pub const GADV: u8 = 0x09;
    /// 1000BASE-T Status (partner Gigabit ability)
    pub const GLPAR: u8 = 0x0a;
}

/// CONTROL bits
pub mod control {
    /// Software reset (self-clearing)
    pub const RESET: u16 = 0x8000;
    /// Auto-negotiation enable
    pub const AUTO: u16 = 0x1000;
    /// Electrically isolate the PHY from the MII
    pub const ISOLATE: u16 = 0x0400;
    /// Restart auto-negotiation
    pub const RST_AUTO: u16 = 0x0200;
}

/// STATUS bits
pub mod status {
    /// Link is up (latched low)
    pub const LINK: u16 = 0x0004;
    /// Auto-negotiation complete
    pub const AUTO_DONE: u16 = 0x0020;
    /// 1000BASE-T extended status register present
    pub const EXT_STATUS: u16 = 0x0100;
    /// 10BASE-T half duplex capable
    pub const T10_HD: u16 = 0x0800;
    /// 10BASE-T full duplex capable
    pub const T10_FD: u16 = 0x1000;
    /// 100BASE-TX half duplex capable
    pub const TX_HD: u16 = 0x2000;
    /// 100BASE-TX full duplex capable
    pub const TX_FD: u16 = 0x4000;
    /// Status value on an empty bus address
    pub const ABSENT_ONES: u16 = 0xffff;
    /// Status value on an empty bus address (pulled low)
    pub const ABSENT_ZEROS: u16 = 0x0000;
}

/// ANAR/ANLPAR ability bits
pub mod ability {
    /// IEEE 802.3 selector
    pub const SELECTOR_802_3: u16 = 0x0001;
    /// 10BASE-T half duplex
    pub const T: u16 = 0x0020;
    /// 10BASE-T full duplex
    pub const T_FULL: u16 = 0x0040;
    /// 100BASE-TX half duplex
    pub const TX: u16 = 0x0080;
    /// 100BASE-TX full duplex
    pub const TX_FULL: u16 = 0x0100;
    /// Next page
    pub const NP: u16 = 0x8000;
}

/// ANER bits
pub mod expansion {
    /// A new page has been received from the partner
    pub const PAGE_RECEIVED: u16 = 0x0002;
}

/// GADV bits; GLPAR carries the partner's equivalents two bits higher
pub mod gigabit {
    /// 1000BASE-T full duplex
    pub const FULL: u16 = 0x0200;
    /// 1000BASE-T half duplex
    pub const HALF: u16 = 0x0100;
    /// Shift aligning GLPAR partner bits with GADV
    pub const PARTNER_SHIFT: u32 = 2;
}
