//! PHY records and link resolution
//!
//! Types shared by negotiation and the live link query, based on IEEE 802.3
//! Clause 22 registers plus the 1000BASE-T pair on Gigabit-capable chips.

use crate::driver::config::{ChipModel, Duplex, Speed};
use crate::driver::error::Result;
use crate::hal::mdio::MdioBus;
use crate::internal::constants::PHY_ADDR_COUNT;
use crate::internal::phy_regs::{ability, expansion, gigabit, reg, status};
use crate::internal::register::station;

// =============================================================================
// Link Status
// =============================================================================

/// Ethernet link status information
///
/// Contains the negotiated link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: Speed,
    /// Duplex mode
    pub duplex: Duplex,
}

impl LinkStatus {
    /// Create a new link status
    pub const fn new(speed: Speed, duplex: Duplex) -> Self {
        Self { speed, duplex }
    }

    /// 1000 Mbps Full Duplex
    pub const fn gigabit_full() -> Self {
        Self::new(Speed::Mbps1000, Duplex::Full)
    }

    /// 100 Mbps Full Duplex
    pub const fn fast_full() -> Self {
        Self::new(Speed::Mbps100, Duplex::Full)
    }

    /// 10 Mbps Half Duplex
    pub const fn slow_half() -> Self {
        Self::new(Speed::Mbps10, Duplex::Half)
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::slow_half()
    }
}

/// Cached link state kept by the controller.
///
/// `autoneg_done` gates transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkState {
    /// Negotiated speed
    pub speed: Speed,
    /// Negotiated duplex
    pub duplex: Duplex,
    /// Autonegotiation finished and the MAC was programmed to match
    pub autoneg_done: bool,
}

impl LinkState {
    /// State after a completed negotiation
    pub const fn negotiated(link: LinkStatus) -> Self {
        Self {
            speed: link.speed,
            duplex: link.duplex,
            autoneg_done: true,
        }
    }

    /// Speed and duplex, if negotiation completed
    pub const fn link(&self) -> Option<LinkStatus> {
        if self.autoneg_done {
            Some(LinkStatus::new(self.speed, self.duplex))
        } else {
            None
        }
    }
}

// =============================================================================
// PHY Records
// =============================================================================

/// Medium a PHY drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyMedium {
    /// PHY not in the known table
    Unknown,
    /// Twisted-pair LAN
    Lan,
}

struct KnownPhy {
    name: &'static str,
    id0: u16,
    id1: u16,
    medium: PhyMedium,
}

/// Transceivers seen on SiS 190/191 boards. `id1` is compared with the
/// revision nibble masked off.
const KNOWN_PHYS: &[KnownPhy] = &[
    KnownPhy { name: "Atheros AR8011", id0: 0x004d, id1: 0xd010, medium: PhyMedium::Lan },
    KnownPhy { name: "Atheros AR8012", id0: 0x004d, id1: 0xd020, medium: PhyMedium::Lan },
    KnownPhy { name: "Broadcom BCM5461", id0: 0x0020, id1: 0x60c0, medium: PhyMedium::Lan },
    KnownPhy { name: "Broadcom AC131", id0: 0x0143, id1: 0xbc70, medium: PhyMedium::Lan },
    KnownPhy { name: "Agere ET1101B", id0: 0x0282, id1: 0xf010, medium: PhyMedium::Lan },
    KnownPhy { name: "Marvell 88E1111", id0: 0x0141, id1: 0x0cc0, medium: PhyMedium::Lan },
    KnownPhy { name: "Realtek RTL8201", id0: 0x0000, id1: 0x8200, medium: PhyMedium::Lan },
];

fn lookup(id0: u16, id1: u16) -> Option<&'static KnownPhy> {
    KNOWN_PHYS
        .iter()
        .find(|p| p.id0 == id0 && p.id1 == (id1 & 0xfff0))
}

/// A transceiver found on the management bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyRecord {
    /// Bus address (0-31)
    pub addr: u8,
    /// PHY identifier 1
    pub id0: u16,
    /// PHY identifier 2
    pub id1: u16,
    /// Status register value seen during the scan
    pub status: u16,
    /// Medium the PHY drives
    pub medium: PhyMedium,
}

impl PhyRecord {
    /// Build a record, classifying the PHY from its identifier.
    ///
    /// Unrecognized PHYs are tagged [`PhyMedium::Unknown`] and are still
    /// eligible for selection.
    pub fn new(addr: u8, id0: u16, id1: u16, status: u16) -> Self {
        let medium = lookup(id0, id1).map_or(PhyMedium::Unknown, |p| p.medium);
        Self {
            addr,
            id0,
            id1,
            status,
            medium,
        }
    }

    /// Vendor and model name, if the PHY is recognized
    pub fn name(&self) -> Option<&'static str> {
        lookup(self.id0, self.id1).map(|p| p.name)
    }

    /// Whether the scan saw the link up
    pub const fn had_link(&self) -> bool {
        self.status & status::LINK != 0
    }
}

/// Discovered PHYs plus the one selected for all further operations
#[derive(Debug, Clone)]
pub struct PhyTable {
    records: [Option<PhyRecord>; PHY_ADDR_COUNT],
    len: usize,
    current: Option<usize>,
}

impl Default for PhyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PhyTable {
    /// Empty table
    pub const fn new() -> Self {
        Self {
            records: [None; PHY_ADDR_COUNT],
            len: 0,
            current: None,
        }
    }

    /// Forget every record and the selection
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Append a record in discovery order. Returns `false` when full.
    pub fn push(&mut self, record: PhyRecord) -> bool {
        match self.records.get_mut(self.len) {
            Some(slot) => {
                *slot = Some(record);
                self.len += 1;
                true
            }
            None => false,
        }
    }

    /// Number of records
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing was discovered
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record by discovery index
    pub fn get(&self, index: usize) -> Option<&PhyRecord> {
        self.records.get(index).and_then(Option::as_ref)
    }

    /// Records in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &PhyRecord> {
        self.records[..self.len].iter().flatten()
    }

    /// Make the record at `index` current
    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.current = Some(index);
        }
    }

    /// Index of the current record
    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The current record
    pub fn current(&self) -> Option<&PhyRecord> {
        self.current.and_then(|i| self.get(i))
    }
}

// =============================================================================
// Link Resolution
// =============================================================================

/// Read the status register twice; the first read clears latched bits.
pub(crate) fn read_status<B: MdioBus + ?Sized>(bus: &mut B, phy: u8) -> Result<u16> {
    bus.read(phy, reg::STATUS)?;
    bus.read(phy, reg::STATUS)
}

/// Derive speed and duplex from the PHY's autonegotiation registers.
///
/// Returns `None` if the link is down. On a Gigabit-capable chip whose
/// partner sent a next page with a received page flagged, the 1000BASE-T
/// registers decide; otherwise the 10/100 advertisement intersection does.
pub fn resolve_link<B: MdioBus + ?Sized>(
    bus: &mut B,
    phy: u8,
    model: ChipModel,
) -> Result<Option<LinkStatus>> {
    if read_status(bus, phy)? & status::LINK == 0 {
        return Ok(None);
    }

    let adv = bus.read(phy, reg::ANAR)?;
    let partner = bus.read(phy, reg::ANLPAR)?;
    let exp = bus.read(phy, reg::ANER)?;

    let mut link = LinkStatus::slow_half();

    if model.is_gigabit()
        && partner & ability::NP != 0
        && exp & expansion::PAGE_RECEIVED != 0
    {
        let gadv = bus.read(phy, reg::GADV)?;
        let gpartner = bus.read(phy, reg::GLPAR)?;
        let common = gadv & (gpartner >> gigabit::PARTNER_SHIFT);
        if common & gigabit::FULL != 0 {
            link = LinkStatus::gigabit_full();
        } else if common & gigabit::HALF != 0 {
            link = LinkStatus::new(Speed::Mbps1000, Duplex::Half);
        }
    } else {
        let common = adv & partner;
        if common & (ability::TX | ability::TX_FULL) != 0 {
            link.speed = Speed::Mbps100;
        }
        if common & (ability::TX_FULL | ability::T_FULL) != 0 {
            link.duplex = Duplex::Full;
        }
    }

    Ok(Some(link))
}

/// `STATIONCONTROL` value that puts the MAC in the given link mode
pub(crate) fn station_control_for(current: u32, link: LinkStatus, rgmii: bool) -> u32 {
    let mut sc = current & !(station::MODE_MASK | station::FDX | station::SPEED_MASK);

    sc |= match link.speed {
        Speed::Mbps1000 => station::SPEED_1000 | station::GMII_CLOCK | station::LINK_ENABLE,
        Speed::Mbps100 => station::SPEED_100 | station::LINK_ENABLE,
        Speed::Mbps10 => station::SPEED_10 | station::LINK_ENABLE,
    };

    if link.duplex == Duplex::Full {
        sc |= station::FDX;
    }
    if rgmii {
        sc |= station::GMII_CLOCK;
    }
    sc
}

// =============================================================================
// Tests
// =============================================================================
