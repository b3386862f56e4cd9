//! SiS 190/191 device controller.
//!
//! [`Sge`] owns the register window, a delay source and the host services,
//! and drives the device through its lifecycle:
//!
//! ```text
//! Uninitialized ──initialize──▶ Running ──stop──▶ Stopped
//!                                  ▲                 │
//!                                  └───initialize────┘
//! ```
//!
//! Receive filtering and the station address live in
//! [`filtering`](super::filtering).

use embedded_hal::delay::DelayNs;

use super::config::{Capabilities, ChipModel, PciResources, SgeConfig, State};
use super::error::{ConfigError, DmaError, IoError, Result};
use super::interrupt::{InterruptEvents, InterruptStatus};
use super::stats::{Counters, Statistics};
use crate::hal::dma::DmaAllocator;
use crate::hal::eeprom::Eeprom;
use crate::hal::irq::IrqLine;
use crate::hal::mdio::GmiiBus;
use crate::hal::mmio::RegisterIo;
use crate::internal::constants::{
    BUF_SIZE, MAC_ADDR_LEN, RESET_PULSE_US, RX_RING_LEN, STOP_PULSE_US, STOP_QUIESCE_US,
    TX_RING_LEN,
};
use crate::internal::dma::{DmaEngine, tx_command};
use crate::internal::register::offset::*;
use crate::internal::register::{dma_ctl, intr, intr_ctl, reset, rgmii, rx_mac, station};
use crate::phy::generic::station_control_for;
use crate::phy::{LinkState, LinkStatus, NegotiationState, PhyTable, negotiate, resolve_link};

/// SiS 190/191 Ethernet controller
///
/// # Type Parameters
/// * `R` - Register window
/// * `D` - Delay source
/// * `H` - Host services: DMA memory and the interrupt line
/// * `RX` - Number of receive descriptors
/// * `TX` - Number of transmit descriptors
///
/// # Example
/// ```ignore
/// let mut sge: SgeDefault<_, _, _> = Sge::new(regs, delay, host, pci, SgeConfig::new());
/// let mac = sge.initialize()?;
///
/// sge.send(&frame)?;
/// if let Ok(len) = sge.receive(&mut buf) {
///     // process buf[..len]
/// }
/// ```
///
/// Call [`stop`](Self::stop) before dropping a running controller; the DMA
/// memory is only returned to the host there.
pub struct Sge<R, D, H, const RX: usize = RX_RING_LEN, const TX: usize = TX_RING_LEN>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    pub(super) regs: R,
    delay: D,
    host: H,
    pci: PciResources,
    model: Option<ChipModel>,
    config: SgeConfig,
    state: State,
    pub(super) station_address: [u8; MAC_ADDR_LEN],
    /// Board uses the RGMII interface
    rgmii: bool,
    dma: Option<DmaEngine<RX, TX>>,
    phys: PhyTable,
    link: LinkState,
    counters: Counters,
    stats: Statistics,
}

/// Controller with the default ring lengths
pub type SgeDefault<R, D, H> = Sge<R, D, H, RX_RING_LEN, TX_RING_LEN>;

/// Controller with 8-entry rings, for memory-constrained hosts
pub type SgeSmall<R, D, H> = Sge<R, D, H, 8, 8>;

impl<R, D, H, const RX: usize, const TX: usize> Sge<R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    /// Create a controller for the device described by `pci`.
    ///
    /// Nothing touches the hardware until [`initialize`](Self::initialize).
    pub fn new(regs: R, delay: D, host: H, pci: PciResources, config: SgeConfig) -> Self {
        Self {
            regs,
            delay,
            host,
            pci,
            model: None,
            config,
            state: State::Uninitialized,
            station_address: [0; MAC_ADDR_LEN],
            rgmii: false,
            dma: None,
            phys: PhyTable::new(),
            link: LinkState::default(),
            counters: Counters::default(),
            stats: Statistics::default(),
        }
    }

    /// DMA memory requested from the host while running, in bytes
    pub const fn memory_usage() -> usize {
        DmaEngine::<RX, TX>::memory_usage()
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Current lifecycle state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Current station address
    #[inline(always)]
    pub fn station_address(&self) -> [u8; MAC_ADDR_LEN] {
        self.station_address
    }

    /// Chip model, known once initialization has identified it
    #[inline(always)]
    pub fn model(&self) -> Option<ChipModel> {
        self.model
    }

    /// Cached link mode
    #[inline(always)]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    /// PHYs found by the last bus scan
    pub fn phys(&self) -> &PhyTable {
        &self.phys
    }

    /// Host services
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether the board uses the RGMII interface
    pub fn is_rgmii(&self) -> bool {
        self.rgmii
    }

    /// Features offered to the network stack
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            multicast: true,
            broadcast: true,
            settable_address: true,
        }
    }

    /// Whether a `send` would currently be accepted by the ring
    pub fn tx_ready(&self) -> bool {
        self.link.autoneg_done && self.dma.as_ref().is_some_and(DmaEngine::tx_available)
    }

    /// Whether a received frame (good or bad) is waiting
    pub fn rx_available(&self) -> bool {
        self.dma.as_ref().is_some_and(DmaEngine::rx_pending)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring the device up and return its station address.
    ///
    /// Identifies the chip, resets the MAC, resolves the station address,
    /// builds the rings and negotiates the link. The interrupt line is
    /// claimed last, so any failure leaves it untouched. A link that does
    /// not come up is not an error: the device runs and `send` reports
    /// `Busy` until [`link_status`](Self::link_status) sees it.
    ///
    /// Calling this while running returns the current address without
    /// touching the hardware.
    ///
    /// # Errors
    /// - `NoDevice` - PCI IDs are not a SiS 190/191
    /// - `UnsupportedAddressSource` - Address is held by the southbridge
    /// - `AllocationFailed` / `AddressOutOfRange` - DMA memory unusable
    /// - `NoTransceiver` - No PHY answered; DMA memory is released
    /// - `IrqSetup` - Host refused the interrupt line; DMA memory is released
    pub fn initialize(&mut self) -> Result<[u8; MAC_ADDR_LEN]> {
        if self.state == State::Running {
            return Ok(self.station_address);
        }

        let model = ChipModel::from_pci_ids(self.pci.vendor_id, self.pci.device_id)
            .ok_or(ConfigError::NoDevice)?;
        self.model = Some(model);
        info!("sge: {} on irq {}", model.name(), self.pci.irq);

        self.reset_hw();

        let addr = self.resolve_station_address()?;
        if self.rgmii {
            self.regs.set_bits32(STATION_CONTROL, station::RGMII);
        }
        self.set_station_address(addr);
        debug!("sge: station address {:?}", addr);

        let mut dma = DmaEngine::<RX, TX>::allocate(&mut self.host).inspect_err(|_| {
            error!("sge: cannot allocate {} bytes of DMA memory", Self::memory_usage());
        })?;
        dma.init(&mut self.regs);

        let negotiated = {
            let mut bus = GmiiBus::new(&mut self.regs, &mut self.delay);
            negotiate(&mut bus, model, &mut self.phys)
        };
        let outcome = match negotiated {
            Ok(outcome) if outcome.state != NegotiationState::NoTransceiver => outcome,
            failed => {
                self.reset_hw();
                // SAFETY: the device was just reset and no longer fetches
                // from the rings.
                unsafe { dma.release(&mut self.host) };
                return Err(failed
                    .err()
                    .unwrap_or_else(|| ConfigError::NoTransceiver.into()));
            }
        };

        match outcome.link {
            Some(link) => self.apply_link(link),
            None => self.link = LinkState::default(),
        }
        if self.rgmii && outcome.wants_delay_calibration() {
            self.regs.write32(RGMII_DELAY, rgmii::DELAY_PULSE);
            self.regs.write32(RGMII_DELAY, rgmii::DELAY_DEFAULT);
        }

        let irq = self.pci.irq;
        let claimed = self
            .host
            .set_policy(irq)
            .and_then(|()| self.host.enable(irq));
        if claimed.is_err() {
            error!("sge: cannot set up irq {}", irq);
            self.reset_hw();
            // SAFETY: the device was just reset and no longer fetches
            // from the rings.
            unsafe { dma.release(&mut self.host) };
            self.link = LinkState::default();
            return Err(ConfigError::IrqSetup.into());
        }

        self.dma = Some(dma);
        self.regs.write32(INTR_MASK, intr::RECOGNIZED);
        self.regs.set_bits32(TX_CONTROL, dma_ctl::ENABLE);
        self.regs.set_bits32(RX_CONTROL, dma_ctl::ENABLE | dma_ctl::POLL);
        self.state = State::Running;

        if let Some(mode) = self.config.rx_filter {
            self.set_filter_mode(mode);
        }

        Ok(self.station_address)
    }

    /// Station address from the configured override or the EEPROM.
    ///
    /// Also picks up the RGMII flag when the EEPROM is the address source.
    fn resolve_station_address(&mut self) -> Result<[u8; MAC_ADDR_LEN]> {
        let apc = self.pci.apc_station_address;
        let mut rom = Eeprom::new(&mut self.regs, &mut self.delay);
        if !apc {
            self.rgmii = rom.is_rgmii();
        }

        match self.config.station_address {
            Some(addr) => Ok(addr),
            None if apc => {
                error!("sge: station address is held by the southbridge");
                Err(ConfigError::UnsupportedAddressSource.into())
            }
            None => Ok(rom.station_address()),
        }
    }

    /// Put the MAC into its quiescent post-reset configuration
    fn reset_hw(&mut self) {
        let regs = &mut self.regs;

        regs.write32(INTR_MASK, 0);
        regs.write32(INTR_STATUS, intr::CLEAR_ALL);

        regs.write32(TX_CONTROL, dma_ctl::TX_RESET_VALUE);
        regs.write32(RX_CONTROL, dma_ctl::RX_RESET_VALUE);

        regs.write32(INTR_CONTROL, intr_ctl::SOFT_DISABLE);
        regs.read32(INTR_CONTROL);
        self.delay.delay_us(RESET_PULSE_US);
        regs.write32(INTR_CONTROL, 0);

        regs.write32(INTR_MASK, 0);
        regs.write32(INTR_STATUS, intr::CLEAR_ALL);

        regs.write32(TX_DESC_START, 0);
        regs.write32(RESERVED0, 0);
        regs.write32(RX_DESC_START, 0);
        regs.write32(RESERVED1, 0);

        regs.write32(PM_CONTROL, reset::PM_CONTROL);
        regs.write32(RESERVED2, 0);

        let sc = if self.rgmii {
            station::RESET_VALUE_RGMII
        } else {
            station::RESET_VALUE
        };
        regs.write32(STATION_CONTROL, sc);

        regs.write32(GMAC_IO_CR, 0);
        regs.write32(GMAC_IO_CTL, 0);

        regs.write32(TX_MAC_CONTROL, reset::TX_MAC_CONTROL);
        regs.write32(TX_MAC_TIME_LIMIT, reset::TX_MAC_TIME_LIMIT);

        regs.write32(RGMII_DELAY, 0);
        regs.write32(RESERVED3, 0);

        regs.write32(RX_MAC_CONTROL, rx_mac::RESET_VALUE);

        regs.write32(RX_HASH_TABLE, 0);
        regs.write32(RX_HASH_TABLE2, 0);

        regs.write32(RX_WAKE_ON_LAN, reset::WAKE_ON_LAN);
        regs.write32(RX_WAKE_ON_LAN_DATA, reset::WAKE_ON_LAN);

        regs.write32(RX_MPS_CONTROL, 0);
        regs.write32(RESERVED4, 0);
    }

    // =========================================================================
    // Data Path
    // =========================================================================

    /// Queue one frame for transmission.
    ///
    /// Frames shorter than 60 bytes are zero padded on the wire.
    ///
    /// # Errors
    /// - `FrameTooLarge` - Frame exceeds the per-slot buffer
    /// - `InvalidState` - Device is not running
    /// - `Busy` - Link not negotiated yet, or no free transmit slot
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > BUF_SIZE {
            return Err(DmaError::FrameTooLarge.into());
        }
        let Some(dma) = self.dma.as_mut().filter(|_| self.state == State::Running) else {
            return Err(IoError::InvalidState.into());
        };
        if !self.link.autoneg_done {
            return Err(IoError::Busy.into());
        }

        let command = tx_command(self.link.speed, self.link.duplex);
        dma.transmit(&mut self.regs, frame, command, &mut self.counters)
    }

    /// Copy the next good received frame into `buffer`.
    ///
    /// Frames the device flagged as bad are dropped and counted as
    /// `rx_errors`. A frame longer than `buffer` is truncated.
    ///
    /// # Errors
    /// - `InvalidState` - Device is not running
    /// - `Empty` - No good frame is waiting
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let Some(dma) = self.dma.as_mut().filter(|_| self.state == State::Running) else {
            return Err(IoError::InvalidState.into());
        };
        dma.receive(&mut self.regs, buffer, &mut self.counters)
    }

    // =========================================================================
    // Interrupts and Periodic Work
    // =========================================================================

    /// Acknowledge the device interrupt and report what happened.
    ///
    /// While running, the interrupt mask is restored and the host line
    /// re-armed on every path, including a status read of all ones from a
    /// removed device. A controller that is not running leaves the device
    /// and the line alone and reports no events.
    ///
    /// # Errors
    /// - `IrqRearm` - Host refused to re-enable the interrupt line
    pub fn handle_interrupt(&mut self) -> Result<InterruptEvents> {
        if self.state != State::Running {
            return Ok(InterruptEvents::NONE);
        }

        let raw = self.regs.read32(INTR_STATUS);

        let events = if InterruptStatus::is_actionable(raw) {
            self.regs.write32(INTR_STATUS, raw);
            self.regs.write32(INTR_MASK, 0);
            InterruptStatus::from_raw(raw).events()
        } else {
            InterruptEvents::NONE
        };
        if events.link_changed {
            debug!("sge: link change interrupt");
        }

        self.regs.write32(INTR_MASK, intr::RECOGNIZED);
        self.host
            .enable(self.pci.irq)
            .map_err(|_| IoError::IrqRearm)?;
        Ok(events)
    }

    /// Publish the running counters; call every 100 ms.
    pub fn tick(&mut self) -> Statistics {
        self.stats = self.counters.publish();
        self.stats
    }

    /// Statistics as of the last [`tick`](Self::tick)
    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    // =========================================================================
    // Link
    // =========================================================================

    /// Query the current PHY for the live link mode.
    ///
    /// An up link refreshes the cached link state, unblocks `send` and
    /// reprograms the MAC if the mode changed. A down link leaves the cache
    /// untouched.
    ///
    /// # Errors
    /// - `InvalidState` - Device is not running
    pub fn link_status(&mut self) -> Result<Option<LinkStatus>> {
        if self.state != State::Running {
            return Err(IoError::InvalidState.into());
        }
        let (Some(model), Some(phy)) = (self.model, self.phys.current().map(|p| p.addr)) else {
            return Ok(None);
        };

        let resolved = {
            let mut bus = GmiiBus::new(&mut self.regs, &mut self.delay);
            resolve_link(&mut bus, phy, model)?
        };
        if let Some(link) = resolved {
            if self.link.link() != Some(link) {
                info!("sge: link up {:?} {:?}", link.speed, link.duplex);
            }
            self.apply_link(link);
        }
        Ok(resolved)
    }

    /// Program the MAC for `link` and mark negotiation complete
    fn apply_link(&mut self, link: LinkStatus) {
        let current = self.regs.read32(STATION_CONTROL);
        let sc = station_control_for(current, link, self.rgmii);
        if sc != current {
            self.regs.write32(STATION_CONTROL, sc);
        }
        self.link = LinkState::negotiated(link);
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Reset the device and return its DMA memory to the host.
    ///
    /// [`initialize`](Self::initialize) may be called again afterwards.
    pub fn stop(&mut self) {
        self.reset_hw();

        self.regs.write32(INTR_MASK, 0);
        self.delay.delay_us(STOP_QUIESCE_US);

        self.regs.set_bits32(INTR_CONTROL, intr_ctl::SOFT_DISABLE);
        self.delay.delay_us(STOP_PULSE_US);
        self.regs.clear_bits32(INTR_CONTROL, intr_ctl::SOFT_DISABLE);

        if let Some(dma) = self.dma.take() {
            // SAFETY: the device is reset with both engines disabled.
            unsafe { dma.release(&mut self.host) };
        }

        self.link = LinkState::default();
        self.state = State::Stopped;
        info!("sge: stopped");
    }
}

#[cfg(test)]
impl<R, D, H, const RX: usize, const TX: usize> Sge<R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    pub(crate) fn dma_mut(&mut self) -> Option<&mut DmaEngine<RX, TX>> {
        self.dma.as_mut()
    }

    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::driver::config::{Duplex, RxFilterMode, Speed};
    use crate::driver::error::Error;
    use crate::internal::constants::MIN_FRAME_SIZE;
    use crate::internal::dma::descriptor::bits::{rx_done, tx_cmd};
    use crate::internal::phy_regs::{ability, gigabit, reg, status};
    use crate::internal::register::eeprom;
    use crate::testing::{FakeHost, FakeRegisters, MockDelay};

    type TestSge = Sge<FakeRegisters, MockDelay, FakeHost, 4, 4>;

    const MAC: [u8; 6] = [0x00, 0x07, 0x95, 0x12, 0x34, 0x56];
    const SIS190: PciResources = PciResources::new(0x1039, 0x0190, 11, 0);
    const SIS191: PciResources = PciResources::new(0x1039, 0x0191, 11, 0);
    const PHY: u8 = 1;
    const LINKED: u16 = 0x7800 | status::LINK | status::AUTO_DONE;

    /// Board with one PHY at address 1 linked at 100 Mb/s full duplex
    fn fast_full_board() -> FakeRegisters {
        let regs = FakeRegisters::new();
        regs.set_station_address_eeprom(MAC);
        regs.set_phy(PHY, reg::ID0, 0x0000);
        regs.set_phy(PHY, reg::ID1, 0x8201);
        regs.set_phy(PHY, reg::STATUS, LINKED);
        regs.set_phy(PHY, reg::ANAR, 0x01e1);
        regs.set_phy(PHY, reg::ANLPAR, 0x01e1);
        regs
    }

    fn sge_with(regs: &FakeRegisters, pci: PciResources, config: SgeConfig) -> TestSge {
        Sge::new(regs.clone(), MockDelay::new(), FakeHost::new(), pci, config)
    }

    fn running(regs: &FakeRegisters) -> TestSge {
        let mut sge = sge_with(regs, SIS190, SgeConfig::new());
        sge.initialize().unwrap();
        sge
    }

    // -------------------------------------------------------------------------
    // initialize
    // -------------------------------------------------------------------------

    #[test]
    fn initialize_brings_device_up() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());

        assert_eq!(sge.initialize(), Ok(MAC));
        assert_eq!(sge.state(), State::Running);
        assert_eq!(sge.model(), Some(ChipModel::Sis190));
        assert_eq!(regs.station_address(), MAC);
        assert_eq!(regs.reg(INTR_MASK), intr::RECOGNIZED);
        assert_eq!(regs.reg(TX_CONTROL), dma_ctl::TX_RESET_VALUE | dma_ctl::ENABLE);
        assert_eq!(
            regs.reg(RX_CONTROL),
            dma_ctl::RX_RESET_VALUE | dma_ctl::ENABLE | dma_ctl::POLL
        );
        assert_eq!(sge.host().irq.policy_calls, vec![11]);
        assert_eq!(sge.host().irq.enable_calls, vec![11]);
        assert_eq!(sge.host().dma.outstanding(), 4);
    }

    #[test]
    fn initialize_negotiates_fast_full_duplex() {
        let regs = fast_full_board();
        let sge = running(&regs);

        assert_eq!(regs.reg(STATION_CONTROL), 0x0400_1801);
        let link = sge.link_state();
        assert!(link.autoneg_done);
        assert_eq!(link.link(), Some(LinkStatus::fast_full()));
    }

    #[test]
    fn initialize_negotiates_gigabit_on_sis191() {
        let regs = fast_full_board();
        regs.set_phy(PHY, reg::ANLPAR, 0x01e1 | ability::NP);
        regs.set_phy(PHY, reg::ANER, 0x0002);
        regs.set_phy(PHY, reg::GADV, 0x0300);
        regs.set_phy(PHY, reg::GLPAR, 0x0c00);
        let mut sge = sge_with(&regs, SIS191, SgeConfig::new());
        sge.initialize().unwrap();

        assert_eq!(sge.link_state().link(), Some(LinkStatus::gigabit_full()));
        assert_eq!(regs.reg(STATION_CONTROL), 0x0700_1c01);
    }

    #[test]
    fn initialize_twice_resets_once() {
        let regs = fast_full_board();
        let mut sge = running(&regs);

        assert_eq!(sge.initialize(), Ok(MAC));
        assert_eq!(regs.count_writes(TX_CONTROL, dma_ctl::TX_RESET_VALUE), 1);
        assert_eq!(sge.host().dma.outstanding(), 4);
    }

    #[test]
    fn initialize_rejects_unknown_device() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, PciResources::new(0x1039, 0x0900, 11, 0), SgeConfig::new());

        assert_eq!(sge.initialize(), Err(Error::Config(ConfigError::NoDevice)));
        assert!(sge.host().irq.policy_calls.is_empty());
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn initialize_reports_irq_setup_failure() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());
        sge.host_mut().irq.fail_enable = true;

        assert_eq!(sge.initialize(), Err(Error::Config(ConfigError::IrqSetup)));
        assert_eq!(sge.state(), State::Uninitialized);
        assert_eq!(sge.host().dma.outstanding(), 0);
        assert_eq!(regs.reg(INTR_MASK), 0);
        assert!(!sge.link_state().autoneg_done);
    }

    #[test]
    fn configured_address_overrides_eeprom() {
        let regs = fast_full_board();
        let custom = [0x02, 0, 0, 0xaa, 0xbb, 0xcc];
        let mut sge = sge_with(
            &regs,
            SIS190,
            SgeConfig::new().with_station_address(Some(custom)),
        );

        assert_eq!(sge.initialize(), Ok(custom));
        assert_eq!(regs.station_address(), custom);
    }

    #[test]
    fn apc_address_source_is_unsupported() {
        let regs = fast_full_board();
        let apc = PciResources::new(0x1039, 0x0190, 11, 0x01);
        let mut sge = sge_with(&regs, apc, SgeConfig::new());

        assert_eq!(
            sge.initialize(),
            Err(Error::Config(ConfigError::UnsupportedAddressSource))
        );
        assert_eq!(sge.host().dma.outstanding(), 0);
        assert!(sge.host().irq.policy_calls.is_empty());
        assert!(sge.host().irq.enable_calls.is_empty());

        regs.set_reg(INTR_STATUS, intr::RX_DONE);
        assert_eq!(sge.handle_interrupt(), Ok(InterruptEvents::NONE));
        assert_eq!(regs.reg(INTR_MASK), 0);
        assert!(sge.host().irq.enable_calls.is_empty());

        let custom = [0x02, 0, 0, 0, 0, 0x01];
        let mut sge = sge_with(
            &regs,
            apc,
            SgeConfig::new().with_station_address(Some(custom)),
        );
        assert_eq!(sge.initialize(), Ok(custom));
    }

    #[test]
    fn missing_transceiver_releases_rings() {
        let regs = FakeRegisters::new();
        regs.set_station_address_eeprom(MAC);
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());

        assert_eq!(
            sge.initialize(),
            Err(Error::Config(ConfigError::NoTransceiver))
        );
        assert_eq!(sge.host().dma.outstanding(), 0);
        assert_ne!(sge.state(), State::Running);
        assert_eq!(regs.reg(INTR_MASK), 0);
    }

    #[test]
    fn dma_allocation_failure_is_reported() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());
        sge.host_mut().dma.fail_after(1);

        assert_eq!(
            sge.initialize(),
            Err(Error::Dma(DmaError::AllocationFailed))
        );
        assert_eq!(sge.host().dma.outstanding(), 0);
    }

    #[test]
    fn rgmii_board_calibrates_delay_line() {
        let regs = fast_full_board();
        regs.set_eeprom(eeprom::INFO, eeprom::INFO_RGMII);
        let sge = running(&regs);

        assert!(sge.is_rgmii());
        let delays = regs.writes_to(RGMII_DELAY);
        assert_eq!(
            &delays[delays.len() - 2..],
            &[rgmii::DELAY_PULSE, rgmii::DELAY_DEFAULT]
        );
        let sc = regs.reg(STATION_CONTROL);
        assert_eq!(sc & station::RGMII, station::RGMII);
        assert_eq!(sc & station::GMII_CLOCK, station::GMII_CLOCK);
    }

    #[test]
    fn mii_board_skips_delay_calibration() {
        let regs = fast_full_board();
        let _sge = running(&regs);
        assert_eq!(regs.count_writes(RGMII_DELAY, rgmii::DELAY_PULSE), 0);
    }

    #[test]
    fn link_timeout_still_runs() {
        let regs = fast_full_board();
        regs.on_phy_reset(PHY, 0x7800);
        let mut sge = running(&regs);

        assert_eq!(sge.state(), State::Running);
        assert!(!sge.link_state().autoneg_done);
        assert_eq!(sge.send(&[0u8; 64]), Err(Error::Io(IoError::Busy)));
        assert!(!sge.tx_ready());
    }

    #[test]
    fn initial_filter_mode_is_applied() {
        let regs = fast_full_board();
        let mut sge = sge_with(
            &regs,
            SIS190,
            SgeConfig::new().with_rx_filter(RxFilterMode::PROMISCUOUS),
        );
        sge.initialize().unwrap();

        let ctl = regs.reg(RX_MAC_CONTROL) as u16;
        assert_eq!(ctl & rx_mac::FILTER_MASK, rx_mac::FILTER_MASK);
    }

    // -------------------------------------------------------------------------
    // send / receive
    // -------------------------------------------------------------------------

    #[test]
    fn send_before_initialize_is_invalid() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());

        assert_eq!(sge.send(&[0u8; 64]), Err(Error::Io(IoError::InvalidState)));
        assert_eq!(
            sge.send(&[0u8; BUF_SIZE + 1]),
            Err(Error::Dma(DmaError::FrameTooLarge))
        );
        let mut buf = [0u8; 64];
        assert_eq!(sge.receive(&mut buf), Err(Error::Io(IoError::InvalidState)));
    }

    #[test]
    fn send_accepts_full_buffer_and_rejects_one_more() {
        let regs = fast_full_board();
        let mut sge = running(&regs);

        assert_eq!(sge.send(&[0xa5; BUF_SIZE]), Ok(()));
        assert_eq!(
            sge.send(&[0xa5; BUF_SIZE + 1]),
            Err(Error::Dma(DmaError::FrameTooLarge))
        );
    }

    #[test]
    fn send_reports_busy_when_ring_full() {
        let regs = fast_full_board();
        let mut sge = running(&regs);

        for _ in 0..4 {
            assert_eq!(sge.send(&[1u8; 100]), Ok(()));
        }
        assert!(!sge.tx_ready());
        assert_eq!(sge.send(&[1u8; 100]), Err(Error::Io(IoError::Busy)));

        sge.dma_mut().unwrap().device_complete_tx(0, 0);
        assert_eq!(sge.send(&[1u8; 100]), Ok(()));
    }

    #[test]
    fn send_uses_full_duplex_command() {
        let regs = fast_full_board();
        let mut sge = running(&regs);

        sge.send(&[0u8; 64]).unwrap();
        let status = sge.dma_mut().unwrap().tx_status(0);
        assert_eq!(status & tx_cmd::BASE, tx_cmd::BASE);
        assert_eq!(status & tx_cmd::HALF_DUPLEX, 0);
        assert_eq!(status & tx_cmd::HALF_DUPLEX_GIGABIT, 0);
    }

    #[test]
    fn send_uses_half_duplex_command() {
        let regs = fast_full_board();
        regs.set_phy(PHY, reg::ANLPAR, ability::T);
        let mut sge = running(&regs);
        assert_eq!(
            sge.link_state().link(),
            Some(LinkStatus::new(Speed::Mbps10, Duplex::Half))
        );

        sge.send(&[0u8; 64]).unwrap();
        let status = sge.dma_mut().unwrap().tx_status(0);
        assert_eq!(status & tx_cmd::HALF_DUPLEX, tx_cmd::HALF_DUPLEX);
        assert_eq!(status & tx_cmd::HALF_DUPLEX_GIGABIT, 0);
    }

    #[test]
    fn send_uses_gigabit_half_duplex_command() {
        let regs = fast_full_board();
        regs.set_phy(PHY, reg::ANLPAR, 0x01e1 | ability::NP);
        regs.set_phy(PHY, reg::ANER, 0x0002);
        regs.set_phy(PHY, reg::GADV, gigabit::HALF);
        regs.set_phy(PHY, reg::GLPAR, gigabit::HALF << gigabit::PARTNER_SHIFT);
        let mut sge = sge_with(&regs, SIS191, SgeConfig::new());
        sge.initialize().unwrap();
        assert_eq!(
            sge.link_state().link(),
            Some(LinkStatus::new(Speed::Mbps1000, Duplex::Half))
        );

        sge.send(&[0u8; 64]).unwrap();
        let status = sge.dma_mut().unwrap().tx_status(0);
        assert_eq!(status & tx_cmd::HALF_DUPLEX, tx_cmd::HALF_DUPLEX);
        assert_eq!(
            status & tx_cmd::HALF_DUPLEX_GIGABIT,
            tx_cmd::HALF_DUPLEX_GIGABIT
        );
    }

    #[test]
    fn loopback_pads_short_frames() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        let payload: Vec<u8> = (1..=20).collect();

        sge.send(&payload).unwrap();
        let dma = sge.dma_mut().unwrap();
        dma.device_complete_tx(0, 0);
        let wire = dma.tx_frame(0).to_vec();
        dma.device_receive(0, &wire, rx_done::CRCOK);

        let mut buf = [0xffu8; 128];
        assert_eq!(sge.receive(&mut buf), Ok(MIN_FRAME_SIZE));
        assert_eq!(&buf[..20], &payload[..]);
        assert!(buf[20..MIN_FRAME_SIZE].iter().all(|&b| b == 0));
    }

    #[test]
    fn loopback_keeps_long_frames_intact() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        let payload: Vec<u8> = (0..1000).map(|i| i as u8).collect();

        sge.send(&payload).unwrap();
        let dma = sge.dma_mut().unwrap();
        let wire = dma.tx_frame(0).to_vec();
        dma.device_receive(0, &wire, rx_done::CRCOK);

        let mut buf = [0u8; BUF_SIZE];
        assert_eq!(sge.receive(&mut buf), Ok(1000));
        assert_eq!(&buf[..1000], &payload[..]);
    }

    #[test]
    fn crc_failures_are_dropped_and_counted() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        let dma = sge.dma_mut().unwrap();
        dma.device_receive(0, &[1u8; 64], 0);
        dma.device_receive(1, &[2u8; 64], 0);

        let mut buf = [0u8; 128];
        assert_eq!(sge.receive(&mut buf), Err(Error::Io(IoError::Empty)));
        assert_eq!(sge.receive(&mut buf), Err(Error::Io(IoError::Empty)));
        assert!(buf.iter().all(|&b| b == 0));
        assert!(!sge.rx_available());

        assert_eq!(sge.statistics().rx_errors, 0);
        assert_eq!(sge.tick().rx_errors, 2);
        assert_eq!(sge.statistics().rx_packets, 0);
    }

    #[test]
    fn tick_publishes_transmit_counters() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        sge.send(&[0u8; 100]).unwrap();
        sge.send(&[0u8; 10]).unwrap();

        let stats = sge.tick();
        assert_eq!(stats.tx_packets, 2);
        assert_eq!(stats.tx_bytes, 100 + MIN_FRAME_SIZE as u64);
        assert_eq!(sge.statistics(), stats);
    }

    // -------------------------------------------------------------------------
    // link_status
    // -------------------------------------------------------------------------

    #[test]
    fn link_status_reports_live_mode() {
        let regs = fast_full_board();
        let mut sge = running(&regs);

        assert_eq!(sge.link_status(), Ok(Some(LinkStatus::fast_full())));
        assert_eq!(regs.reg(STATION_CONTROL), 0x0400_1801);
    }

    #[test]
    fn link_status_follows_mode_change() {
        let regs = fast_full_board();
        let mut sge = running(&regs);

        regs.set_phy(PHY, reg::ANLPAR, ability::T);
        assert_eq!(
            sge.link_status(),
            Ok(Some(LinkStatus::new(Speed::Mbps10, Duplex::Half)))
        );
        assert_eq!(regs.reg(STATION_CONTROL), 0x0400_0401);
        assert_eq!(sge.link_state().duplex, Duplex::Half);
    }

    #[test]
    fn link_status_unblocks_send_after_timeout() {
        let regs = fast_full_board();
        regs.on_phy_reset(PHY, 0x7800);
        let mut sge = running(&regs);

        assert_eq!(sge.link_status(), Ok(None));
        assert!(!sge.link_state().autoneg_done);

        regs.set_phy(PHY, reg::STATUS, LINKED);
        assert_eq!(sge.link_status(), Ok(Some(LinkStatus::fast_full())));
        assert_eq!(sge.send(&[0u8; 64]), Ok(()));
    }

    #[test]
    fn link_status_requires_running() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());
        assert_eq!(sge.link_status(), Err(Error::Io(IoError::InvalidState)));
    }

    // -------------------------------------------------------------------------
    // handle_interrupt
    // -------------------------------------------------------------------------

    #[test]
    fn interrupt_acknowledges_and_decodes() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        regs.clear_writes();
        regs.set_reg(INTR_STATUS, intr::RX_DONE | intr::TX_DONE);

        let events = sge.handle_interrupt().unwrap();
        assert!(events.rx_available && events.tx_available);
        assert!(!events.link_changed);
        assert_eq!(
            regs.writes_to(INTR_STATUS),
            vec![intr::RX_DONE | intr::TX_DONE]
        );
        assert_eq!(regs.writes_to(INTR_MASK), vec![0, intr::RECOGNIZED]);
        assert_eq!(sge.host().irq.enable_calls.len(), 2);
    }

    #[test]
    fn interrupt_from_gone_device_still_rearms() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        regs.clear_writes();
        regs.set_reg(INTR_STATUS, 0xffff_ffff);

        assert_eq!(sge.handle_interrupt(), Ok(InterruptEvents::NONE));
        assert!(regs.writes_to(INTR_STATUS).is_empty());
        assert_eq!(regs.writes_to(INTR_MASK), vec![intr::RECOGNIZED]);
        assert_eq!(sge.host().irq.enable_calls.len(), 2);
    }

    #[test]
    fn foreign_interrupt_is_ignored() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        regs.set_reg(INTR_STATUS, intr::SOFT_INT);

        assert_eq!(sge.handle_interrupt(), Ok(InterruptEvents::NONE));
    }

    #[test]
    fn interrupt_before_initialize_is_ignored() {
        let regs = fast_full_board();
        let mut sge = sge_with(&regs, SIS190, SgeConfig::new());
        regs.set_reg(INTR_STATUS, intr::RX_DONE);

        assert_eq!(sge.handle_interrupt(), Ok(InterruptEvents::NONE));
        assert!(regs.writes().is_empty());
        assert!(sge.host().irq.enable_calls.is_empty());
    }

    #[test]
    fn interrupt_after_stop_keeps_device_masked() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        sge.stop();
        regs.clear_writes();
        regs.set_reg(INTR_STATUS, 0);

        assert_eq!(sge.handle_interrupt(), Ok(InterruptEvents::NONE));
        assert_eq!(regs.reg(INTR_MASK), 0);
        assert!(regs.writes().is_empty());
        assert_eq!(sge.host().irq.enable_calls.len(), 1);
    }

    #[test]
    fn interrupt_rearm_failure_is_reported() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        sge.host_mut().irq.fail_enable = true;
        regs.set_reg(INTR_STATUS, intr::LINK_CHANGE);

        assert_eq!(sge.handle_interrupt(), Err(Error::Io(IoError::IrqRearm)));
        assert_eq!(regs.reg(INTR_MASK), intr::RECOGNIZED);
    }

    // -------------------------------------------------------------------------
    // stop
    // -------------------------------------------------------------------------

    #[test]
    fn stop_resets_and_releases_memory() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        regs.clear_writes();

        sge.stop();
        assert_eq!(sge.state(), State::Stopped);
        assert_eq!(sge.host().dma.outstanding(), 0);
        assert!(!sge.link_state().autoneg_done);
        assert_eq!(regs.reg(INTR_MASK), 0);
        assert_eq!(regs.reg(INTR_CONTROL), 0);
        assert_eq!(regs.count_writes(INTR_CONTROL, intr_ctl::SOFT_DISABLE), 2);
        assert_eq!(regs.reg(TX_CONTROL), dma_ctl::TX_RESET_VALUE);
        assert_eq!(sge.send(&[0u8; 64]), Err(Error::Io(IoError::InvalidState)));
    }

    #[test]
    fn stop_waits_for_quiesce() {
        let regs = fast_full_board();
        let delay = MockDelay::new();
        let mut sge: TestSge =
            Sge::new(regs.clone(), delay.clone(), FakeHost::new(), SIS190, SgeConfig::new());
        sge.initialize().unwrap();
        delay.reset();

        sge.stop();
        assert_eq!(
            delay.total_us(),
            u64::from(RESET_PULSE_US + STOP_QUIESCE_US + STOP_PULSE_US)
        );
    }

    #[test]
    fn initialize_after_stop_restarts() {
        let regs = fast_full_board();
        let mut sge = running(&regs);
        sge.stop();

        assert_eq!(sge.initialize(), Ok(MAC));
        assert_eq!(sge.state(), State::Running);
        assert_eq!(sge.host().dma.outstanding(), 4);
        assert_eq!(sge.send(&[0u8; 64]), Ok(()));
    }

    #[test]
    fn capabilities_are_fixed() {
        let regs = fast_full_board();
        let sge = sge_with(&regs, SIS190, SgeConfig::new());
        let caps = sge.capabilities();
        assert!(caps.multicast && caps.broadcast && caps.settable_address);
    }
}
