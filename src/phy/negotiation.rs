//! Link negotiation state machine
//!
//! Runs once per initialization:
//!
//! ```text
//! Scanning -> PhySelected -> Resetting -> AwaitingLink -> AwaitingAutoneg -> Negotiated
//!    |                           |             |                |
//!    v                           |             v                v
//! NoTransceiver                  |      LinkDownTimeout   AutonegIncomplete
//!                                +-- (no link at reset) --> AwaitingAutoneg
//! ```
//!
//! Each [`Negotiator::step`] performs the work of the current state and moves
//! to the next one. Only `NoTransceiver` is fatal to the caller; the two
//! timeout states leave the link down with transmission suspended.

use embedded_hal::delay::DelayNs;

use super::generic::{LinkStatus, PhyRecord, PhyTable, read_status, resolve_link};
use crate::driver::config::ChipModel;
use crate::driver::error::{ConfigError, Result};
use crate::hal::mdio::MdioBus;
use crate::hal::poll::Poll;
use crate::internal::constants::{
    AUTONEG_ATTEMPTS, AUTONEG_INTERVAL_US, LINK_STABLE_ATTEMPTS, LINK_STABLE_INTERVAL_US,
    PHY_ADDR_COUNT,
};
use crate::internal::phy_regs::{control, reg, status};

/// Negotiation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NegotiationState {
    /// Probing every bus address for a transceiver
    Scanning,
    /// Choosing the PHY to use and isolating the rest
    PhySelected,
    /// Resetting the chosen PHY and restarting autonegotiation
    Resetting,
    /// Waiting for the link bit to come back after the reset
    AwaitingLink,
    /// Waiting for autonegotiation to complete
    AwaitingAutoneg,
    /// Link resolved; the MAC can be programmed
    Negotiated,
    /// No PHY answered on the bus
    NoTransceiver,
    /// The link did not return after the PHY reset
    LinkDownTimeout,
    /// Autonegotiation did not complete, or the link dropped before it did
    AutonegIncomplete,
}

impl NegotiationState {
    /// Whether no further step will change the state
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Negotiated | Self::NoTransceiver | Self::LinkDownTimeout | Self::AutonegIncomplete
        )
    }
}

/// Outcome of a full negotiation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Negotiation {
    /// Terminal state reached
    pub state: NegotiationState,
    /// Resolved link, present only in `Negotiated`
    pub link: Option<LinkStatus>,
    /// Whether the chosen PHY reported link when the bus was scanned
    pub phy_had_link: bool,
}

impl Negotiation {
    /// Whether an RGMII board should recalibrate its delay line
    pub const fn wants_delay_calibration(&self) -> bool {
        self.phy_had_link
            && matches!(
                self.state,
                NegotiationState::Negotiated | NegotiationState::AutonegIncomplete
            )
    }
}

/// Step-wise driver for [`NegotiationState`]
pub struct Negotiator<'t> {
    model: ChipModel,
    phys: &'t mut PhyTable,
    state: NegotiationState,
    link: Option<LinkStatus>,
}

impl<'t> Negotiator<'t> {
    /// Start a negotiation that records discovered PHYs in `phys`
    pub fn new(model: ChipModel, phys: &'t mut PhyTable) -> Self {
        Self {
            model,
            phys,
            state: NegotiationState::Scanning,
            link: None,
        }
    }

    /// Current state
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Perform the current state's work and advance
    pub fn step<B: MdioBus + DelayNs>(&mut self, bus: &mut B) -> Result<NegotiationState> {
        self.state = match self.state {
            NegotiationState::Scanning => self.scan(bus)?,
            NegotiationState::PhySelected => self.select(bus)?,
            NegotiationState::Resetting => self.reset(bus)?,
            NegotiationState::AwaitingLink => self.await_link(bus)?,
            NegotiationState::AwaitingAutoneg => self.await_autoneg(bus)?,
            terminal => terminal,
        };
        Ok(self.state)
    }

    /// Step until a terminal state
    pub fn run<B: MdioBus + DelayNs>(mut self, bus: &mut B) -> Result<Negotiation> {
        while !self.state.is_terminal() {
            self.step(bus)?;
        }
        Ok(Negotiation {
            state: self.state,
            link: self.link,
            phy_had_link: self.phys.current().is_some_and(PhyRecord::had_link),
        })
    }

    fn current_addr(&self) -> Result<u8> {
        self.phys
            .current()
            .map(|p| p.addr)
            .ok_or_else(|| ConfigError::NoTransceiver.into())
    }

    fn scan<B: MdioBus>(&mut self, bus: &mut B) -> Result<NegotiationState> {
        self.phys.clear();

        for addr in 0..PHY_ADDR_COUNT as u8 {
            let phy_status = read_status(bus, addr)?;
            if phy_status == status::ABSENT_ONES || phy_status == status::ABSENT_ZEROS {
                continue;
            }

            let id0 = bus.read(addr, reg::ID0)?;
            let id1 = bus.read(addr, reg::ID1)?;
            let record = PhyRecord::new(addr, id0, id1, phy_status);
            match record.name() {
                Some(name) => debug!("PHY {} at address {}: status {:#x}", name, addr, phy_status),
                None => debug!(
                    "PHY {:#x}:{:#x} at address {}: status {:#x}",
                    id0,
                    id1,
                    addr,
                    phy_status
                ),
            }
            self.phys.push(record);
        }

        if self.phys.is_empty() {
            error!("no transceiver found");
            return Ok(NegotiationState::NoTransceiver);
        }
        Ok(NegotiationState::PhySelected)
    }

    fn select<B: MdioBus>(&mut self, bus: &mut B) -> Result<NegotiationState> {
        let mut chosen = None;

        for index in 0..self.phys.len() {
            let Some(addr) = self.phys.get(index).map(|p| p.addr) else {
                continue;
            };
            let phy_status = read_status(bus, addr)?;
            if chosen.is_none() && phy_status & status::LINK != 0 {
                chosen = Some(index);
            } else {
                bus.modify(addr, reg::CONTROL, |v| v | control::AUTO | control::ISOLATE)?;
            }
        }

        self.phys.select(chosen.unwrap_or(0));
        let addr = self.current_addr()?;

        bus.modify(addr, reg::CONTROL, |v| v & !control::ISOLATE)?;
        read_status(bus, addr)?;

        debug!("using PHY at address {}", addr);
        Ok(NegotiationState::Resetting)
    }

    fn reset<B: MdioBus>(&mut self, bus: &mut B) -> Result<NegotiationState> {
        let addr = self.current_addr()?;
        let phy_status = read_status(bus, addr)?;
        bus.write(
            addr,
            reg::CONTROL,
            control::RESET | control::AUTO | control::RST_AUTO,
        )?;

        if phy_status & status::LINK != 0 {
            Ok(NegotiationState::AwaitingLink)
        } else {
            Ok(NegotiationState::AwaitingAutoneg)
        }
    }

    fn await_link<B: MdioBus + DelayNs>(&mut self, bus: &mut B) -> Result<NegotiationState> {
        let addr = self.current_addr()?;
        let mut pending = status::LINK;
        let mut failure = None;

        let outcome = Poll::bounded(LINK_STABLE_ATTEMPTS, LINK_STABLE_INTERVAL_US).until(bus, |b| {
            match b.read(addr, reg::STATUS) {
                Ok(v) => pending ^= v & pending,
                Err(e) => failure = Some(e),
            }
            failure.is_some() || pending == 0
        });
        if let Some(e) = failure {
            return Err(e);
        }

        if outcome.is_ready() {
            Ok(NegotiationState::AwaitingAutoneg)
        } else {
            warn!("PHY reset, media down");
            Ok(NegotiationState::LinkDownTimeout)
        }
    }

    fn await_autoneg<B: MdioBus + DelayNs>(&mut self, bus: &mut B) -> Result<NegotiationState> {
        let addr = self.current_addr()?;

        if bus.read(addr, reg::STATUS)? & status::LINK == 0 {
            warn!("link down, autonegotiation not attempted");
            return Ok(NegotiationState::AutonegIncomplete);
        }

        let mut failure = None;
        let outcome = Poll::bounded(AUTONEG_ATTEMPTS, AUTONEG_INTERVAL_US).until(bus, |b| {
            match b.read(addr, reg::STATUS) {
                Ok(v) => v & status::AUTO_DONE != 0,
                Err(e) => {
                    failure = Some(e);
                    true
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        if !outcome.is_ready() {
            warn!("autonegotiation incomplete");
            return Ok(NegotiationState::AutonegIncomplete);
        }

        self.link = resolve_link(bus, addr, self.model)?;
        match self.link {
            Some(link) => {
                info!(
                    "link up: {} Mb/s, {:?} duplex",
                    link.speed.as_mbps(),
                    link.duplex
                );
                Ok(NegotiationState::Negotiated)
            }
            None => {
                warn!("link lost during autonegotiation");
                Ok(NegotiationState::AutonegIncomplete)
            }
        }
    }
}

/// Run a full negotiation on `bus`.
///
/// Discovered PHYs are left in `phys` with the chosen one current.
pub fn negotiate<B: MdioBus + DelayNs>(
    bus: &mut B,
    model: ChipModel,
    phys: &mut PhyTable,
) -> Result<Negotiation> {
    Negotiator::new(model, phys).run(bus)
}

// =============================================================================
// Tests
// =============================================================================
