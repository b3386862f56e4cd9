//! MII management bus HAL
//!
//! The SiS 190/191 exposes the PHY management interface through a single
//! command register, `GMIICONTROL`. A request is started by writing the PHY
//! and register address together with the `REQ` bit; hardware clears `REQ`
//! when the transfer is done and, for reads, leaves the 16-bit result in the
//! upper half of the same register.
//!
//! Completion is awaited without a deadline: the management interface is
//! assumed to always finish.

use embedded_hal::delay::DelayNs;

use super::mmio::RegisterIo;
use super::poll::Poll;
use crate::driver::error::{ConfigError, Result};
use crate::internal::constants::{
    MAX_PHY_ADDR, MAX_REG_ADDR, MII_POLL_INTERVAL_US, MII_READ_SETTLE_US, MII_WRITE_SETTLE_US,
};
use crate::internal::register::gmii;
use crate::internal::register::offset::GMII_CONTROL;

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MII management bus operations
///
/// This trait can be implemented by different backends, allowing link
/// negotiation to run against the real controller or a simulated PHY bank.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Read-modify-write a PHY register
    fn modify(&mut self, phy_addr: u8, reg_addr: u8, f: impl FnOnce(u16) -> u16) -> Result<()> {
        let value = self.read(phy_addr, reg_addr)?;
        self.write(phy_addr, reg_addr, f(value))
    }
}

// =============================================================================
// GMII Controller
// =============================================================================

/// Management bus driven through the MAC's `GMIICONTROL` register.
///
/// Borrows the register window and the delay source for the duration of a
/// sequence of transfers. It also forwards [`DelayNs`] so callers that poll
/// PHY state between transfers can use the same handle.
pub struct GmiiBus<'a, R: RegisterIo, D: DelayNs> {
    regs: &'a mut R,
    delay: &'a mut D,
}

impl<'a, R: RegisterIo, D: DelayNs> GmiiBus<'a, R, D> {
    /// Borrow the register window and delay for management transfers
    pub fn new(regs: &'a mut R, delay: &'a mut D) -> Self {
        Self { regs, delay }
    }

    /// Issue a command and block until hardware clears `REQ`.
    ///
    /// Returns the last value read from the register.
    fn transfer(&mut self, command: u32, settle_us: u32) -> u32 {
        self.regs.write32(GMII_CONTROL, command);
        self.delay.delay_us(settle_us);

        let mut last = 0;
        Poll::unbounded(MII_POLL_INTERVAL_US).until(self, |bus| {
            last = bus.regs.read32(GMII_CONTROL);
            last & gmii::REQ == 0
        });
        last
    }
}

/// Build the `GMIICONTROL` command word for a transfer
#[inline]
pub(crate) const fn build_command(phy_addr: u8, reg_addr: u8, write: Option<u16>) -> u32 {
    let mut cmd = gmii::REQ
        | ((phy_addr as u32 & 0x1f) << gmii::PHY_SHIFT)
        | ((reg_addr as u32 & 0x1f) << gmii::REG_SHIFT);
    match write {
        Some(value) => cmd |= gmii::WRITE | ((value as u32) << gmii::DATA_SHIFT),
        None => cmd |= gmii::READ,
    }
    cmd
}

fn check_addr(phy_addr: u8, reg_addr: u8) -> Result<()> {
    if phy_addr > MAX_PHY_ADDR || reg_addr > MAX_REG_ADDR {
        return Err(ConfigError::InvalidPhyAddress.into());
    }
    Ok(())
}

impl<R: RegisterIo, D: DelayNs> MdioBus for GmiiBus<'_, R, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        check_addr(phy_addr, reg_addr)?;
        let last = self.transfer(build_command(phy_addr, reg_addr, None), MII_READ_SETTLE_US);
        Ok(((last & gmii::DATA_MASK) >> gmii::DATA_SHIFT) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        check_addr(phy_addr, reg_addr)?;
        self.transfer(
            build_command(phy_addr, reg_addr, Some(value)),
            MII_WRITE_SETTLE_US,
        );
        Ok(())
    }
}

impl<R: RegisterIo, D: DelayNs> DelayNs for GmiiBus<'_, R, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

// =============================================================================
// Tests
// =============================================================================
