//! Serial EEPROM access
//!
//! The factory EEPROM is read once during initialization to obtain the
//! station address and the board information word. The protocol mirrors the
//! management bus: write a command carrying the word offset and `REQ`, then
//! wait (without a deadline) for hardware to clear `REQ`.

use embedded_hal::delay::DelayNs;

use super::mmio::RegisterIo;
use super::poll::Poll;
use crate::internal::constants::{EEPROM_POLL_INTERVAL_US, EEPROM_SETTLE_US, MAC_ADDR_LEN};
use crate::internal::register::eeprom;
use crate::internal::register::offset::ROM_INTERFACE;

/// EEPROM reader borrowing the register window and delay source
pub struct Eeprom<'a, R: RegisterIo, D: DelayNs> {
    regs: &'a mut R,
    delay: &'a mut D,
}

impl<'a, R: RegisterIo, D: DelayNs> Eeprom<'a, R, D> {
    /// Borrow the register window and delay for EEPROM reads
    pub fn new(regs: &'a mut R, delay: &'a mut D) -> Self {
        Self { regs, delay }
    }

    /// Read one 16-bit word
    pub fn read(&mut self, offset: u16) -> u16 {
        let command = eeprom::REQ | eeprom::READ | ((offset as u32) << eeprom::OFFSET_SHIFT);
        self.regs.write32(ROM_INTERFACE, command);
        self.delay.delay_us(EEPROM_SETTLE_US);

        let mut last = 0;
        Poll::unbounded(EEPROM_POLL_INTERVAL_US).until(self, |rom| {
            last = rom.regs.read32(ROM_INTERFACE);
            last & eeprom::REQ == 0
        });
        (last >> eeprom::DATA_SHIFT) as u16
    }

    /// Read the factory station address (words 3..5, low byte first)
    pub fn station_address(&mut self) -> [u8; MAC_ADDR_LEN] {
        let mut addr = [0u8; MAC_ADDR_LEN];
        for (i, pair) in addr.chunks_exact_mut(2).enumerate() {
            let word = self.read(eeprom::MAC_ADDR + i as u16);
            pair.copy_from_slice(&word.to_le_bytes());
        }
        addr
    }

    /// Whether the board information word marks an RGMII board
    pub fn is_rgmii(&mut self) -> bool {
        self.read(eeprom::INFO) & eeprom::INFO_RGMII != 0
    }
}

impl<R: RegisterIo, D: DelayNs> DelayNs for Eeprom<'_, R, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRegisters, MockDelay};

    #[test]
    fn read_returns_word_after_settle() {
        let mut regs = FakeRegisters::new();
        regs.set_eeprom(eeprom::SIGNATURE, 0xa55a);
        let mut delay = MockDelay::new();

        let word = Eeprom::new(&mut regs, &mut delay).read(eeprom::SIGNATURE);
        assert_eq!(word, 0xa55a);
        assert_eq!(delay.total_us(), EEPROM_SETTLE_US as u64);
    }

    #[test]
    fn read_polls_with_longer_interval() {
        let mut regs = FakeRegisters::new();
        regs.set_eeprom(eeprom::CLOCK, 0x0001);
        regs.set_eeprom_busy_polls(2);
        let mut delay = MockDelay::new();

        Eeprom::new(&mut regs, &mut delay).read(eeprom::CLOCK);
        assert_eq!(
            delay.total_us(),
            (EEPROM_SETTLE_US + 2 * EEPROM_POLL_INTERVAL_US) as u64
        );
    }

    #[test]
    fn station_address_is_low_byte_first() {
        let mut regs = FakeRegisters::new();
        regs.set_station_address_eeprom([0x00, 0x07, 0x95, 0xa1, 0xb2, 0xc3]);
        let mut delay = MockDelay::new();

        let addr = Eeprom::new(&mut regs, &mut delay).station_address();
        assert_eq!(addr, [0x00, 0x07, 0x95, 0xa1, 0xb2, 0xc3]);
        assert_eq!(regs.eeprom(eeprom::MAC_ADDR), 0x0700);
    }

    #[test]
    fn rgmii_flag_comes_from_info_word() {
        let mut regs = FakeRegisters::new();
        let mut delay = MockDelay::new();
        assert!(!Eeprom::new(&mut regs, &mut delay).is_rgmii());

        regs.set_eeprom(eeprom::INFO, eeprom::INFO_RGMII);
        assert!(Eeprom::new(&mut regs, &mut delay).is_rgmii());
    }
}
