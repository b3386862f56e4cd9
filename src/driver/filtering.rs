//! Receive filtering and station address for [`Sge`].
//!
//! The MAC has no per-group multicast filter worth programming: any mode
//! that accepts multicast opens the 64-bit hash table completely. Frames
//! addressed to the station address are always accepted.
//!
//! | Mode             | `RXMACCONTROL` bits                  |
//! |------------------|--------------------------------------|
//! | unicast          | `MYPHYS`                             |
//! | broadcast        | `MYPHYS | BCAST`                     |
//! | multicast        | `MYPHYS | BCAST | MCAST`             |
//! | promiscuous      | `MYPHYS | BCAST | MCAST | ALLPHYS`   |

use embedded_hal::delay::DelayNs;

use super::config::RxFilterMode;
use super::sge::Sge;
use crate::hal::dma::DmaAllocator;
use crate::hal::irq::IrqLine;
use crate::hal::mmio::RegisterIo;
use crate::internal::constants::MAC_ADDR_LEN;
use crate::internal::register::offset::{RX_HASH_TABLE, RX_HASH_TABLE2, RX_MAC_ADDR, RX_MAC_CONTROL};
use crate::internal::register::rx_mac;

/// `RXMACCONTROL` filter bits for `mode`
fn filter_bits(mode: RxFilterMode) -> u16 {
    let mut bits = rx_mac::MYPHYS;
    if mode.promiscuous {
        bits |= rx_mac::BCAST | rx_mac::MCAST | rx_mac::ALLPHYS;
    } else if mode.multicast_list || mode.all_multicast {
        bits |= rx_mac::BCAST | rx_mac::MCAST;
    } else if mode.broadcast {
        bits |= rx_mac::BCAST;
    }
    bits
}

impl<R, D, H, const RX: usize, const TX: usize> Sge<R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    /// Select which frames the receiver accepts.
    ///
    /// # Example
    /// ```ignore
    /// sge.set_filter_mode(RxFilterMode::BROADCAST.with_all_multicast(true));
    /// ```
    pub fn set_filter_mode(&mut self, mode: RxFilterMode) {
        let ctl = self.clear_filter_bits() | filter_bits(mode);
        self.regs.write16(RX_MAC_CONTROL, ctl);
        self.open_hash_table();
        debug!("sge: rx filter {:#x}", ctl & rx_mac::FILTER_MASK);
    }

    /// Program a new station address.
    ///
    /// Filtering is stopped while the address bytes are written and comes
    /// back as own-address plus broadcast.
    pub fn set_station_address(&mut self, addr: [u8; MAC_ADDR_LEN]) {
        let ctl = self.clear_filter_bits();

        for (i, &byte) in addr.iter().enumerate() {
            self.regs.write8(RX_MAC_ADDR + i, byte);
        }

        self.regs
            .write16(RX_MAC_CONTROL, ctl | rx_mac::MYPHYS | rx_mac::BCAST);
        self.open_hash_table();
        self.station_address = addr;
    }

    /// Clear the filter bits in hardware; returns the remaining control bits
    fn clear_filter_bits(&mut self) -> u16 {
        let ctl = self.regs.read16(RX_MAC_CONTROL) & !rx_mac::FILTER_MASK;
        self.regs.write16(RX_MAC_CONTROL, ctl);
        ctl
    }

    fn open_hash_table(&mut self) {
        self.regs.write32(RX_HASH_TABLE, rx_mac::HASH_ACCEPT_ALL);
        self.regs.write32(RX_HASH_TABLE2, rx_mac::HASH_ACCEPT_ALL);
    }
}

// =============================================================================
// Tests
// =============================================================================
