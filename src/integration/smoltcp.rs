//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Implements `smoltcp::phy::Device` for [`Sge`], so an initialized
//! controller can back a smoltcp `Interface` directly.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface};
//! use ph_sis190_mac::integration::smoltcp::ethernet_address;
//!
//! sge.initialize()?;
//! let config = Config::new(ethernet_address(&sge).into());
//! let mut iface = Interface::new(config, &mut sge, Instant::ZERO);
//! ```
//!
//! # Safety Notes
//!
//! smoltcp's `Device::receive()` hands out an RX token and a TX token at
//! the same time. Both tokens carry a raw pointer to the controller:
//!
//! 1. Tokens are consumed by value in the caller's stack frame, before any
//!    other access to the controller.
//! 2. RX and TX use separate descriptor rings and buffer pools.
//! 3. Only one token's `consume()` runs at a time.

use embedded_hal::delay::DelayNs;
use smoltcp::phy::{Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

use crate::driver::config::State;
use crate::driver::sge::Sge;
use crate::hal::dma::DmaAllocator;
use crate::hal::irq::IrqLine;
use crate::hal::mmio::RegisterIo;
use crate::internal::constants::{BUF_SIZE, ETH_HEADER_SIZE, MTU};

// =============================================================================
// RX Token
// =============================================================================

/// Receive token for smoltcp
///
/// Holds a raw pointer to the controller so it can coexist with the TX
/// token smoltcp receives alongside it.
pub struct SgeRxToken<'a, R, D, H, const RX: usize, const TX: usize>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    sge: *mut Sge<R, D, H, RX, TX>,
    _marker: core::marker::PhantomData<&'a mut Sge<R, D, H, RX, TX>>,
}

impl<R, D, H, const RX: usize, const TX: usize> smoltcp::phy::RxToken
    for SgeRxToken<'_, R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    fn consume<T, F>(self, f: F) -> T
    where
        F: FnOnce(&[u8]) -> T,
    {
        let mut buffer = [0u8; BUF_SIZE];

        // SAFETY: valid for 'a; the token is consumed by value and RX/TX
        // rings are separate.
        let sge = unsafe { &mut *self.sge };

        // A dropped bad frame yields an empty slice; smoltcp ignores it.
        let len = sge.receive(&mut buffer).unwrap_or_default();
        f(&buffer[..len])
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Transmit token for smoltcp
pub struct SgeTxToken<'a, R, D, H, const RX: usize, const TX: usize>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    sge: *mut Sge<R, D, H, RX, TX>,
    _marker: core::marker::PhantomData<&'a mut Sge<R, D, H, RX, TX>>,
}

impl<R, D, H, const RX: usize, const TX: usize> smoltcp::phy::TxToken
    for SgeTxToken<'_, R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    fn consume<T, F>(self, len: usize, f: F) -> T
    where
        F: FnOnce(&mut [u8]) -> T,
    {
        let len = len.min(BUF_SIZE);
        let mut buffer = [0u8; BUF_SIZE];
        let result = f(&mut buffer[..len]);

        // SAFETY: valid for 'a; the token is consumed by value and TX/RX
        // rings are separate.
        let sge = unsafe { &mut *self.sge };

        if sge.send(&buffer[..len]).is_err() {
            warn!("smoltcp: dropped {} byte frame", len);
        }
        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<R, D, H, const RX: usize, const TX: usize> Device for Sge<R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    type RxToken<'a>
        = SgeRxToken<'a, R, D, H, RX, TX>
    where
        Self: 'a;
    type TxToken<'a>
        = SgeTxToken<'a, R, D, H, RX, TX>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if self.state() != State::Running || !self.rx_available() {
            return None;
        }

        let self_ptr = self as *mut Self;
        Some((
            SgeRxToken {
                sge: self_ptr,
                _marker: core::marker::PhantomData,
            },
            SgeTxToken {
                sge: self_ptr,
                _marker: core::marker::PhantomData,
            },
        ))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.state() != State::Running || !self.tx_ready() {
            return None;
        }

        Some(SgeTxToken {
            sge: self as *mut Self,
            _marker: core::marker::PhantomData,
        })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        // smoltcp counts the Ethernet header in the MTU of an Ethernet medium
        caps.max_transmission_unit = MTU + ETH_HEADER_SIZE;
        caps.max_burst_size = Some(1);
        caps
    }
}

/// Station address as a smoltcp `EthernetAddress`
pub fn ethernet_address<R, D, H, const RX: usize, const TX: usize>(
    sge: &Sge<R, D, H, RX, TX>,
) -> smoltcp::wire::EthernetAddress
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    smoltcp::wire::EthernetAddress(sge.station_address())
}
