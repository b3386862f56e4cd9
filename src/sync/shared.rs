//! ISR-safe controller slot using critical sections.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use crate::driver::error::Result;
use crate::driver::interrupt::InterruptEvents;
use crate::driver::sge::Sge;
use crate::hal::dma::DmaAllocator;
use crate::hal::irq::IrqLine;
use crate::hal::mmio::RegisterIo;
use crate::internal::constants::{RX_RING_LEN, TX_RING_LEN};

/// ISR-safe slot holding a controller.
///
/// The slot starts empty so it can live in a `static`; the controller is
/// moved in with [`install`](Self::install) once its resources exist. All
/// access goes through `critical_section::with()`, disabling interrupts for
/// the duration of the closure.
pub struct SharedSge<R, D, H, const RX: usize = RX_RING_LEN, const TX: usize = TX_RING_LEN>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    inner: Mutex<RefCell<Option<Sge<R, D, H, RX, TX>>>>,
}

/// Shared controller with the default ring lengths
pub type SharedSgeDefault<R, D, H> = SharedSge<R, D, H, RX_RING_LEN, TX_RING_LEN>;

impl<R, D, H, const RX: usize, const TX: usize> SharedSge<R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    /// Create an empty slot (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move a controller into the slot, returning the previous one
    pub fn install(&self, sge: Sge<R, D, H, RX, TX>) -> Option<Sge<R, D, H, RX, TX>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(sge))
    }

    /// Move the controller out of the slot
    pub fn take(&self) -> Option<Sge<R, D, H, RX, TX>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Whether a controller is installed
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Execute a closure with exclusive access to the controller.
    ///
    /// Returns `None` if the slot is empty.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside another `with` closure.
    #[inline]
    pub fn with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Sge<R, D, H, RX, TX>) -> T,
    {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Like [`with`](Self::with), but returns `None` instead of panicking
    /// when the controller is already borrowed.
    #[inline]
    pub fn try_with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Sge<R, D, H, RX, TX>) -> T,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .and_then(|mut slot| slot.as_mut().map(f))
        })
    }

    /// Run the interrupt handler of the installed controller
    pub fn handle_interrupt(&self) -> Option<Result<InterruptEvents>> {
        self.with(Sge::handle_interrupt)
    }
}

impl<R, D, H, const RX: usize, const TX: usize> Default for SharedSge<R, D, H, RX, TX>
where
    R: RegisterIo,
    D: DelayNs,
    H: DmaAllocator + IrqLine,
{
    fn default() -> Self {
        Self::new()
    }
}
