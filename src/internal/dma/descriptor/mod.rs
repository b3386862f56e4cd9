//! Hardware descriptor layout.
//!
//! Transmit and receive descriptors share a single 16-byte layout. The
//! `OWN` bit of the status word is the handoff between driver and device:
//! whichever side does not own a descriptor leaves every other field alone.

pub mod bits;

use bits::{common, rx_done, rx_flags, tx_done};

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: VolatileCell is safe to share because every access is a single
// volatile operation on an aligned u32.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Update the value using a function (read-modify-write)
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

/// One ring entry, as read and written by the device.
#[repr(C, align(16))]
pub(crate) struct Descriptor {
    /// Packet byte count
    pub(crate) pkt_size: VolatileCell<u32>,
    /// Ownership, interrupt request, command and completion bits
    pub(crate) status: VolatileCell<u32>,
    /// Bus address of the slot's buffer
    pub(crate) buf_ptr: VolatileCell<u32>,
    /// Buffer length and end-of-ring marker
    pub(crate) flags: VolatileCell<u32>,
}

impl Descriptor {
    /// Size of one descriptor in bytes
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Whether the device currently owns this descriptor
    #[inline(always)]
    pub fn is_owned(&self) -> bool {
        self.status.get() & common::OWN != 0
    }

    /// Zero every field
    pub fn clear(&self) {
        self.pkt_size.set(0);
        self.status.set(0);
        self.buf_ptr.set(0);
        self.flags.set(0);
    }

    // =========================================================================
    // Receive side
    // =========================================================================

    /// Prepare a receive descriptor and hand it to the device
    pub fn arm_rx(&self, buf_addr: u32, buf_len: usize, last: bool) {
        let mut flags = buf_len as u32 & rx_flags::LEN_MASK;
        if last {
            flags |= common::RING_END;
        }
        self.pkt_size.set(0);
        self.buf_ptr.set(buf_addr);
        self.flags.set(flags);
        self.give_rx();
    }

    /// Return a consumed receive descriptor to the device
    #[inline(always)]
    pub fn give_rx(&self) {
        self.pkt_size.set(0);
        self.status.set(common::OWN | common::INT);
    }

    /// Whether a completed receive descriptor holds a good frame
    #[inline(always)]
    pub fn rx_ok(&self) -> bool {
        let status = self.status.get();
        status & rx_done::CRCOK != 0 && status & rx_done::ERRORS == 0
    }

    /// Byte count of a completed receive descriptor
    #[inline(always)]
    pub fn rx_len(&self) -> usize {
        (self.pkt_size.get() & common::SIZE_MASK) as usize
    }

    /// Raw status word
    #[inline(always)]
    pub fn raw_status(&self) -> u32 {
        self.status.get()
    }

    // =========================================================================
    // Transmit side
    // =========================================================================

    /// Prepare an idle transmit descriptor
    pub fn init_tx(&self, last: bool) {
        self.clear();
        if last {
            self.flags.set(common::RING_END);
        }
    }

    /// Completion errors left by the device for the previous frame in this
    /// slot, as `(error, collisions)`
    #[inline]
    pub fn tx_completion(&self) -> (bool, u32) {
        let status = self.status.get();
        (
            status & tx_done::ERRORS != 0,
            status & tx_done::COLLISIONS,
        )
    }

    /// Fill a transmit descriptor and hand it to the device.
    ///
    /// Every field is written before the status word carrying `OWN`.
    pub fn submit_tx(&self, buf_addr: u32, len: usize, command: u32, last: bool) {
        let mut flags = len as u32 & common::SIZE_MASK;
        if last {
            flags |= common::RING_END;
        }
        self.pkt_size.set(len as u32);
        self.buf_ptr.set(buf_addr);
        self.flags.set(flags);
        self.status.set(command);
        core::sync::atomic::fence(core::sync::atomic::Ordering::Release);
        self.status.update(|s| s | common::OWN);
    }
}
