//! Register window access
//!
//! [`RegisterIo`] is the seam between the driver and the device's control
//! registers. The driver only ever addresses registers by byte offset from
//! the start of the window; [`MmioWindow`] is the production implementation
//! over a mapped PCI BAR, and tests substitute a simulated register file.

use core::ptr::NonNull;

use crate::internal::register::offset::WINDOW_SIZE;

/// Offset-indexed access to the device register window.
///
/// Every access must reach the device: implementations backed by memory
/// must use volatile reads and writes so polling loops observe fresh values.
pub trait RegisterIo {
    /// Read a 32-bit register
    fn read32(&mut self, offset: usize) -> u32;

    /// Write a 32-bit register
    fn write32(&mut self, offset: usize, value: u32);

    /// Read a 16-bit register
    fn read16(&mut self, offset: usize) -> u16;

    /// Write a 16-bit register
    fn write16(&mut self, offset: usize, value: u16);

    /// Write an 8-bit register
    fn write8(&mut self, offset: usize, value: u8);

    /// Read-modify-write a 32-bit register
    #[inline]
    fn modify32<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }

    /// Set bits in a 32-bit register
    #[inline]
    fn set_bits32(&mut self, offset: usize, bits: u32) {
        self.modify32(offset, |v| v | bits);
    }

    /// Clear bits in a 32-bit register
    #[inline]
    fn clear_bits32(&mut self, offset: usize, bits: u32) {
        self.modify32(offset, |v| v & !bits);
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    #[inline]
    fn read32(&mut self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }

    #[inline]
    fn read16(&mut self, offset: usize) -> u16 {
        (**self).read16(offset)
    }

    #[inline]
    fn write16(&mut self, offset: usize, value: u16) {
        (**self).write16(offset, value);
    }

    #[inline]
    fn write8(&mut self, offset: usize, value: u8) {
        (**self).write8(offset, value);
    }
}

/// Bounds-checked view of a memory-mapped register window.
///
/// Owns the `(base, len)` pair handed over by the PCI resource provider and
/// only permits naturally aligned accesses that lie entirely inside it.
/// An out-of-range access trips a debug assertion; release builds ignore
/// the write or read back `0`.
#[derive(Debug)]
pub struct MmioWindow {
    base: NonNull<u8>,
    len: usize,
}

impl MmioWindow {
    /// Wrap a mapped register window.
    ///
    /// Returns `None` if `base` is null or the window is smaller than the
    /// device's register block.
    ///
    /// # Safety
    ///
    /// `base` must point to the device's mapped BAR 0, valid for volatile
    /// reads and writes of `len` bytes for as long as the window lives, and
    /// no other code may access the same registers concurrently.
    pub unsafe fn new(base: *mut u8, len: usize) -> Option<Self> {
        let base = NonNull::new(base)?;
        if len < WINDOW_SIZE {
            return None;
        }
        Some(Self { base, len })
    }

    /// Length of the mapped window in bytes
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty (never true for a constructed window)
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn checked(&self, offset: usize, width: usize) -> Option<*mut u8> {
        let in_range = offset.checked_add(width).is_some_and(|end| end <= self.len);
        let aligned = offset % width == 0;
        debug_assert!(in_range, "register offset {offset:#x} outside window");
        debug_assert!(aligned, "register offset {offset:#x} misaligned");
        if in_range && aligned {
            // SAFETY: offset + width is inside the mapped window.
            Some(unsafe { self.base.as_ptr().add(offset) })
        } else {
            None
        }
    }
}

// SAFETY: the window is exclusively owned; moving it to another context
// moves the only handle to the registers.
unsafe impl Send for MmioWindow {}

impl RegisterIo for MmioWindow {
    #[inline]
    fn read32(&mut self, offset: usize) -> u32 {
        match self.checked(offset, 4) {
            // SAFETY: in-range, aligned, device memory per `new`'s contract.
            Some(ptr) => unsafe { core::ptr::read_volatile(ptr.cast::<u32>()) },
            None => 0,
        }
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) {
        if let Some(ptr) = self.checked(offset, 4) {
            // SAFETY: see read32.
            unsafe { core::ptr::write_volatile(ptr.cast::<u32>(), value) }
        }
    }

    #[inline]
    fn read16(&mut self, offset: usize) -> u16 {
        match self.checked(offset, 2) {
            // SAFETY: see read32.
            Some(ptr) => unsafe { core::ptr::read_volatile(ptr.cast::<u16>()) },
            None => 0,
        }
    }

    #[inline]
    fn write16(&mut self, offset: usize, value: u16) {
        if let Some(ptr) = self.checked(offset, 2) {
            // SAFETY: see read32.
            unsafe { core::ptr::write_volatile(ptr.cast::<u16>(), value) }
        }
    }

    #[inline]
    fn write8(&mut self, offset: usize, value: u8) {
        if let Some(ptr) = self.checked(offset, 1) {
            // SAFETY: see read32.
            unsafe { core::ptr::write_volatile(ptr, value) }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
