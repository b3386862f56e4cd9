//! Host DMA memory provider
//!
//! Rings and buffer pools live in physically contiguous, device-visible
//! memory obtained from the host. [`DmaRegion`] records both views of such a
//! block: the CPU pointer the driver writes through and the bus address the
//! device is programmed with.

/// A contiguous DMA-capable memory block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaRegion {
    cpu_ptr: *mut u8,
    bus_addr: u64,
    size: usize,
}

// SAFETY: the region is plain memory; ownership is tracked by whoever
// holds the `DmaRegion`.
unsafe impl Send for DmaRegion {}

impl DmaRegion {
    /// Describe an allocated block.
    ///
    /// # Safety
    ///
    /// `cpu_ptr` must be valid for reads and writes of `size` bytes until
    /// the region is handed back to [`DmaAllocator::free_contiguous`], and
    /// `bus_addr` must be the device-visible address of the same memory.
    pub const unsafe fn new(cpu_ptr: *mut u8, bus_addr: u64, size: usize) -> Self {
        Self {
            cpu_ptr,
            bus_addr,
            size,
        }
    }

    /// CPU-side pointer to the start of the block
    #[inline]
    pub const fn cpu_ptr(&self) -> *mut u8 {
        self.cpu_ptr
    }

    /// Device-visible address of the start of the block
    #[inline]
    pub const fn bus_addr(&self) -> u64 {
        self.bus_addr
    }

    /// Size in bytes
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// 32-bit bus address, if the whole block is reachable by a 32-bit
    /// DMA master
    #[inline]
    pub fn bus_addr_u32(&self) -> Option<u32> {
        let end = self.bus_addr.checked_add(self.size as u64)?;
        if end <= u64::from(u32::MAX) + 1 {
            Some(self.bus_addr as u32)
        } else {
            None
        }
    }
}

/// Host-side allocator for contiguous DMA memory
pub trait DmaAllocator {
    /// Allocate `size` bytes aligned to `align`, zero-filled.
    ///
    /// Returns `None` when the host cannot satisfy the request.
    fn alloc_contiguous(&mut self, size: usize, align: usize) -> Option<DmaRegion>;

    /// Return a block obtained from [`alloc_contiguous`](Self::alloc_contiguous).
    ///
    /// # Safety
    ///
    /// `region` must come from this allocator, must not be freed twice, and
    /// the device must no longer be accessing it.
    unsafe fn free_contiguous(&mut self, region: DmaRegion);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_addr_u32_accepts_low_memory() {
        let region = unsafe { DmaRegion::new(core::ptr::null_mut(), 0x0010_0000, 4096) };
        assert_eq!(region.bus_addr_u32(), Some(0x0010_0000));
    }

    #[test]
    fn bus_addr_u32_accepts_block_ending_at_4g() {
        let region = unsafe { DmaRegion::new(core::ptr::null_mut(), 0xffff_f000, 4096) };
        assert_eq!(region.bus_addr_u32(), Some(0xffff_f000));
    }

    #[test]
    fn bus_addr_u32_rejects_block_crossing_4g() {
        let region = unsafe { DmaRegion::new(core::ptr::null_mut(), 0xffff_f000, 8192) };
        assert_eq!(region.bus_addr_u32(), None);
    }
}
