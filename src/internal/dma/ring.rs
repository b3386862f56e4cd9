//! Descriptor rings and buffer pools in host DMA memory.

use super::descriptor::Descriptor;
use crate::hal::dma::DmaRegion;
use crate::internal::constants::BUF_SIZE;

/// Circular descriptor ring with wraparound index.
///
/// The descriptors live in a [`DmaRegion`] of at least
/// `N * Descriptor::SIZE` bytes.
pub(crate) struct DescriptorRing<const N: usize> {
    /// Backing memory
    region: DmaRegion,
    /// Current index for processing
    current: usize,
}

impl<const N: usize> DescriptorRing<N> {
    /// Bytes needed to hold the ring
    pub const BYTES: usize = N * Descriptor::SIZE;

    /// Wrap a region that is at least [`Self::BYTES`] long and 16-byte
    /// aligned.
    pub fn new(region: DmaRegion) -> Self {
        debug_assert!(region.size() >= Self::BYTES);
        debug_assert!(region.cpu_ptr() as usize % core::mem::align_of::<Descriptor>() == 0);
        Self { region, current: 0 }
    }

    /// Get the number of descriptors in the ring
    #[cfg(test)]
    #[inline(always)]
    pub const fn len(&self) -> usize {
        N
    }

    /// Get the current index
    #[inline(always)]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Whether `index` is the last entry (carries the end-of-ring marker)
    #[inline(always)]
    pub const fn is_last(&self, index: usize) -> bool {
        index + 1 == N
    }

    /// Advance the current index by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % N;
    }

    /// Reset the current index to 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Get a reference to the current descriptor
    #[inline(always)]
    pub fn current(&self) -> &Descriptor {
        self.get(self.current)
    }

    /// Get a reference to a descriptor at a specific index
    #[inline(always)]
    pub fn get(&self, index: usize) -> &Descriptor {
        let index = index % N;
        // SAFETY: the region holds N aligned descriptors (checked in `new`)
        // and stays allocated for the ring's lifetime.
        unsafe { &*self.region.cpu_ptr().cast::<Descriptor>().add(index) }
    }

    /// Bus address of the first descriptor
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.region.bus_addr() as u32
    }

    /// Iterate over all descriptors
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        (0..N).map(move |i| self.get(i))
    }

    /// Give back the backing region
    pub fn into_region(self) -> DmaRegion {
        self.region
    }
}

/// Fixed-size packet buffers, one per ring slot, in one contiguous region.
pub(crate) struct BufferPool<const N: usize> {
    region: DmaRegion,
}

impl<const N: usize> BufferPool<N> {
    /// Bytes needed to hold the pool
    pub const BYTES: usize = N * BUF_SIZE;

    /// Wrap a region that is at least [`Self::BYTES`] long
    pub fn new(region: DmaRegion) -> Self {
        debug_assert!(region.size() >= Self::BYTES);
        Self { region }
    }

    /// Bus address of slot `index`
    #[inline(always)]
    pub fn bus_addr(&self, index: usize) -> u32 {
        (self.region.bus_addr() as u32).wrapping_add(((index % N) * BUF_SIZE) as u32)
    }

    /// Read access to slot `index`
    #[inline]
    pub fn slot(&self, index: usize) -> &[u8] {
        // SAFETY: slot lies inside the region; callers only touch slots the
        // driver owns.
        unsafe { core::slice::from_raw_parts(self.slot_ptr(index), BUF_SIZE) }
    }

    /// Write access to slot `index`
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        // SAFETY: as `slot`, and `&mut self` prevents aliasing from the CPU.
        unsafe { core::slice::from_raw_parts_mut(self.slot_ptr(index), BUF_SIZE) }
    }

    #[inline(always)]
    fn slot_ptr(&self, index: usize) -> *mut u8 {
        // SAFETY: (index % N) * BUF_SIZE < N * BUF_SIZE <= region size.
        unsafe { self.region.cpu_ptr().add((index % N) * BUF_SIZE) }
    }

    /// Give back the backing region
    pub fn into_region(self) -> DmaRegion {
        self.region
    }
}

// =============================================================================
// Tests
// =============================================================================
