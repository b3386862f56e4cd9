//! DMA engine managing TX/RX descriptor rings and buffers.

use super::descriptor::bits::tx_cmd;
#[cfg(test)]
use super::descriptor::Descriptor;
use super::ring::{BufferPool, DescriptorRing};
use crate::driver::config::{Duplex, Speed};
use crate::driver::error::{DmaError, DmaResult, IoError, Result};
use crate::driver::stats::Counters;
use crate::hal::dma::{DmaAllocator, DmaRegion};
use crate::hal::mmio::RegisterIo;
use crate::internal::constants::{BUF_SIZE, DMA_ALIGN, MIN_FRAME_SIZE};
use crate::internal::register::dma_ctl;
use crate::internal::register::offset::{RX_CONTROL, RX_DESC_START, TX_CONTROL, TX_DESC_START};

/// Transmit command word for the current link mode
pub(crate) fn tx_command(speed: Speed, duplex: Duplex) -> u32 {
    let mut command = tx_cmd::BASE;
    if duplex == Duplex::Half {
        command |= tx_cmd::HALF_DUPLEX;
        if speed == Speed::Mbps1000 {
            command |= tx_cmd::HALF_DUPLEX_GIGABIT;
        }
    }
    command
}

/// DMA engine over host-allocated rings and buffer pools.
///
/// # Type Parameters
/// * `RX` - Number of receive descriptors/buffers
/// * `TX` - Number of transmit descriptors/buffers
pub(crate) struct DmaEngine<const RX: usize, const TX: usize> {
    /// RX descriptor ring
    rx_ring: DescriptorRing<RX>,
    /// TX descriptor ring
    tx_ring: DescriptorRing<TX>,
    /// RX data buffers
    rx_pool: BufferPool<RX>,
    /// TX data buffers
    tx_pool: BufferPool<TX>,
}

impl<const RX: usize, const TX: usize> DmaEngine<RX, TX> {
    /// Total DMA memory used by the rings and pools, in bytes.
    pub const fn memory_usage() -> usize {
        DescriptorRing::<RX>::BYTES
            + DescriptorRing::<TX>::BYTES
            + BufferPool::<RX>::BYTES
            + BufferPool::<TX>::BYTES
    }

    /// Allocate both rings and both buffer pools from the host.
    ///
    /// On failure every region obtained so far is handed back.
    pub fn allocate<A: DmaAllocator>(host: &mut A) -> DmaResult<Self> {
        let sizes = [
            DescriptorRing::<RX>::BYTES,
            DescriptorRing::<TX>::BYTES,
            BufferPool::<RX>::BYTES,
            BufferPool::<TX>::BYTES,
        ];
        let mut regions: [Option<DmaRegion>; 4] = [None; 4];

        for (i, size) in sizes.into_iter().enumerate() {
            let error = match host.alloc_contiguous(size, DMA_ALIGN) {
                Some(region) if region.bus_addr_u32().is_some() => {
                    regions[i] = Some(region);
                    continue;
                }
                Some(region) => {
                    // SAFETY: just allocated, never shared with the device.
                    unsafe { host.free_contiguous(region) };
                    DmaError::AddressOutOfRange
                }
                None => DmaError::AllocationFailed,
            };
            for region in regions.iter_mut().filter_map(Option::take) {
                // SAFETY: as above.
                unsafe { host.free_contiguous(region) };
            }
            return Err(error);
        }

        let [Some(rx_ring), Some(tx_ring), Some(rx_pool), Some(tx_pool)] = regions else {
            return Err(DmaError::AllocationFailed);
        };
        Ok(Self {
            rx_ring: DescriptorRing::new(rx_ring),
            tx_ring: DescriptorRing::new(tx_ring),
            rx_pool: BufferPool::new(rx_pool),
            tx_pool: BufferPool::new(tx_pool),
        })
    }

    /// Hand every region back to the host.
    ///
    /// # Safety
    ///
    /// The device must have been reset so it no longer reads or writes the
    /// rings or buffers.
    pub unsafe fn release<A: DmaAllocator>(self, host: &mut A) {
        // SAFETY: regions came from `host` in `allocate`; caller guarantees
        // the device is quiescent.
        unsafe {
            host.free_contiguous(self.rx_ring.into_region());
            host.free_contiguous(self.tx_ring.into_region());
            host.free_contiguous(self.rx_pool.into_region());
            host.free_contiguous(self.tx_pool.into_region());
        }
    }

    /// Initialize descriptors and program the ring base registers.
    ///
    /// Every RX descriptor is handed to the device with its buffer attached;
    /// every TX descriptor starts empty and software-owned.
    pub fn init<R: RegisterIo>(&mut self, regs: &mut R) {
        self.rx_ring.reset();
        self.tx_ring.reset();

        for i in 0..RX {
            let desc = self.rx_ring.get(i);
            desc.clear();
            desc.arm_rx(self.rx_pool.bus_addr(i), BUF_SIZE, self.rx_ring.is_last(i));
        }
        for i in 0..TX {
            self.tx_ring.get(i).init_tx(self.tx_ring.is_last(i));
        }

        regs.write32(TX_DESC_START, self.tx_ring.base_addr_u32());
        regs.write32(RX_DESC_START, self.rx_ring.base_addr_u32());
    }

    /// Check if the next TX slot is free
    pub fn tx_available(&self) -> bool {
        !self.tx_ring.current().is_owned()
    }

    /// Check if the next RX slot holds a completed frame
    pub fn rx_pending(&self) -> bool {
        !self.rx_ring.current().is_owned()
    }

    /// Queue one frame for transmission.
    ///
    /// Frames shorter than the Ethernet minimum are zero padded.
    ///
    /// # Errors
    /// - `FrameTooLarge` - Frame exceeds the per-slot buffer
    /// - `Busy` - The slot at the cursor is still owned by the device
    pub fn transmit<R: RegisterIo>(
        &mut self,
        regs: &mut R,
        data: &[u8],
        command: u32,
        counters: &mut Counters,
    ) -> Result<()> {
        if data.len() > BUF_SIZE {
            return Err(DmaError::FrameTooLarge.into());
        }

        let index = self.tx_ring.current_index();
        let desc = self.tx_ring.current();
        if desc.is_owned() {
            return Err(IoError::Busy.into());
        }

        let (failed, collisions) = desc.tx_completion();
        if failed {
            counters.tx_errors += 1;
        }
        counters.collisions += u64::from(collisions);

        let frame_len = data.len().max(MIN_FRAME_SIZE);
        let buf = self.tx_pool.slot_mut(index);
        buf[..data.len()].copy_from_slice(data);
        buf[data.len()..frame_len].fill(0);

        desc.submit_tx(
            self.tx_pool.bus_addr(index),
            frame_len,
            command,
            self.tx_ring.is_last(index),
        );
        self.tx_ring.advance();
        regs.set_bits32(TX_CONTROL, dma_ctl::POLL);

        counters.tx_packets += 1;
        counters.tx_bytes += frame_len as u64;
        Ok(())
    }

    /// Take one frame from the RX ring into `buffer`.
    ///
    /// A frame longer than `buffer` is truncated. A frame the device flagged
    /// as bad is dropped, counted and its slot recycled.
    ///
    /// # Errors
    /// - `Empty` - No good frame at the cursor
    pub fn receive<R: RegisterIo>(
        &mut self,
        regs: &mut R,
        buffer: &mut [u8],
        counters: &mut Counters,
    ) -> Result<usize> {
        let index = self.rx_ring.current_index();
        let desc = self.rx_ring.current();
        if desc.is_owned() {
            return Err(IoError::Empty.into());
        }

        if !desc.rx_ok() {
            warn!("rx: dropping frame, status={:#x}", desc.raw_status());
            counters.rx_errors += 1;
            desc.give_rx();
            self.rx_ring.advance();
            regs.set_bits32(RX_CONTROL, dma_ctl::POLL);
            return Err(IoError::Empty.into());
        }

        let len = desc.rx_len().min(BUF_SIZE).min(buffer.len());
        buffer[..len].copy_from_slice(&self.rx_pool.slot(index)[..len]);
        desc.give_rx();
        self.rx_ring.advance();
        regs.set_bits32(RX_CONTROL, dma_ctl::POLL);

        counters.rx_packets += 1;
        counters.rx_bytes += len as u64;
        Ok(len)
    }
}

// =============================================================================
// Device-side simulation (tests only)
// =============================================================================

#[cfg(test)]
impl<const RX: usize, const TX: usize> DmaEngine<RX, TX> {
    /// Number of TX slots currently held by the device
    pub fn tx_in_flight(&self) -> usize {
        self.tx_ring.iter().filter(|d| d.is_owned()).count()
    }

    /// Command and status word of TX slot `index`
    pub fn tx_status(&self, index: usize) -> u32 {
        self.tx_ring.get(index).raw_status()
    }

    /// Play the device: fill RX slot `index` and release it to software
    pub fn device_receive(&mut self, index: usize, frame: &[u8], status: u32) {
        self.rx_pool.slot_mut(index)[..frame.len()].copy_from_slice(frame);
        let desc = self.rx_ring.get(index);
        desc.pkt_size.set(frame.len() as u32);
        desc.status.set(status);
    }

    /// Play the device: complete TX slot `index` with `status`
    pub fn device_complete_tx(&self, index: usize, status: u32) {
        self.tx_ring.get(index).status.set(status);
    }

    /// Frame bytes queued in TX slot `index`, as the device would fetch them
    pub fn tx_frame(&self, index: usize) -> &[u8] {
        let len = self.tx_ring.get(index).pkt_size.get() as usize;
        &self.tx_pool.slot(index)[..len]
    }

    pub fn rx_desc(&self, index: usize) -> &Descriptor {
        self.rx_ring.get(index)
    }

    pub fn tx_desc(&self, index: usize) -> &Descriptor {
        self.tx_ring.get(index)
    }

    pub fn ring_bases(&self) -> (u32, u32) {
        (self.tx_ring.base_addr_u32(), self.rx_ring.base_addr_u32())
    }
}

// =============================================================================
// Tests
// =============================================================================
