//! Testing utilities and mock implementations
//!
//! This module provides fakes for running the driver on the host without
//! hardware: a register file that simulates the PHY management bus and the
//! EEPROM, a heap-backed DMA allocator and a recording interrupt line.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::collections::HashMap;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::driver::error::Result;
use crate::hal::dma::{DmaAllocator, DmaRegion};
use crate::hal::irq::{IrqError, IrqLine};
use crate::hal::mdio::MdioBus;
use crate::hal::mmio::RegisterIo;
use crate::internal::constants::MAC_ADDR_LEN;
use crate::internal::phy_regs::{control, reg};
use crate::internal::register::offset::{GMII_CONTROL, ROM_INTERFACE, RX_MAC_ADDR, WINDOW_SIZE};
use crate::internal::register::{eeprom, gmii};

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting. Clones share
/// the same counter, so a copy handed to the driver can still be inspected.
#[derive(Debug, Default, Clone)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    /// Reset the delay counter
    pub fn reset(&self) {
        self.total_ns.set(0);
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }
}

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// Mock MDIO bus for testing PHY logic without a register file
///
/// Unset registers read as zero, so unpopulated addresses look empty to a
/// bus scan.
///
/// # Example
///
/// ```ignore
/// let mut mdio = MockMdioBus::new();
/// mdio.set_register(1, reg::STATUS, 0x7825);
/// let outcome = negotiate(&mut mdio, ChipModel::Sis190, &mut phys)?;
/// ```
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
    /// Delay source for polls between transfers
    delay: MockDelay,
}

impl MockMdioBus {
    /// Create a new mock MDIO bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value
    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    /// Get all writes that have been made
    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }

    /// Clear the write log
    pub fn clear_writes(&self) {
        self.write_log.borrow_mut().clear();
    }

    /// Microseconds spent in delays between transfers
    pub fn total_us(&self) -> u64 {
        self.delay.total_us()
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Ok(self.get_register(phy_addr, reg_addr).unwrap_or(0))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log
            .borrow_mut()
            .push((phy_addr, reg_addr, value));
        self.set_register(phy_addr, reg_addr, value);
        Ok(())
    }
}

impl DelayNs for MockMdioBus {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }
}

// =============================================================================
// Fake Register File
// =============================================================================

#[derive(Debug, Default)]
struct RegisterFile {
    words: [u32; WINDOW_SIZE / 4],
    phys: HashMap<(u8, u8), u16>,
    reset_status: HashMap<u8, u16>,
    eeprom: HashMap<u16, u16>,
    mii_busy_polls: u32,
    mii_busy_left: u32,
    eeprom_busy_polls: u32,
    eeprom_busy_left: u32,
    writes: Vec<(usize, u32)>,
}

impl RegisterFile {
    fn phy_present(&self, addr: u8) -> bool {
        self.phys.keys().any(|&(a, _)| a == addr)
    }

    fn phy(&self, addr: u8, reg_addr: u8) -> u16 {
        match self.phys.get(&(addr, reg_addr)) {
            Some(&v) => v,
            None if self.phy_present(addr) => 0,
            None => 0xffff,
        }
    }

    fn mii_command(&mut self, cmd: u32) {
        let addr = ((cmd >> gmii::PHY_SHIFT) & 0x1f) as u8;
        let reg_addr = ((cmd >> gmii::REG_SHIFT) & 0x1f) as u8;
        let data = if cmd & gmii::WRITE != 0 {
            let mut value = (cmd >> gmii::DATA_SHIFT) as u16;
            if reg_addr == reg::CONTROL && value & control::RESET != 0 {
                value &= !control::RESET;
                if let Some(&status) = self.reset_status.get(&addr) {
                    self.phys.insert((addr, reg::STATUS), status);
                }
            }
            self.phys.insert((addr, reg_addr), value);
            value
        } else {
            self.phy(addr, reg_addr)
        };
        self.words[GMII_CONTROL / 4] = (u32::from(data) << gmii::DATA_SHIFT) | (cmd & 0xffff & !gmii::REQ);
        self.mii_busy_left = self.mii_busy_polls;
    }

    fn eeprom_command(&mut self, cmd: u32) {
        let word = ((cmd >> eeprom::OFFSET_SHIFT) & 0x3f) as u16;
        let data = self.eeprom.get(&word).copied().unwrap_or(0);
        self.words[ROM_INTERFACE / 4] =
            (u32::from(data) << eeprom::DATA_SHIFT) | (cmd & 0xffff & !eeprom::REQ);
        self.eeprom_busy_left = self.eeprom_busy_polls;
    }

    fn read_word(&mut self, index: usize) -> u32 {
        let offset = index * 4;
        let value = self.words[index];
        if offset == GMII_CONTROL && self.mii_busy_left > 0 {
            self.mii_busy_left -= 1;
            return value | gmii::REQ;
        }
        if offset == ROM_INTERFACE && self.eeprom_busy_left > 0 {
            self.eeprom_busy_left -= 1;
            return value | eeprom::REQ;
        }
        value
    }
}

/// Register window with a simulated PHY bank and EEPROM behind it.
///
/// Cloning yields another handle to the same register file, so a test can
/// hand one copy to the driver and inspect state through another.
///
/// - Writing a command with `REQ` to `GMIICONTROL` performs the transfer
///   against the PHY bank. Addresses with no register set read `0xffff`.
///   A `CONTROL` write with `RESET` self-clears and optionally replaces the
///   PHY's status (see [`on_phy_reset`](Self::on_phy_reset)).
/// - Writing a command with `REQ` to `ROMINTERFACE` reads the EEPROM word.
/// - Every write is logged.
#[derive(Debug, Default, Clone)]
pub struct FakeRegisters {
    inner: Rc<RefCell<RegisterFile>>,
}

impl FakeRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 32-bit register value, bypassing the busy simulation
    pub fn reg(&self, offset: usize) -> u32 {
        self.inner.borrow().words[offset / 4]
    }

    /// Set a register without logging a write
    pub fn set_reg(&self, offset: usize, value: u32) {
        self.inner.borrow_mut().words[offset / 4] = value;
    }

    pub fn set_phy(&self, addr: u8, reg_addr: u8, value: u16) {
        self.inner.borrow_mut().phys.insert((addr, reg_addr), value);
    }

    pub fn phy(&self, addr: u8, reg_addr: u8) -> u16 {
        self.inner.borrow().phy(addr, reg_addr)
    }

    /// Status the PHY at `addr` reports once it has been reset
    pub fn on_phy_reset(&self, addr: u8, status: u16) {
        self.inner.borrow_mut().reset_status.insert(addr, status);
    }

    /// Number of polls that still see `REQ` after each management command
    pub fn set_mii_busy_polls(&self, polls: u32) {
        self.inner.borrow_mut().mii_busy_polls = polls;
    }

    pub fn set_eeprom(&self, word: u16, value: u16) {
        self.inner.borrow_mut().eeprom.insert(word, value);
    }

    pub fn eeprom(&self, word: u16) -> u16 {
        self.inner.borrow().eeprom.get(&word).copied().unwrap_or(0)
    }

    /// Number of polls that still see `REQ` after each EEPROM command
    pub fn set_eeprom_busy_polls(&self, polls: u32) {
        self.inner.borrow_mut().eeprom_busy_polls = polls;
    }

    /// Store a station address in EEPROM words 3..5, low byte first
    pub fn set_station_address_eeprom(&self, addr: [u8; MAC_ADDR_LEN]) {
        for (i, pair) in addr.chunks_exact(2).enumerate() {
            self.set_eeprom(
                eeprom::MAC_ADDR + i as u16,
                u16::from_le_bytes([pair[0], pair[1]]),
            );
        }
    }

    /// Station address as held in the per-byte address registers
    pub fn station_address(&self) -> [u8; MAC_ADDR_LEN] {
        let inner = self.inner.borrow();
        let mut addr = [0u8; MAC_ADDR_LEN];
        for (i, byte) in addr.iter_mut().enumerate() {
            let offset = RX_MAC_ADDR + i;
            *byte = inner.words[offset / 4].to_le_bytes()[offset % 4];
        }
        addr
    }

    /// Every write as `(offset, value)`, oldest first
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.inner.borrow().writes.clone()
    }

    /// Values written to `offset`, oldest first
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.inner
            .borrow()
            .writes
            .iter()
            .filter(|&&(o, _)| o == offset)
            .map(|&(_, v)| v)
            .collect()
    }

    /// How many times `value` was written to `offset`
    pub fn count_writes(&self, offset: usize, value: u32) -> usize {
        self.inner
            .borrow()
            .writes
            .iter()
            .filter(|&&(o, v)| o == offset && v == value)
            .count()
    }

    pub fn clear_writes(&self) {
        self.inner.borrow_mut().writes.clear();
    }
}

impl RegisterIo for FakeRegisters {
    fn read32(&mut self, offset: usize) -> u32 {
        self.inner.borrow_mut().read_word(offset / 4)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.writes.push((offset, value));
        match offset {
            GMII_CONTROL if value & gmii::REQ != 0 => inner.mii_command(value),
            ROM_INTERFACE if value & eeprom::REQ != 0 => inner.eeprom_command(value),
            _ => inner.words[offset / 4] = value,
        }
    }

    fn read16(&mut self, offset: usize) -> u16 {
        let word = self.inner.borrow_mut().read_word(offset / 4);
        let shift = (offset % 4) * 8;
        (word >> shift) as u16
    }

    fn write16(&mut self, offset: usize, value: u16) {
        let mut inner = self.inner.borrow_mut();
        inner.writes.push((offset, u32::from(value)));
        let shift = (offset % 4) * 8;
        let word = &mut inner.words[offset / 4];
        *word = (*word & !(0xffff << shift)) | (u32::from(value) << shift);
    }

    fn write8(&mut self, offset: usize, value: u8) {
        let mut inner = self.inner.borrow_mut();
        inner.writes.push((offset, u32::from(value)));
        let shift = (offset % 4) * 8;
        let word = &mut inner.words[offset / 4];
        *word = (*word & !(0xff << shift)) | (u32::from(value) << shift);
    }
}

// =============================================================================
// Heap DMA Allocator
// =============================================================================

/// DMA allocator backed by the test process heap.
///
/// Bus addresses are synthetic: each region gets the next free address
/// above the configured base, aligned like the request.
#[derive(Debug)]
pub struct HeapDmaAllocator {
    next_bus: u64,
    live: Vec<(DmaRegion, Layout)>,
    remaining: Option<usize>,
}

impl Default for HeapDmaAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapDmaAllocator {
    pub fn new() -> Self {
        Self::with_bus_base(0x0010_0000)
    }

    /// Hand out bus addresses starting at `base`
    pub fn with_bus_base(base: u64) -> Self {
        Self {
            next_bus: base,
            live: Vec::new(),
            remaining: None,
        }
    }

    /// Succeed `count` more times, then fail every allocation
    pub fn fail_after(&mut self, count: usize) {
        self.remaining = Some(count);
    }

    /// Regions allocated and not yet freed
    pub fn outstanding(&self) -> usize {
        self.live.len()
    }
}

fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

impl DmaAllocator for HeapDmaAllocator {
    fn alloc_contiguous(&mut self, size: usize, align: usize) -> Option<DmaRegion> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }

        let layout = Layout::from_size_align(size.max(1), align).ok()?;
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return None;
        }

        let bus = align_up(self.next_bus, align as u64);
        self.next_bus = bus + align_up(size as u64, align as u64);

        // SAFETY: ptr is a fresh, zeroed allocation of `size` bytes.
        let region = unsafe { DmaRegion::new(ptr, bus, size) };
        self.live.push((region, layout));
        Some(region)
    }

    unsafe fn free_contiguous(&mut self, region: DmaRegion) {
        if let Some(pos) = self
            .live
            .iter()
            .position(|(r, _)| r.cpu_ptr() == region.cpu_ptr())
        {
            let (r, layout) = self.live.swap_remove(pos);
            // SAFETY: allocated in `alloc_contiguous` with this layout.
            unsafe { dealloc(r.cpu_ptr(), layout) };
        }
    }
}

impl Drop for HeapDmaAllocator {
    fn drop(&mut self) {
        for (region, layout) in self.live.drain(..) {
            // SAFETY: allocated in `alloc_contiguous` with this layout.
            unsafe { dealloc(region.cpu_ptr(), layout) };
        }
    }
}

// =============================================================================
// Fake Interrupt Line
// =============================================================================

/// Interrupt line that records calls and can be told to fail
#[derive(Debug, Default)]
pub struct FakeIrq {
    pub policy_calls: Vec<u8>,
    pub enable_calls: Vec<u8>,
    pub fail_policy: bool,
    pub fail_enable: bool,
}

impl IrqLine for FakeIrq {
    fn set_policy(&mut self, irq: u8) -> core::result::Result<(), IrqError> {
        self.policy_calls.push(irq);
        if self.fail_policy { Err(IrqError) } else { Ok(()) }
    }

    fn enable(&mut self, irq: u8) -> core::result::Result<(), IrqError> {
        self.enable_calls.push(irq);
        if self.fail_enable { Err(IrqError) } else { Ok(()) }
    }
}

/// Host services for a driver under test
#[derive(Debug, Default)]
pub struct FakeHost {
    pub dma: HeapDmaAllocator,
    pub irq: FakeIrq,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DmaAllocator for FakeHost {
    fn alloc_contiguous(&mut self, size: usize, align: usize) -> Option<DmaRegion> {
        self.dma.alloc_contiguous(size, align)
    }

    unsafe fn free_contiguous(&mut self, region: DmaRegion) {
        // SAFETY: forwarded contract.
        unsafe { self.dma.free_contiguous(region) }
    }
}

impl IrqLine for FakeHost {
    fn set_policy(&mut self, irq: u8) -> core::result::Result<(), IrqError> {
        self.irq.set_policy(irq)
    }

    fn enable(&mut self, irq: u8) -> core::result::Result<(), IrqError> {
        self.irq.enable(irq)
    }
}
