//! DMA descriptor bit field constants.
//!
//! Transmit and receive descriptors share one layout; the meaning of the
//! status word depends on the ring and on who wrote it last.

/// Bits common to both rings
pub mod common {
    /// Descriptor is owned by the device
    pub const OWN: u32 = 0x8000_0000;
    /// Raise an interrupt when the device releases the descriptor
    pub const INT: u32 = 0x4000_0000;
    /// Last descriptor of the ring (flags word)
    pub const RING_END: u32 = 0x8000_0000;
    /// Packet byte count field (pkt_size word)
    pub const SIZE_MASK: u32 = 0x0000_ffff;
}

/// Transmit command bits (status word, written by the driver)
pub mod tx_cmd {
    /// Pad short frames
    pub const PADEN: u32 = 0x0001_0000;
    /// Append CRC
    pub const CRCEN: u32 = 0x0002_0000;
    /// Collision detection (half duplex)
    pub const COLSEN: u32 = 0x0004_0000;
    /// Carrier sense (half duplex)
    pub const CRSEN: u32 = 0x0008_0000;
    /// Backoff (half duplex)
    pub const BKFEN: u32 = 0x0010_0000;
    /// Deferral
    pub const DEFEN: u32 = 0x0020_0000;
    /// Carrier extension (half duplex, 1000 Mb/s)
    pub const EXTEN: u32 = 0x0040_0000;
    /// Frame bursting (half duplex, 1000 Mb/s)
    pub const BSTEN: u32 = 0x0080_0000;
    /// Transmit threshold
    pub const THOL3: u32 = 0x3000_0000;

    /// Command bits used on every frame
    pub const BASE: u32 = PADEN | CRCEN | DEFEN | THOL3 | super::common::INT;
    /// Added in half duplex
    pub const HALF_DUPLEX: u32 = COLSEN | CRSEN | BKFEN;
    /// Added in half duplex at 1000 Mb/s
    pub const HALF_DUPLEX_GIGABIT: u32 = EXTEN | BSTEN;
}

/// Transmit completion bits (status word, written by the device)
pub mod tx_done {
    /// Any transmit error (late collision, abort, FIFO underrun, carrier loss)
    pub const ERRORS: u32 = 0x000f_0000;
    /// Collision count
    pub const COLLISIONS: u32 = 0x0000_ffff;
}

/// Receive completion bits (status word, written by the device)
pub mod rx_done {
    /// Frame passed the CRC check
    pub const CRCOK: u32 = 0x0001_0000;
    /// Collision seen during reception
    pub const COLON: u32 = 0x0002_0000;
    /// Odd nibble count (dribble bits)
    pub const NIBON: u32 = 0x0004_0000;
    /// Receive FIFO overrun
    pub const OVRUN: u32 = 0x0008_0000;
    /// MII receive error
    pub const MIIER: u32 = 0x0010_0000;
    /// Frame longer than the size limit
    pub const LIMIT: u32 = 0x0020_0000;
    /// Runt frame
    pub const SHORT: u32 = 0x0040_0000;
    /// Reception aborted
    pub const ABORT: u32 = 0x0080_0000;

    /// Any receive error
    pub const ERRORS: u32 = ABORT | SHORT | LIMIT | MIIER | OVRUN | NIBON | COLON;
}

/// Receive buffer length field (flags word)
pub mod rx_flags {
    /// Buffer length must be a multiple of 8
    pub const LEN_MASK: u32 = 0xfff8;
}
