//! Traffic and error counters.
//!
//! The send and receive paths tally into [`Counters`] as they go; the
//! periodic [`tick`](crate::Sge::tick) publishes them as a [`Statistics`]
//! snapshot without touching the device.

/// Published traffic and error counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Statistics {
    /// Frames delivered to the caller
    pub rx_packets: u64,
    /// Bytes delivered to the caller
    pub rx_bytes: u64,
    /// Frames dropped for CRC or other receive errors
    pub rx_errors: u64,
    /// Frames queued for transmission
    pub tx_packets: u64,
    /// Bytes queued for transmission, including padding
    pub tx_bytes: u64,
    /// Frames the device reported as failed
    pub tx_errors: u64,
    /// Collisions reported by the device
    pub collisions: u64,
}

/// Live counters updated on the data path
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub rx_errors: u64,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub tx_errors: u64,
    pub collisions: u64,
}

impl Counters {
    /// Snapshot for publication
    pub fn publish(&self) -> Statistics {
        Statistics {
            rx_packets: self.rx_packets,
            rx_bytes: self.rx_bytes,
            rx_errors: self.rx_errors,
            tx_packets: self.tx_packets,
            tx_bytes: self.tx_bytes,
            tx_errors: self.tx_errors,
            collisions: self.collisions,
        }
    }
}
