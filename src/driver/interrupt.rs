//! Interrupt status decoding and event dispatch.
//!
//! The interrupt handler never calls back into the send or receive paths
//! itself. It decodes the status register into [`InterruptEvents`], which
//! the caller acts on through the same public entry points used outside
//! interrupt context, optionally via an [`EventHandler`].

use crate::internal::register::intr;

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from the interrupt status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// A frame was transmitted
    pub tx_done: bool,
    /// The transmit queue ran empty
    pub tx_idle: bool,
    /// A frame was received
    pub rx_done: bool,
    /// The receive queue ran empty
    pub rx_idle: bool,
    /// The transmit engine halted
    pub tx_halt: bool,
    /// The receive engine halted
    pub rx_halt: bool,
    /// PHY link state changed
    pub link_change: bool,
}

impl InterruptStatus {
    /// Create from raw status register value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            tx_done: (status & intr::TX_DONE) != 0,
            tx_idle: (status & intr::TX_IDLE) != 0,
            rx_done: (status & intr::RX_DONE) != 0,
            rx_idle: (status & intr::RX_IDLE) != 0,
            tx_halt: (status & intr::TX_HALT) != 0,
            rx_halt: (status & intr::RX_HALT) != 0,
            link_change: (status & intr::LINK_CHANGE) != 0,
        }
    }

    /// Whether a raw status value should be handled at all.
    ///
    /// All-ones means the device is gone; a value with no recognized bit set
    /// belongs to another device sharing the line.
    #[inline]
    pub fn is_actionable(raw: u32) -> bool {
        raw != intr::DEVICE_GONE && raw & intr::RECOGNIZED != 0
    }

    /// Events implied by this status
    #[inline]
    pub fn events(&self) -> InterruptEvents {
        InterruptEvents {
            tx_available: self.tx_done || self.tx_idle,
            rx_available: self.rx_done || self.rx_idle,
            link_changed: self.link_change,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// What the caller should do after an interrupt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptEvents {
    /// Transmit slots may have been reclaimed; retry pending sends
    pub tx_available: bool,
    /// Received frames may be waiting; call `receive` until `Empty`
    pub rx_available: bool,
    /// Link state changed; query `link_status`
    pub link_changed: bool,
}

impl InterruptEvents {
    /// No events
    pub const NONE: Self = Self {
        tx_available: false,
        rx_available: false,
        link_changed: false,
    };

    /// Whether any event is set
    #[inline]
    pub fn any(&self) -> bool {
        self.tx_available || self.rx_available || self.link_changed
    }

    /// Invoke the matching handler callbacks, transmit first
    pub fn dispatch<H: EventHandler + ?Sized>(&self, handler: &mut H) {
        if self.tx_available {
            handler.on_tx_available();
        }
        if self.rx_available {
            handler.on_rx_available();
        }
        if self.link_changed {
            handler.on_link_change();
        }
    }
}

/// Callbacks for interrupt events
pub trait EventHandler {
    /// Transmit slots may be free again
    fn on_tx_available(&mut self) {}

    /// Received frames may be waiting
    fn on_rx_available(&mut self) {}

    /// Link state changed
    fn on_link_change(&mut self) {}
}

// =============================================================================
// Tests
// =============================================================================
