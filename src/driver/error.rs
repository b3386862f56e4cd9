//! Error types for the SiS 190/191 driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization failures (fatal for the device)
//! - [`DmaError`]: DMA memory and frame-size violations
//! - [`IoError`]: Runtime conditions the caller retries or reports
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods. Link timeouts are not errors: they surface as a
//! down link from [`link_status`](crate::Sge::link_status) and as `Busy`
//! from [`send`](crate::Sge::send).

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors abort [`initialize`](crate::Sge::initialize); the device is
/// left reset with no DMA memory held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// PCI vendor/device ID is not a SiS 190 or 191
    NoDevice,
    /// Register window could not be mapped or is too small
    RegisterWindow,
    /// Host refused to configure or enable the interrupt line
    IrqSetup,
    /// No PHY answered on the management bus
    NoTransceiver,
    /// Station address lives in the southbridge (APC) and cannot be read
    UnsupportedAddressSource,
    /// Invalid PHY or register address (must be 0-31)
    InvalidPhyAddress,
    /// Station address text is not six hex bytes
    InvalidStationAddress,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::NoDevice => "no supported device",
            ConfigError::RegisterWindow => "register window unavailable",
            ConfigError::IrqSetup => "interrupt line setup failed",
            ConfigError::NoTransceiver => "no PHY transceiver found",
            ConfigError::UnsupportedAddressSource => "APC station address unsupported",
            ConfigError::InvalidPhyAddress => "invalid PHY address",
            ConfigError::InvalidStationAddress => "invalid station address",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// DMA memory and frame errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Host could not provide contiguous DMA memory
    AllocationFailed,
    /// DMA memory is not reachable by the device's 32-bit bus master
    AddressOutOfRange,
    /// Frame too large for the per-slot buffer
    FrameTooLarge,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::AllocationFailed => "DMA allocation failed",
            DmaError::AddressOutOfRange => "DMA address above 4 GiB",
            DmaError::FrameTooLarge => "frame too large for buffers",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime TX/RX conditions
///
/// `Busy` and `Empty` mean "try again later", typically after the next
/// interrupt event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// No free transmit slot, or link negotiation has not completed
    Busy,
    /// No received frame is waiting
    Empty,
    /// Invalid state for operation (e.g., not running)
    InvalidState,
    /// Host refused to re-arm the interrupt line
    IrqRearm,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Busy => "transmitter busy",
            IoError::Empty => "no frame available",
            IoError::InvalidState => "invalid state for operation",
            IoError::IrqRearm => "interrupt re-arm failed",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match sge.send(&frame) {
///     Ok(()) => {}
///     Err(Error::Io(IoError::Busy)) => { /* retry after TX interrupt */ }
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl Error {
    /// Whether the caller should simply retry later
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        matches!(self, Error::Io(IoError::Busy | IoError::Empty))
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
