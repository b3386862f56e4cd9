//! Host interrupt controller seam

/// Failure reported by the host interrupt controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqError;

/// Access to the device's interrupt line on the host controller.
///
/// The driver handles one interrupt at a time and re-arms the line itself at
/// the end of [`handle_interrupt`](crate::Sge::handle_interrupt), so the
/// host must not re-enable it automatically.
pub trait IrqLine {
    /// Register the line with manual re-enable semantics
    fn set_policy(&mut self, irq: u8) -> Result<(), IrqError>;

    /// Enable (or re-arm) the line
    fn enable(&mut self, irq: u8) -> Result<(), IrqError>;
}
