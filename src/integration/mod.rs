//! External Stack Integrations
//!
//! - **smoltcp** (`smoltcp`): implements `smoltcp::phy::Device` for the
//!   controller with RX/TX token support. Requires the `smoltcp` feature.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::phy::Device;
//! let (rx, tx) = sge.receive(Instant::ZERO).unwrap();
//! ```

#[cfg(feature = "smoltcp")]
pub mod smoltcp;

#[cfg(feature = "smoltcp")]
pub use smoltcp::{SgeRxToken, SgeTxToken, ethernet_address};
