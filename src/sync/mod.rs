//! Interrupt-safe sharing of the controller
//!
//! The controller itself takes `&mut self` everywhere and assumes a single
//! thread of control. When the interrupt handler and the main loop both need
//! it, park it in a [`SharedSge`] and reach it through a critical section.
//!
//! # Example
//!
//! ```ignore
//! use ph_sis190_mac::sync::SharedSge;
//!
//! static SGE: SharedSge<Regs, Delay, Host> = SharedSge::new();
//!
//! fn main() {
//!     SGE.install(Sge::new(regs, delay, host, pci, SgeConfig::new()));
//!     SGE.with(|sge| sge.initialize()).unwrap().unwrap();
//! }
//!
//! fn on_irq() {
//!     if let Some(Ok(events)) = SGE.handle_interrupt() {
//!         events.dispatch(&mut app);
//!     }
//! }
//! ```

mod shared;

pub use shared::{SharedSge, SharedSgeDefault};
