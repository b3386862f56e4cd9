//! DMA Engine
//!
//! This module provides the descriptor rings and buffer pools shared with the
//! device, and the ownership handoff used to move frames through them. All
//! memory comes from the host's contiguous DMA allocator.
//!
//! # Architecture
//!
//! - [`DmaEngine`]: Owns the RX and TX rings and their buffer pools
//! - [`ring::DescriptorRing`]: Circular ring of hardware descriptors
//! - [`ring::BufferPool`]: One fixed-size buffer per ring slot

pub(crate) mod descriptor;
mod engine;
mod ring;

pub(crate) use engine::{DmaEngine, tx_command};
