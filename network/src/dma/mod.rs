//! Ring queues and host buffers.
//!
//! The rings here are plain data structures; locking and transport calls
//! live in [`crate::driver`].

pub mod buffer;
pub mod ring;

pub use buffer::RxBuf;
pub use ring::Ring;

/// RX ring capacity.
pub const N_RX_ENTRIES: usize = 16;

/// TX ring capacity, per output endpoint.
pub const N_TX_ENTRIES: usize = 64;

/// Output endpoints, one TX ring each.
pub const N_OUT_EPS: usize = 6;

/// Default RX URB buffer size.
pub const MT_RX_URB_SIZE: usize = 24 * 1024;
