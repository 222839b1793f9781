//! USB DMA data path for an 802.11 adapter.
//!
//! Moves frames between a bulk USB transport and a wireless MAC layer:
//! - RX: posted buffers, completion bookkeeping, a single-flight bottom
//!   half that splits aggregated buffers into frames.
//! - TX: TXINFO wrapping, per-endpoint rings, stop/wake flow control.
//! - Lifecycle: ordered bring-up and teardown of every buffer and handle.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod error;
pub mod types;
pub mod dma;
pub mod sync;
pub mod stats;
pub mod driver;

#[doc(hidden)]
pub use log as __log;

pub use error::{DmaError, Result};
pub use types::TxFrame;
pub use stats::{DmaStats, StatsSnapshot};
pub use sync::Lifecycle;
pub use driver::{
    DmaConfig, MacLayer, RxUrb, RxVerdict, Softirq, SubmitError, TxUrb, Urb, UrbId, UrbStatus,
    UsbDma, UsbTransport,
};
