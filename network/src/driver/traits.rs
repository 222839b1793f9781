//! Collaborator traits.
//!
//! The engine talks to three outside parties:
//! - [`UsbTransport`]: allocates, submits and poisons bulk URBs.
//! - [`MacLayer`]: consumes RX frames and TX status, owns the upper queues.
//! - [`Softirq`]: runs the RX bottom half on a non-interrupt context.

use alloc::vec::Vec;
use core::time::Duration;

use crate::dma::RxBuf;
use crate::types::{Rxwi, TxFrame};
use super::urb::{SubmitError, Urb, UrbId, UrbStatus};

/// RX URB: a host buffer the device fills.
pub type RxUrb = Urb<RxBuf>;

/// TX URB: the wrapped outbound frame.
pub type TxUrb = Urb<TxFrame>;

/// Bulk transport primitives.
///
/// # Contract
/// - Completions are delivered in submission order per endpoint, by calling
///   [`UsbDma::complete_rx`](super::usb::UsbDma::complete_rx) or
///   [`UsbDma::complete_tx`](super::usb::UsbDma::complete_tx).
/// - Completions MUST NOT be delivered synchronously from inside `submit_*`.
/// - After `poison(id)`, a transfer in flight on `id` completes with an
///   error status or not at all, and later submissions on `id` are refused.
/// - `complete_tx` is told the endpoint address the URB was submitted on.
pub trait UsbTransport: Send + Sync {
    /// Allocate a transfer handle. `None` on exhaustion.
    fn alloc_urb(&self) -> Option<UrbId>;

    /// Release a transfer handle. Called once per allocated id.
    fn free_urb(&self, id: UrbId);

    /// Queue a bulk-in transfer on endpoint address `ep`.
    fn submit_rx(&self, ep: u8, urb: RxUrb) -> Result<(), SubmitError<RxBuf>>;

    /// Queue a bulk-out transfer on endpoint address `ep`.
    fn submit_tx(&self, ep: u8, urb: TxUrb) -> Result<(), SubmitError<TxFrame>>;

    /// Cancel any transfer on `id` and refuse future ones.
    fn poison(&self, id: UrbId);

    /// Unrecoverable device-removed error.
    fn is_fatal(&self, status: UrbStatus) -> bool {
        status.is_fatal()
    }
}

/// Verdict of the MAC layer on a decoded RX frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxVerdict {
    Accepted,
    Rejected,
}

/// Wireless MAC and statistics layer.
///
/// `stop_queue`, `wake_queue` and `schedule_stats` are called with a TX ring
/// lock held and must not call back into the engine. `rx_frame` and
/// `tx_status` are called without engine locks.
pub trait MacLayer: Send + Sync {
    /// Validate a decoded frame and pass it up. A rejected frame is dropped
    /// by the MAC layer.
    fn rx_frame(&self, frame: Vec<u8>, rxwi: &Rxwi) -> RxVerdict;

    /// Final status of a transmitted frame. Ownership returns to the MAC.
    fn tx_status(&self, frame: TxFrame, status: UrbStatus);

    /// Upper queue `queue` must stop feeding frames.
    fn stop_queue(&self, queue: u8);

    /// Upper queue `queue` may resume.
    fn wake_queue(&self, queue: u8);

    /// Read TX statistics after `delay`, then call
    /// [`UsbDma::finish_stats_refresh`](super::usb::UsbDma::finish_stats_refresh).
    fn schedule_stats(&self, delay: Duration);
}

/// Deferred-work signal.
pub trait Softirq: Send + Sync {
    /// Arrange for [`UsbDma::rx_bottom_half`](super::usb::UsbDma::rx_bottom_half)
    /// to run soon, off the completion context.
    fn raise(&self);
}
