//! Common test utilities and in-memory collaborators

#![allow(dead_code)]

pub mod builder;
pub use builder::{data_frame, SegmentBuilder};

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use usbnet_dma::types::{Rxwi, TxFrame};
use usbnet_dma::{
    DmaConfig, MacLayer, RxUrb, RxVerdict, Softirq, SubmitError, TxUrb, UrbId, UrbStatus, UsbDma,
    UsbTransport,
};
use usbnet_dma::dma::RxBuf;

pub type Dma = UsbDma<MockTransport, MockMac, MockSoftirq>;

/// Engine over fresh mocks with the default configuration.
pub fn engine() -> Dma {
    engine_with(MockTransport::new())
}

pub fn engine_with(transport: MockTransport) -> Dma {
    UsbDma::new(transport, MockMac::default(), MockSoftirq::default(), DmaConfig::default())
        .expect("default config is valid")
}

/// Engine after a successful `init`.
pub fn running() -> Dma {
    let dma = engine();
    dma.init().expect("init");
    dma
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSPORT
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct TransportInner {
    next_id: u32,
    /// Remaining successful allocations, `None` for unlimited.
    alloc_budget: Option<usize>,
    live: BTreeSet<UrbId>,
    allocated: usize,
    freed: Vec<UrbId>,
    double_frees: usize,
    poisoned: BTreeSet<UrbId>,
    rx_in_flight: VecDeque<RxUrb>,
    tx_in_flight: VecDeque<(u8, TxUrb)>,
    /// Wrapped bytes of every accepted TX submission.
    tx_sent: Vec<(u8, Vec<u8>)>,
    rx_submits: usize,
    fail_rx: Option<UrbStatus>,
    /// Successful RX submissions left before `fail_rx` applies.
    fail_rx_after: usize,
    fail_tx: Option<UrbStatus>,
}

/// Bulk transport that queues submissions until a test completes them.
#[derive(Default)]
pub struct MockTransport {
    inner: Mutex<TransportInner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail allocation after `n` handles.
    pub fn with_alloc_budget(n: usize) -> Self {
        let t = Self::new();
        t.inner.lock().unwrap().alloc_budget = Some(n);
        t
    }

    /// Refuse RX submissions with `status` after `after` have succeeded.
    pub fn fail_rx(&self, status: UrbStatus, after: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_rx = Some(status);
        inner.fail_rx_after = after;
    }

    /// Refuse TX submissions with `status`, or accept them again with `None`.
    pub fn fail_tx(&self, status: Option<UrbStatus>) {
        self.inner.lock().unwrap().fail_tx = status;
    }

    /// Oldest in-flight RX URB, filled with `data` and completed `Ok`.
    pub fn fill_rx(&self, data: &[u8]) -> Option<RxUrb> {
        let mut urb = self.take_rx()?;
        let len = data.len().min(urb.buffer().capacity());
        urb.buffer_mut().as_mut_slice()[..len].copy_from_slice(&data[..len]);
        urb.complete(UrbStatus::Ok, len);
        Some(urb)
    }

    pub fn take_rx(&self) -> Option<RxUrb> {
        self.inner.lock().unwrap().rx_in_flight.pop_front()
    }

    pub fn take_tx(&self) -> Option<(u8, TxUrb)> {
        self.inner.lock().unwrap().tx_in_flight.pop_front()
    }

    pub fn rx_in_flight(&self) -> usize {
        self.inner.lock().unwrap().rx_in_flight.len()
    }

    pub fn tx_in_flight(&self) -> usize {
        self.inner.lock().unwrap().tx_in_flight.len()
    }

    pub fn rx_submits(&self) -> usize {
        self.inner.lock().unwrap().rx_submits
    }

    pub fn tx_sent(&self) -> Vec<(u8, Vec<u8>)> {
        self.inner.lock().unwrap().tx_sent.clone()
    }

    pub fn allocated(&self) -> usize {
        self.inner.lock().unwrap().allocated
    }

    /// Handles allocated and not yet freed.
    pub fn live(&self) -> usize {
        self.inner.lock().unwrap().live.len()
    }

    pub fn freed(&self) -> usize {
        self.inner.lock().unwrap().freed.len()
    }

    pub fn double_frees(&self) -> usize {
        self.inner.lock().unwrap().double_frees
    }

    pub fn poisoned(&self) -> usize {
        self.inner.lock().unwrap().poisoned.len()
    }

    pub fn is_poisoned(&self, id: UrbId) -> bool {
        self.inner.lock().unwrap().poisoned.contains(&id)
    }
}

impl UsbTransport for MockTransport {
    fn alloc_urb(&self) -> Option<UrbId> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(budget) = inner.alloc_budget.as_mut() {
            if *budget == 0 {
                return None;
            }
            *budget -= 1;
        }
        let id = UrbId(inner.next_id);
        inner.next_id += 1;
        inner.allocated += 1;
        inner.live.insert(id);
        Some(id)
    }

    fn free_urb(&self, id: UrbId) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.live.remove(&id) {
            inner.double_frees += 1;
        }
        inner.freed.push(id);
    }

    fn submit_rx(&self, _ep: u8, urb: RxUrb) -> Result<(), SubmitError<RxBuf>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.poisoned.contains(&urb.id()) {
            return Err(SubmitError::new(urb, UrbStatus::Poisoned));
        }
        if let Some(status) = inner.fail_rx {
            if inner.fail_rx_after == 0 {
                return Err(SubmitError::new(urb, status));
            }
            inner.fail_rx_after -= 1;
        }
        inner.rx_submits += 1;
        inner.rx_in_flight.push_back(urb);
        Ok(())
    }

    fn submit_tx(&self, ep: u8, urb: TxUrb) -> Result<(), SubmitError<TxFrame>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.poisoned.contains(&urb.id()) {
            return Err(SubmitError::new(urb, UrbStatus::Poisoned));
        }
        if let Some(status) = inner.fail_tx {
            return Err(SubmitError::new(urb, status));
        }
        inner.tx_sent.push((ep, urb.buffer().as_bytes().to_vec()));
        inner.tx_in_flight.push_back((ep, urb));
        Ok(())
    }

    fn poison(&self, id: UrbId) {
        self.inner.lock().unwrap().poisoned.insert(id);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MAC LAYER
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MacLog {
    pub frames: Vec<Vec<u8>>,
    /// Unwrapped payload and status of every reported transmission.
    pub tx_status: Vec<(Vec<u8>, UrbStatus)>,
    pub stops: Vec<u8>,
    pub wakes: Vec<u8>,
    pub stats_scheduled: Vec<Duration>,
}

/// MAC layer that records every call.
#[derive(Default)]
pub struct MockMac {
    log: Mutex<MacLog>,
    /// Reject every frame whose first byte equals this value.
    reject_marker: Mutex<Option<u8>>,
}

impl MockMac {
    pub fn reject_marker(&self, marker: u8) {
        *self.reject_marker.lock().unwrap() = Some(marker);
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.log.lock().unwrap().frames.clone()
    }

    pub fn tx_status(&self) -> Vec<(Vec<u8>, UrbStatus)> {
        self.log.lock().unwrap().tx_status.clone()
    }

    pub fn stops(&self) -> Vec<u8> {
        self.log.lock().unwrap().stops.clone()
    }

    pub fn wakes(&self) -> Vec<u8> {
        self.log.lock().unwrap().wakes.clone()
    }

    pub fn stats_scheduled(&self) -> Vec<Duration> {
        self.log.lock().unwrap().stats_scheduled.clone()
    }
}

impl MacLayer for MockMac {
    fn rx_frame(&self, frame: Vec<u8>, _rxwi: &Rxwi) -> RxVerdict {
        let marker = *self.reject_marker.lock().unwrap();
        if marker.is_some() && frame.first().copied() == marker {
            return RxVerdict::Rejected;
        }
        self.log.lock().unwrap().frames.push(frame);
        RxVerdict::Accepted
    }

    fn tx_status(&self, frame: TxFrame, status: UrbStatus) {
        self.log
            .lock()
            .unwrap()
            .tx_status
            .push((frame.payload().to_vec(), status));
    }

    fn stop_queue(&self, queue: u8) {
        self.log.lock().unwrap().stops.push(queue);
    }

    fn wake_queue(&self, queue: u8) {
        self.log.lock().unwrap().wakes.push(queue);
    }

    fn schedule_stats(&self, delay: Duration) {
        self.log.lock().unwrap().stats_scheduled.push(delay);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SOFTIRQ
// ═══════════════════════════════════════════════════════════════════════════

/// Counts raises; tests run the bottom half themselves.
#[derive(Default)]
pub struct MockSoftirq {
    raised: AtomicUsize,
}

impl MockSoftirq {
    pub fn raised(&self) -> usize {
        self.raised.load(Ordering::SeqCst)
    }
}

impl Softirq for MockSoftirq {
    fn raise(&self) {
        self.raised.fetch_add(1, Ordering::SeqCst);
    }
}
