//! RX behaviour when a frame copy cannot be allocated

mod common;

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{running, SegmentBuilder};
use usbnet_dma::dma::N_RX_ENTRIES;

/// Refuses large allocations while armed.
struct Tight;

static ARMED: AtomicBool = AtomicBool::new(false);
const LIMIT: usize = 1024;

unsafe impl GlobalAlloc for Tight {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if ARMED.load(Ordering::Relaxed) && layout.size() >= LIMIT {
            return ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static ALLOC: Tight = Tight;

#[test]
fn test_frame_alloc_failure_drops_only_that_frame() {
    let dma = running();
    let big = vec![0x5a; 2 * LIMIT];
    let buf = SegmentBuilder::new().packet(&big).packet(b"tiny").build();

    let urb = dma.transport().fill_rx(&buf).unwrap();
    dma.complete_rx(urb);

    ARMED.store(true, Ordering::Relaxed);
    let ran = dma.rx_bottom_half();
    ARMED.store(false, Ordering::Relaxed);
    assert!(ran);

    assert_eq!(dma.mac().frames(), vec![b"tiny".to_vec()]);
    let stats = dma.stats();
    assert_eq!(stats.rx_oom, 1);
    assert_eq!(stats.rx_frames, 1);
    assert_eq!(stats.rx_segments, 2);
    assert_eq!(dma.rx_occupancy(), 0);
    assert_eq!(dma.transport().rx_in_flight(), N_RX_ENTRIES);
}
