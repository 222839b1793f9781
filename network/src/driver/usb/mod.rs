//! USB bulk DMA engine.

pub mod config;
pub mod driver;
pub mod init;
pub mod rx;
pub mod segment;
pub mod tx;

// Re-exports
pub use config::{DmaConfig, STATS_DELAY, STATS_REQUEUE_DELAY};
pub use driver::UsbDma;
pub use segment::{extract_frame, Segment, SegmentError, SegmentReject, Segments};
pub use tx::NO_HW_KEY;
