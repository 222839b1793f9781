//! Driver abstraction module.
//!
//! Collaborator traits, the URB ownership model and the USB DMA engine.

pub mod traits;
pub mod urb;
pub mod usb;

pub use usb::segment;

// Re-exports
pub use traits::{MacLayer, RxUrb, RxVerdict, Softirq, TxUrb, UsbTransport};
pub use urb::{SubmitError, Urb, UrbId, UrbStatus};
pub use usb::{DmaConfig, UsbDma};
