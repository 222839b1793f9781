//! Synchronization primitives for the DMA paths.
//!
//! Everything here is lock-free and safe to touch from completion
//! (interrupt-like) context. Ring indices are guarded separately by
//! `spin::Mutex` in the driver.

pub mod once;
pub mod state;
pub mod tasklet;

pub use once::{LogOnce, Warn};
pub use state::{DeviceState, Lifecycle};
pub use tasklet::Tasklet;
