//! Host buffer backing one RX URB.
//!
//! A buffer is owned by exactly one party at a time: the RX ring entry while
//! software holds it, or the in-flight [`Urb`](crate::driver::urb::Urb)
//! while the transport fills it. There is no shared access and no manual
//! ownership flag; moving the buffer is the hand-off.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::{DmaError, Result};

/// Fixed-size RX DMA buffer.
pub struct RxBuf {
    data: Box<[u8]>,
}

impl RxBuf {
    /// Allocate a zeroed buffer of `size` bytes.
    ///
    /// Returns `OutOfMemory` instead of aborting when the heap is exhausted.
    pub fn alloc(size: usize) -> Result<Self> {
        let mut v = Vec::new();
        v.try_reserve_exact(size).map_err(|_| DmaError::OutOfMemory)?;
        v.resize(size, 0);
        Ok(Self {
            data: v.into_boxed_slice(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// First `len` bytes, clamped to capacity.
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.data[..len.min(self.data.len())]
    }
}

impl core::fmt::Debug for RxBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RxBuf")
            .field("capacity", &self.data.len())
            .finish()
    }
}
