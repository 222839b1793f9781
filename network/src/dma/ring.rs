//! Fixed-capacity entry ring shared between software and an asynchronous
//! hardware path.
//!
//! # Index model
//! ```text
//!            start                 end
//!              v                    v
//!   +--------+----------------------+--------+
//!   |  free  |   used (occupancy)   |  free  |
//!   +--------+----------------------+--------+
//! ```
//!
//! `end == (start + used) % capacity` at all times. The producer side
//! publishes entries at `end`, the consumer side retires them from `start`.
//! What "used" means is up to the owner: completed-but-undecoded for RX,
//! in flight for TX.
//!
//! The ring does no locking of its own. Owners keep it behind a
//! `spin::Mutex` and only touch indices with the lock held.

use alloc::vec::Vec;

use crate::error::{DmaError, Result};

/// Circular array of entries with producer/consumer indices.
pub struct Ring<E> {
    /// Entries, populated once at init.
    e: Vec<E>,
    /// Fixed capacity.
    entries: usize,
    /// Consumer index.
    start: usize,
    /// Producer index.
    end: usize,
    /// Occupancy.
    used: usize,
}

impl<E> Ring<E> {
    /// Empty ring. No memory is allocated until [`Ring::alloc`].
    pub const fn new(entries: usize) -> Self {
        assert!(entries > 0, "ring capacity must be non-zero");
        Self {
            e: Vec::new(),
            entries,
            start: 0,
            end: 0,
            used: 0,
        }
    }

    /// Reserve backing storage for all entries.
    pub fn alloc(&mut self) -> Result<()> {
        self.e
            .try_reserve_exact(self.entries)
            .map_err(|_| DmaError::OutOfMemory)
    }

    /// Append an entry during population.
    pub fn push(&mut self, entry: E) -> Result<()> {
        if self.e.len() >= self.entries {
            return Err(DmaError::QueueFull);
        }
        self.e.try_reserve(1).map_err(|_| DmaError::OutOfMemory)?;
        self.e.push(entry);
        Ok(())
    }

    /// Every slot has an entry.
    pub fn is_populated(&self) -> bool {
        self.e.len() == self.entries
    }

    pub fn capacity(&self) -> usize {
        self.entries
    }

    pub fn occupancy(&self) -> usize {
        self.used
    }

    pub fn is_full(&self) -> bool {
        self.used >= self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Slot at the producer index, for the caller to populate.
    ///
    /// Does not publish it: call [`Ring::advance_producer`] once the entry
    /// is handed off. Fails with `QueueFull` when no slot is free.
    pub fn reserve(&mut self) -> Result<&mut E> {
        if self.is_full() || !self.is_populated() {
            return Err(DmaError::QueueFull);
        }
        Ok(&mut self.e[self.end])
    }

    /// Entry at the producer index.
    pub fn producer(&self) -> Option<&E> {
        self.e.get(self.end)
    }

    pub fn producer_mut(&mut self) -> Option<&mut E> {
        self.e.get_mut(self.end)
    }

    /// Entry at the consumer index.
    pub fn consumer(&self) -> Option<&E> {
        self.e.get(self.start)
    }

    /// Publish the entry at `end`.
    pub fn advance_producer(&mut self) -> Result<()> {
        if self.is_full() {
            return Err(DmaError::QueueFull);
        }
        self.end = (self.end + 1) % self.entries;
        self.used += 1;
        Ok(())
    }

    /// Retire the entry at `start`. Returns its slot index and the entry,
    /// or `None` if the ring is empty.
    pub fn advance_consumer(&mut self) -> Option<(usize, &mut E)> {
        if self.is_empty() {
            return None;
        }
        let idx = self.start;
        self.start = (self.start + 1) % self.entries;
        self.used -= 1;
        self.e.get_mut(idx).map(|entry| (idx, entry))
    }

    pub fn get(&self, idx: usize) -> Option<&E> {
        self.e.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut E> {
        self.e.get_mut(idx)
    }

    /// Slot index of the first entry matching `pred`.
    pub fn position(&self, pred: impl FnMut(&E) -> bool) -> Option<usize> {
        self.e.iter().position(pred)
    }

    /// Remove every entry and reset the indices.
    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.start = 0;
        self.end = 0;
        self.used = 0;
        self.e.drain(..)
    }
}
