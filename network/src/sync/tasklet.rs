//! Single-flight deferred work.
//!
//! # State
//! ```text
//!   schedule() ──> SCHED ──run()──> RUN ──> idle
//!                    ▲                │
//!                    └── schedule() ──┘   (rerun after current pass)
//!
//!   kill(): DISABLED, wait for RUN to clear, drop SCHED
//! ```
//!
//! The tasklet never runs anything itself. `schedule` reports whether the
//! caller must wake whoever drives deferred work; that driver then calls
//! `run`. Two concurrent `run` calls never overlap: the loser returns at
//! once and the winner picks up the pending request before it exits.

use core::sync::atomic::{AtomicU8, Ordering};

const SCHED: u8 = 1 << 0;
const RUN: u8 = 1 << 1;
const DISABLED: u8 = 1 << 2;

pub struct Tasklet {
    state: AtomicU8,
}

impl Tasklet {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(0),
        }
    }

    /// Mark work pending.
    ///
    /// Returns `true` only on the idle → scheduled transition; the caller
    /// raises the deferred-work signal exactly then. Scheduling an already
    /// scheduled or killed tasklet is a no-op.
    pub fn schedule(&self) -> bool {
        let mut cur = self.state.load(Ordering::Acquire);
        loop {
            if cur & (SCHED | DISABLED) != 0 {
                return false;
            }
            match self.state.compare_exchange_weak(
                cur,
                cur | SCHED,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Run `f` if work is pending and nobody else is running it.
    ///
    /// Returns `true` if `f` ran at least once.
    pub fn run<F: FnMut()>(&self, mut f: F) -> bool {
        let mut ran = false;
        loop {
            if !self.try_enter() {
                return ran;
            }
            if self.state.fetch_and(!SCHED, Ordering::AcqRel) & SCHED == 0 {
                self.state.fetch_and(!RUN, Ordering::Release);
                return ran;
            }

            f();
            ran = true;

            let after = self.state.fetch_and(!RUN, Ordering::AcqRel);
            if after & SCHED == 0 || after & DISABLED != 0 {
                return ran;
            }
        }
    }

    fn try_enter(&self) -> bool {
        let mut cur = self.state.load(Ordering::Acquire);
        loop {
            if cur & (RUN | DISABLED) != 0 {
                return false;
            }
            match self.state.compare_exchange_weak(
                cur,
                cur | RUN,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Disable the tasklet and wait for a running instance to finish.
    ///
    /// After this returns `f` is not executing and never will again.
    pub fn kill(&self) {
        self.state.fetch_or(DISABLED, Ordering::AcqRel);
        while self.state.load(Ordering::Acquire) & RUN != 0 {
            core::hint::spin_loop();
        }
        self.state.fetch_and(!SCHED, Ordering::AcqRel);
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.load(Ordering::Acquire) & SCHED != 0
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) & RUN != 0
    }

    pub fn is_killed(&self) -> bool {
        self.state.load(Ordering::Acquire) & DISABLED != 0
    }
}

impl Default for Tasklet {
    fn default() -> Self {
        Self::new()
    }
}
