//! Millisecond timestamps and the clock seam the device is driven by.
//!
//! Timestamps are 32-bit like the firmware timer they replace, so all elapsed
//! arithmetic wraps.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::time::Instant;

/// A point on the monotonic millisecond timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millis(pub u32);

impl Millis {
    /// Milliseconds elapsed from `earlier` to `self`, wrapping on overflow.
    pub fn elapsed_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    pub fn after(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Source of `now()` for the tick loop.
pub trait Clock {
    fn now(&self) -> Millis;

    fn elapsed(&self, since: Millis) -> u32 {
        self.now().elapsed_since(since)
    }
}

/// Wall clock counting from construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        // Truncation is the wrap of a 32-bit timer.
        Millis(self.start.elapsed().as_millis() as u32)
    }
}

/// Hand-driven clock for tests and deterministic replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn starting_at(ms: u32) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: u32) -> Millis {
        self.now.set(self.now.get().wrapping_add(ms));
        Millis(self.now.get())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.now.get())
    }
}
