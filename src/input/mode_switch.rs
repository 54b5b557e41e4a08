//! Two-position mode toggle
//!
//! The physical switch is read as a digital level every tick. With the usual
//! pull-up wiring the switch is asserted when the pin reads LOW, which selects
//! [`Mode::B`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Operating mode selected by the toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Switch released.
    #[default]
    A,
    /// Switch asserted.
    B,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::A => write!(f, "A"),
            Mode::B => write!(f, "B"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinLevel {
    Low,
    High,
}

/// Debounce behaviour of the toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwitchDebounce {
    /// Accept a change on the first differing read.
    #[default]
    Disabled,
    /// Accept a change after `reads` consecutive differing reads.
    Consecutive { reads: u8 },
}

/// Result of one poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeReading {
    pub mode: Mode,
    pub changed: bool,
}

#[derive(Clone, Debug)]
pub struct ModeSwitch {
    active_low: bool,
    debounce: SwitchDebounce,
    mode: Mode,
    // Consecutive reads that disagree with `mode`.
    pending: u8,
}

impl ModeSwitch {
    pub fn new(active_low: bool, debounce: SwitchDebounce) -> Self {
        Self {
            active_low,
            debounce,
            mode: Mode::A,
            pending: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn mode_for(&self, level: PinLevel) -> Mode {
        let asserted = match level {
            PinLevel::Low => self.active_low,
            PinLevel::High => !self.active_low,
        };
        if asserted {
            Mode::B
        } else {
            Mode::A
        }
    }

    fn required_reads(&self) -> u8 {
        match self.debounce {
            SwitchDebounce::Disabled => 1,
            SwitchDebounce::Consecutive { reads } => reads.max(1),
        }
    }

    pub fn poll(&mut self, level: PinLevel) -> ModeReading {
        let observed = self.mode_for(level);
        if observed == self.mode {
            self.pending = 0;
            return ModeReading {
                mode: self.mode,
                changed: false,
            };
        }

        self.pending = self.pending.saturating_add(1);
        if self.pending < self.required_reads() {
            debug!(
                "Switch reads {:?}, waiting for {} more reads",
                level,
                self.required_reads() - self.pending
            );
            return ModeReading {
                mode: self.mode,
                changed: false,
            };
        }

        self.pending = 0;
        self.mode = observed;
        ModeReading {
            mode: self.mode,
            changed: true,
        }
    }
}
