//! Deadband filtering of slider readings
//!
//! Potentiometers jitter by a few counts even when nobody touches them. The
//! filter keeps the last accepted reading per channel and only replaces it
//! when a new reading moved at least one deadband away. The first reading
//! after power-on only seeds that baseline.
//!
//! ```text
//! Uninitialized ──first sample──► Tracking { previous, last_emit }
//! ```

use super::sampler::Sample;
use crate::time::Millis;
use tracing::debug;

/// Per-channel memory of the filter.
///
/// The only transition is `Uninitialized -> Tracking`, taken on the first
/// sample after power-on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Uninitialized,
    Tracking {
        previous: Sample,
        /// Written by the owning channel, and only when it emits.
        last_emit: Option<Millis>,
    },
}

/// Result of one filtered tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOutput {
    /// Filtered value before this tick.
    pub baseline: Sample,
    /// Filtered value after this tick (`baseline` when nothing changed).
    pub value: Sample,
    /// Raw `current - baseline`, even when below the deadband.
    pub delta: i32,
    /// Whether `|delta|` reached the deadband and `value` moved.
    pub changed: bool,
}

/// Deadband filter: a reading only replaces the previous one when it moved by
/// at least `deadband` counts.
#[derive(Clone, Debug)]
pub struct DebounceFilter {
    deadband: u16,
    state: FilterState,
}

impl DebounceFilter {
    pub fn new(deadband: u16) -> Self {
        Self {
            deadband,
            state: FilterState::Uninitialized,
        }
    }

    pub fn previous(&self) -> Option<Sample> {
        match self.state {
            FilterState::Uninitialized => None,
            FilterState::Tracking { previous, .. } => Some(previous),
        }
    }

    pub fn last_emit(&self) -> Option<Millis> {
        match self.state {
            FilterState::Uninitialized => None,
            FilterState::Tracking { last_emit, .. } => last_emit,
        }
    }

    /// Feeds one sample. Returns `None` on the seeding tick, which has no
    /// baseline to compare against.
    pub fn update(&mut self, current: Sample) -> Option<FilterOutput> {
        match &mut self.state {
            FilterState::Uninitialized => {
                debug!("Seeding filter baseline at {}", current);
                self.state = FilterState::Tracking {
                    previous: current,
                    last_emit: None,
                };
                None
            }
            FilterState::Tracking { previous, .. } => {
                let baseline = *previous;
                let delta = current.delta_from(baseline);
                let changed = delta.unsigned_abs() >= u32::from(self.deadband);
                if changed {
                    *previous = current;
                }
                Some(FilterOutput {
                    baseline,
                    value: *previous,
                    delta,
                    changed,
                })
            }
        }
    }

    /// Records an emission. Ignored before the filter is seeded, since no
    /// emission can happen then.
    pub fn mark_emitted(&mut self, now: Millis) {
        if let FilterState::Tracking { last_emit, .. } = &mut self.state {
            *last_emit = Some(now);
        }
    }
}
