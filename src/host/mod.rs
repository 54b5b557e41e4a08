//! Seams to the host firmware and the hosts shipped with the crate
//!
//! The device only talks to the outside through the traits here:
//!
//! ```text
//!              ┌──────────── HostPort ────────────┐
//! EventSource  │ AnalogSampler  PinInput  HostOutput │
//!     │        └───────▲─────────▲──────────┬─────┘
//!     ▼                │         │          ▼
//! InputEvent ──► Device<Running>::handle ──► HostCommand
//! ```
//!
//! [`recording::RecordingPort`] keeps commands in memory, [`replay::ReplayPort`]
//! plays a TOML trace, and `rpi::RpiPort` (feature `rpi`) drives real GPIO.

pub mod recording;
pub mod replay;
pub mod runner;
#[cfg(feature = "rpi")]
pub mod rpi;

pub use crate::input::sampler::AnalogSampler;
pub use crate::time::Clock;
pub use recording::RecordingPort;
pub use replay::{ReplayPort, Trace};
pub use runner::{run, spawn_command_logger, RunSummary, StopReason};

use crate::device::InputEvent;
use crate::dispatch::{Modifier, OutputAction};
use crate::indicator::{LayerState, LedPattern};
use crate::input::PinLevel;
use crate::time::Millis;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub trait PinInput {
    fn read_level(&mut self, pin: u8) -> PinLevel;
}

/// Everything the device asks the host to do. Calls never fail; a host that
/// cannot deliver logs and drops the command.
pub trait HostOutput {
    fn emit(&mut self, action: OutputAction);

    fn set_leds(&mut self, pattern: &LedPattern);

    fn layer_move(&mut self, layer: u8);

    fn hold(&mut self, modifier: Modifier);

    fn release(&mut self, modifier: Modifier);
}

pub trait HostPort: AnalogSampler + PinInput + HostOutput {}

impl<T: AnalogSampler + PinInput + HostOutput> HostPort for T {}

/// Host-side events between ticks.
pub trait EventSource {
    /// Events due at `now`. `None` once the source is exhausted.
    fn pending(&mut self, now: Millis) -> Option<Vec<InputEvent>>;

    /// Layer state after the device folded it.
    fn adopt_layers(&mut self, _state: LayerState) {}
}

/// A [`HostOutput`] call, as recorded or forwarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCommand {
    Emit(OutputAction),
    SetLeds(LedPattern),
    LayerMove(u8),
    Hold(Modifier),
    Release(Modifier),
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCommand::Emit(action) => write!(f, "emit {}", action),
            HostCommand::SetLeds(pattern) => write!(f, "leds {}", pattern),
            HostCommand::LayerMove(layer) => write!(f, "layer_move {}", layer),
            HostCommand::Hold(modifier) => write!(f, "hold {:?}", modifier),
            HostCommand::Release(modifier) => write!(f, "release {:?}", modifier),
        }
    }
}

/// Host side layer stack: the base layer from the last `layer_move` plus
/// momentarily held layers.
#[derive(Clone, Debug, Default)]
pub struct LayerTracker {
    base: u8,
    held: LayerState,
    reported: Option<LayerState>,
    adopted: LayerState,
}

impl LayerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers as set by moves and held keys, before folding.
    pub fn state(&self) -> LayerState {
        LayerState::only(self.base).union(self.held)
    }

    /// Last folded state handed back by the device.
    pub fn adopted(&self) -> LayerState {
        self.adopted
    }

    pub fn move_to(&mut self, layer: u8) {
        self.base = layer;
        self.held = LayerState::EMPTY;
    }

    pub fn set_held(&mut self, held: LayerState) {
        self.held = held;
    }

    /// State to report if it changed since the last report.
    pub fn take_change(&mut self) -> Option<LayerState> {
        let state = self.state();
        if self.reported == Some(state) {
            return None;
        }
        self.reported = Some(state);
        Some(state)
    }

    pub fn adopt(&mut self, folded: LayerState) {
        self.adopted = folded;
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to read trace {path}: {source}")]
    TraceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse trace {path}: {source}")]
    TraceParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Trace frames are not in time order at {0}ms")]
    TraceOrder(u32),

    #[error("Failed to initialize hardware: {0}")]
    Hardware(String),
}
