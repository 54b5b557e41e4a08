use crate::dispatch::Toward;
use crate::indicator::LayerState;
use crate::time::Millis;
use serde::{Deserialize, Serialize};

/// Host keys the device reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyTrigger {
    SystemSleep,
    WindowSwitch { toward: Toward },
    /// A composed character was typed, e.g. an umlaut.
    Compose,
}

/// Whether the host should still process the key itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    PassThrough,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Tick { now: Millis },
    LayerChanged { state: LayerState, now: Millis },
    KeyPressed { key: KeyTrigger, now: Millis },
}

/// What handling an event produced for the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    Ticked,
    /// Layer state after tri-layer folding, to be adopted by the host.
    Layers(LayerState),
    Key(KeyDisposition),
}

/// Counters kept by a running device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub ticks: u64,
    pub emitted: u64,
    pub mode_changes: u64,
    pub layer_changes: u64,
}
