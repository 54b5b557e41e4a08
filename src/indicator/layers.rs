use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of layers a [`LayerState`] can hold.
pub const MAX_LAYERS: u8 = 32;

/// Bitmask of active layers, bit `n` set when layer `n` is on
///
/// Same shape as the host's layer stack. The active layer is the highest
/// set bit, or 0 when nothing is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerState(pub u32);

impl LayerState {
    pub const EMPTY: LayerState = LayerState(0);

    fn bit(layer: u8) -> u32 {
        1u32.checked_shl(u32::from(layer)).unwrap_or(0)
    }

    /// Only `layer` active. Layers past [`MAX_LAYERS`] are ignored.
    pub fn only(layer: u8) -> Self {
        LayerState(Self::bit(layer))
    }

    pub fn from_layers(layers: impl IntoIterator<Item = u8>) -> Self {
        layers
            .into_iter()
            .fold(Self::EMPTY, |state, layer| state.with(layer))
    }

    pub fn with(self, layer: u8) -> Self {
        LayerState(self.0 | Self::bit(layer))
    }

    pub fn without(self, layer: u8) -> Self {
        LayerState(self.0 & !Self::bit(layer))
    }

    pub fn union(self, other: LayerState) -> Self {
        LayerState(self.0 | other.0)
    }

    pub fn contains(self, layer: u8) -> bool {
        self.0 & Self::bit(layer) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn highest(self) -> u8 {
        if self.0 == 0 {
            0
        } else {
            (31 - self.0.leading_zeros()) as u8
        }
    }
}

impl fmt::Display for LayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}

/// Adjust layer turned on while both `lower` and `upper` are held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriLayer {
    pub lower: u8,
    pub upper: u8,
    pub adjust: u8,
}

impl TriLayer {
    pub fn new(lower: u8, upper: u8, adjust: u8) -> Self {
        Self {
            lower,
            upper,
            adjust,
        }
    }

    pub fn apply(&self, state: LayerState) -> LayerState {
        if state.contains(self.lower) && state.contains(self.upper) {
            state.with(self.adjust)
        } else {
            state.without(self.adjust)
        }
    }

    pub fn layers(&self) -> [u8; 3] {
        [self.lower, self.upper, self.adjust]
    }
}
