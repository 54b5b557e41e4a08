//! LED feedback for the active layer, the mode and short animations.

pub mod animation;
pub mod compositor;
pub mod layers;
pub mod pattern;

pub use animation::{Animation, AnimationPlayer, Frame, Step};
pub use compositor::{LedCompositor, ModeOverlay};
pub use layers::{LayerState, TriLayer, MAX_LAYERS};
pub use pattern::{LayerIndicator, LedPattern, PatternEntry};
