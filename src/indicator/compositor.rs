use super::animation::{Animation, AnimationPlayer, Frame};
use super::layers::LayerState;
use super::pattern::{LayerIndicator, LedPattern};
use crate::input::Mode;
use crate::time::Millis;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pattern shown instead of the layer pattern while `mode` is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeOverlay {
    pub mode: Mode,
    pub pattern: LedPattern,
}

/// Decides what the LEDs show
///
/// Priority: running animation, then the mode overlay, then the pattern of
/// the active layer. Writes are deduplicated against what was last shown,
/// except on layer changes which always write.
#[derive(Clone, Debug)]
pub struct LedCompositor {
    indicator: LayerIndicator,
    overlay: Option<ModeOverlay>,
    player: AnimationPlayer,
    layer_pattern: LedPattern,
    shown: Option<LedPattern>,
}

impl LedCompositor {
    pub fn new(indicator: LayerIndicator, overlay: Option<ModeOverlay>) -> Self {
        let layer_pattern = indicator.update(0);
        Self {
            indicator,
            overlay,
            player: AnimationPlayer::new(),
            layer_pattern,
            shown: None,
        }
    }

    /// Pattern without any animation.
    pub fn base(&self, mode: Mode) -> LedPattern {
        match &self.overlay {
            Some(overlay) if overlay.mode == mode => overlay.pattern.clone(),
            _ => self.layer_pattern.clone(),
        }
    }

    /// Folds `state` and recomputes the layer pattern.
    ///
    /// Returns the folded state and the pattern to write now, which is
    /// `None` while an animation owns the LEDs.
    pub fn on_layers(&mut self, state: LayerState, mode: Mode) -> (LayerState, Option<LedPattern>) {
        let folded = self.indicator.fold(state);
        self.layer_pattern = self.indicator.update(folded.highest());
        debug!(
            "Layer state {} -> active layer {} shows {}",
            folded,
            folded.highest(),
            self.layer_pattern
        );
        if self.player.is_running() {
            return (folded, None);
        }
        let pattern = self.base(mode);
        self.shown = Some(pattern.clone());
        (folded, Some(pattern))
    }

    pub fn play(&mut self, animation: Animation, mode: Mode, now: Millis) -> Option<LedPattern> {
        let frame = self.player.start(animation, now);
        self.resolve(frame, mode)
    }

    /// Cuts a running animation short. Returns the base pattern if it
    /// differs from what is showing.
    pub fn stop(&mut self, mode: Mode) -> Option<LedPattern> {
        self.player.stop();
        self.resolve(Frame::Finished, mode)
    }

    /// Pattern to write this tick, if it differs from what is showing.
    pub fn refresh(&mut self, mode: Mode, now: Millis) -> Option<LedPattern> {
        let frame = self.player.tick(now);
        self.resolve(frame, mode)
    }

    fn resolve(&mut self, frame: Frame, mode: Mode) -> Option<LedPattern> {
        let desired = match frame {
            Frame::Show(pattern) => pattern,
            Frame::Unchanged if self.player.is_running() => return None,
            Frame::Unchanged | Frame::Finished => self.base(mode),
        };
        if self.shown.as_ref() == Some(&desired) {
            return None;
        }
        self.shown = Some(desired.clone());
        Some(desired)
    }
}
