use super::layers::{LayerState, TriLayer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// On/off state of every LED, left to right.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedPattern(Vec<bool>);

impl LedPattern {
    pub fn new(leds: Vec<bool>) -> Self {
        Self(leds)
    }

    pub fn off(width: usize) -> Self {
        Self(vec![false; width])
    }

    pub fn all_on(width: usize) -> Self {
        Self(vec![true; width])
    }

    /// Even positions lit, odd positions dark. `[1, 0, 1]` on three LEDs.
    pub fn outer(width: usize) -> Self {
        Self((0..width).map(|i| i % 2 == 0).collect())
    }

    /// Complement of [`LedPattern::outer`].
    pub fn inner(width: usize) -> Self {
        Self((0..width).map(|i| i % 2 == 1).collect())
    }

    /// Only LED `index` lit.
    pub fn single(width: usize, index: usize) -> Self {
        Self((0..width).map(|i| i == index).collect())
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn leds(&self) -> &[bool] {
        &self.0
    }

    pub fn is_lit(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }
}

impl fmt::Display for LedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.0 {
            f.write_str(if *lit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Layers that share one LED pattern, e.g. the same function on two OS bases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub layers: Vec<u8>,
    pub pattern: LedPattern,
}

/// Active layer to LED pattern lookup
#[derive(Clone, Debug)]
pub struct LayerIndicator {
    width: usize,
    entries: Vec<PatternEntry>,
    tri_layer: Option<TriLayer>,
}

impl LayerIndicator {
    pub fn new(width: usize, entries: Vec<PatternEntry>, tri_layer: Option<TriLayer>) -> Self {
        Self {
            width,
            entries,
            tri_layer,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Pattern for `active_layer`; unknown layers show all LEDs off.
    pub fn update(&self, active_layer: u8) -> LedPattern {
        self.entries
            .iter()
            .find(|entry| entry.layers.contains(&active_layer))
            .map(|entry| entry.pattern.clone())
            .unwrap_or_else(|| LedPattern::off(self.width))
    }

    /// Applies tri-layer folding, if configured.
    pub fn fold(&self, state: LayerState) -> LayerState {
        match &self.tri_layer {
            Some(tri) => tri.apply(state),
            None => state,
        }
    }

    pub fn pattern_for_state(&self, state: LayerState) -> LedPattern {
        self.update(self.fold(state).highest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(bits: [u8; 3]) -> LedPattern {
        LedPattern::new(bits.iter().map(|b| *b == 1).collect())
    }

    fn desnarler() -> LayerIndicator {
        let entry = |layers: [u8; 2], bits| PatternEntry {
            layers: layers.to_vec(),
            pattern: p(bits),
        };
        LayerIndicator::new(
            3,
            vec![
                entry([0, 4], [1, 0, 0]),
                entry([1, 5], [0, 1, 0]),
                entry([2, 6], [0, 0, 1]),
                entry([3, 7], [1, 1, 1]),
            ],
            Some(TriLayer::new(1, 2, 3)),
        )
    }

    #[test]
    fn equivalent_layers_share_a_pattern() {
        let indicator = desnarler();
        assert_eq!(indicator.update(1), indicator.update(5));
        assert_eq!(indicator.update(6), p([0, 0, 1]));
    }

    #[test]
    fn unknown_layer_is_dark() {
        assert_eq!(desnarler().update(12), LedPattern::off(3));
    }

    #[test]
    fn lower_and_upper_fold_into_adjust() {
        let indicator = desnarler();
        let pattern = indicator.pattern_for_state(LayerState::from_layers([1, 2]));
        assert_eq!(pattern, LedPattern::all_on(3));
    }

    #[test]
    fn outer_and_inner_alternate() {
        assert_eq!(LedPattern::outer(3).to_string(), "101");
        assert_eq!(LedPattern::inner(3).to_string(), "010");
        assert_eq!(LedPattern::single(3, 1), LedPattern::inner(3));
    }
}
