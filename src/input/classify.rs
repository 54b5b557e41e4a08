//! Direction classification
//!
//! Turns a filtered reading into `-1`, `0` or `+1`. Spring-return sliders
//! use the side of a center they rest on, free sliders the sign of a large
//! enough movement or a change of bucket.

use super::debounce::FilterOutput;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete slider direction. `Neutral` suppresses dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Direction {
    pub fn from_sign(value: i32) -> Self {
        match value.signum() {
            -1 => Direction::Negative,
            1 => Direction::Positive,
            _ => Direction::Neutral,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Direction::Negative => -1,
            Direction::Neutral => 0,
            Direction::Positive => 1,
        }
    }

    pub fn is_neutral(self) -> bool {
        self == Direction::Neutral
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.as_i8())
    }
}

/// How a channel turns filtered samples into directions. Chosen per channel
/// in the profile, never switched at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierPolicy {
    /// Spring-return slider: direction is the side of `center` the value is on.
    AbsoluteCenter { center: u16, dead_zone: u16 },
    /// Free slider: direction is the sign of a movement larger than `threshold`.
    RelativeDelta { threshold: u16 },
    /// Free slider quantized into `step`-count buckets; a bucket change is one event.
    Stepped { step: u16 },
}

/// Absolute-center classification of one value.
pub fn classify_absolute(value: u16, center: u16, dead_zone: u16) -> Direction {
    let value = i32::from(value);
    let center = i32::from(center);
    let dead_zone = i32::from(dead_zone);

    if value < center - dead_zone {
        Direction::Negative
    } else if value > center + dead_zone {
        Direction::Positive
    } else {
        Direction::Neutral
    }
}

#[derive(Clone, Debug)]
pub struct DirectionClassifier {
    policy: ClassifierPolicy,
}

impl DirectionClassifier {
    pub fn new(policy: ClassifierPolicy) -> Self {
        Self { policy }
    }

    pub fn classify(&self, filtered: &FilterOutput) -> Direction {
        match self.policy {
            ClassifierPolicy::AbsoluteCenter { center, dead_zone } => {
                classify_absolute(filtered.value.value(), center, dead_zone)
            }
            ClassifierPolicy::RelativeDelta { threshold } => {
                if filtered.changed && filtered.delta.unsigned_abs() > u32::from(threshold) {
                    Direction::from_sign(filtered.delta)
                } else {
                    Direction::Neutral
                }
            }
            ClassifierPolicy::Stepped { step } => {
                if !filtered.changed || step == 0 {
                    return Direction::Neutral;
                }
                let before = i32::from(filtered.baseline.value() / step);
                let after = i32::from(filtered.value.value() / step);
                Direction::from_sign(after - before)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::sampler::{AdcRange, Sample};

    fn output(baseline: u16, value: u16, changed: bool) -> FilterOutput {
        let range = AdcRange::default();
        let baseline = Sample::clamped(baseline, range);
        let value = Sample::clamped(value, range);
        FilterOutput {
            baseline,
            value,
            delta: value.delta_from(baseline),
            changed,
        }
    }

    #[test]
    fn absolute_center_is_neutral_inside_dead_zone() {
        for value in 442..=582 {
            assert_eq!(classify_absolute(value, 512, 70), Direction::Neutral, "{value}");
        }
    }

    #[test]
    fn absolute_center_outside_dead_zone() {
        for value in 0..442 {
            assert_eq!(classify_absolute(value, 512, 70), Direction::Negative);
        }
        for value in 583..=1023 {
            assert_eq!(classify_absolute(value, 512, 70), Direction::Positive);
        }
    }

    #[test]
    fn absolute_center_near_range_edge_does_not_underflow() {
        assert_eq!(classify_absolute(0, 30, 50), Direction::Neutral);
    }

    #[test]
    fn relative_delta_needs_change_above_threshold() {
        let classifier = DirectionClassifier::new(ClassifierPolicy::RelativeDelta { threshold: 3 });
        assert_eq!(classifier.classify(&output(500, 503, true)), Direction::Neutral);
        assert_eq!(classifier.classify(&output(500, 504, true)), Direction::Positive);
        assert_eq!(classifier.classify(&output(500, 490, true)), Direction::Negative);
        assert_eq!(classifier.classify(&output(500, 500, false)), Direction::Neutral);
    }

    #[test]
    fn stepped_emits_on_bucket_change_only() {
        let classifier = DirectionClassifier::new(ClassifierPolicy::Stepped { step: 12 });
        // 120 and 131 share bucket 10
        assert_eq!(classifier.classify(&output(120, 131, true)), Direction::Neutral);
        assert_eq!(classifier.classify(&output(131, 132, true)), Direction::Positive);
        assert_eq!(classifier.classify(&output(132, 100, true)), Direction::Negative);
    }

    #[test]
    fn direction_from_sign() {
        assert_eq!(Direction::from_sign(-40).as_i8(), -1);
        assert_eq!(Direction::from_sign(0).as_i8(), 0);
        assert_eq!(Direction::from_sign(7).as_i8(), 1);
        assert_eq!(Direction::Negative.to_string(), "-1");
    }
}
