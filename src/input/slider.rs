//! One slider from sample to action

use super::classify::{Direction, DirectionClassifier};
use super::debounce::DebounceFilter;
use super::mode_switch::Mode;
use super::rate_limit::RateLimiter;
use super::sampler::{Channel, Sample};
use crate::dispatch::{EventDispatcher, OutputAction};
use crate::time::Millis;
use tracing::debug;

/// Everything one slider needs between ticks
///
/// ```text
/// Sample ──► DebounceFilter ──► DirectionClassifier ──► EventDispatcher ──► RateLimiter
/// ```
#[derive(Debug, Clone)]
pub struct SliderChannel {
    channel: Channel,
    filter: DebounceFilter,
    classifier: DirectionClassifier,
    limiter: RateLimiter,
    dispatcher: EventDispatcher,
}

impl SliderChannel {
    pub fn new(
        channel: Channel,
        filter: DebounceFilter,
        classifier: DirectionClassifier,
        limiter: RateLimiter,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            channel,
            filter,
            classifier,
            limiter,
            dispatcher,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn filter(&self) -> &DebounceFilter {
        &self.filter
    }

    /// Direction of this tick without dispatching anything.
    pub fn classify(&mut self, sample: Sample) -> Direction {
        match self.filter.update(sample) {
            Some(filtered) => self.classifier.classify(&filtered),
            None => Direction::Neutral,
        }
    }

    /// Runs one tick. Returns the action only if it is emitted now.
    pub fn step(&mut self, sample: Sample, mode: Mode, now: Millis) -> OutputAction {
        let direction = self.classify(sample);
        let action = self.dispatcher.dispatch(direction, mode);
        if action.is_none() {
            return OutputAction::None;
        }

        if !self.limiter.should_process(now, self.filter.last_emit()) {
            debug!(
                "{} rate limited: {} suppressed ({}ms interval)",
                self.channel,
                action,
                self.limiter.min_interval_ms()
            );
            return OutputAction::None;
        }

        self.filter.mark_emitted(now);
        action
    }
}
