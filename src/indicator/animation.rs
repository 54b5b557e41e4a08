//! Timed LED sequences
//!
//! An [`Animation`] is a list of steps played `cycles` times. The
//! [`AnimationPlayer`] only remembers which step is showing and when it
//! started, so it is advanced from the tick loop instead of sleeping.

use super::pattern::LedPattern;
use crate::time::Millis;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub pattern: LedPattern,
    pub duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,
    pub steps: Vec<Step>,
    pub cycles: u16,
}

impl Animation {
    pub fn new(name: impl Into<String>, steps: Vec<Step>, cycles: u16) -> Self {
        Self {
            name: name.into(),
            steps,
            cycles,
        }
    }

    /// Outer and inner LEDs alternating, 200ms each.
    pub fn boot_blink(width: usize, cycles: u16) -> Self {
        Self::new(
            "boot blink",
            vec![
                Step {
                    pattern: LedPattern::outer(width),
                    duration_ms: 200,
                },
                Step {
                    pattern: LedPattern::inner(width),
                    duration_ms: 200,
                },
            ],
            cycles,
        )
    }

    /// All LEDs on then off, 200ms each.
    pub fn sleep_pulse(width: usize, cycles: u16) -> Self {
        Self::new(
            "sleep pulse",
            vec![
                Step {
                    pattern: LedPattern::all_on(width),
                    duration_ms: 200,
                },
                Step {
                    pattern: LedPattern::off(width),
                    duration_ms: 200,
                },
            ],
            cycles,
        )
    }

    pub fn flash(pattern: LedPattern, duration_ms: u32) -> Self {
        Self::new(
            "flash",
            vec![Step {
                pattern,
                duration_ms,
            }],
            1,
        )
    }

    pub fn total_duration_ms(&self) -> u64 {
        let per_cycle: u64 = self.steps.iter().map(|s| u64::from(s.duration_ms)).sum();
        per_cycle * u64::from(self.cycles)
    }

    fn is_empty(&self) -> bool {
        self.steps.is_empty() || self.cycles == 0
    }
}

/// What the LEDs should do after a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Nothing running, or the current step is still showing.
    Unchanged,
    Show(LedPattern),
    /// The last step just ended; the caller restores its own pattern.
    Finished,
}

#[derive(Clone, Debug)]
struct Playing {
    animation: Animation,
    step: usize,
    cycle: u16,
    step_started: Millis,
}

impl Playing {
    fn current(&self) -> &Step {
        &self.animation.steps[self.step]
    }

    /// Moves to the next step. Returns false once every cycle is done.
    fn advance(&mut self) -> bool {
        self.step += 1;
        if self.step == self.animation.steps.len() {
            self.step = 0;
            self.cycle += 1;
        }
        self.cycle < self.animation.cycles
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnimationPlayer {
    playing: Option<Playing>,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.playing.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.playing.as_ref().map(|p| p.animation.name.as_str())
    }

    /// Starts `animation`, replacing whatever was running.
    ///
    /// Returns the first pattern to show, or [`Frame::Finished`] for an
    /// animation with nothing to play.
    pub fn start(&mut self, animation: Animation, now: Millis) -> Frame {
        if animation.is_empty() {
            self.playing = None;
            return Frame::Finished;
        }
        debug!(
            "Starting LED animation '{}' ({}ms)",
            animation.name,
            animation.total_duration_ms()
        );
        let playing = Playing {
            animation,
            step: 0,
            cycle: 0,
            step_started: now,
        };
        let first = playing.current().pattern.clone();
        self.playing = Some(playing);
        Frame::Show(first)
    }

    pub fn stop(&mut self) {
        self.playing = None;
    }

    /// Advances past every step that has run out by `now`.
    pub fn tick(&mut self, now: Millis) -> Frame {
        let Some(playing) = self.playing.as_mut() else {
            return Frame::Unchanged;
        };

        let mut moved = false;
        loop {
            let duration = playing.current().duration_ms;
            if now.elapsed_since(playing.step_started) < duration {
                break;
            }
            playing.step_started = playing.step_started.after(duration);
            moved = true;
            if !playing.advance() {
                debug!("LED animation '{}' finished", playing.animation.name);
                self.playing = None;
                return Frame::Finished;
            }
        }

        if moved {
            Frame::Show(playing.current().pattern.clone())
        } else {
            Frame::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_blink_alternates_then_finishes() {
        let mut player = AnimationPlayer::new();
        let start = player.start(Animation::boot_blink(3, 2), Millis(0));
        assert_eq!(start, Frame::Show(LedPattern::outer(3)));

        assert_eq!(player.tick(Millis(150)), Frame::Unchanged);
        assert_eq!(player.tick(Millis(200)), Frame::Show(LedPattern::inner(3)));
        assert_eq!(player.tick(Millis(400)), Frame::Show(LedPattern::outer(3)));
        assert_eq!(player.tick(Millis(600)), Frame::Show(LedPattern::inner(3)));
        assert_eq!(player.tick(Millis(799)), Frame::Unchanged);
        assert_eq!(player.tick(Millis(800)), Frame::Finished);
        assert!(!player.is_running());
        assert_eq!(player.tick(Millis(1000)), Frame::Unchanged);
    }

    #[test]
    fn long_gap_catches_up() {
        let mut player = AnimationPlayer::new();
        player.start(Animation::sleep_pulse(3, 5), Millis(0));
        // 1100ms in: step 5 of 10 (all off), started at 1000ms.
        assert_eq!(player.tick(Millis(1100)), Frame::Show(LedPattern::off(3)));
        assert_eq!(player.tick(Millis(5000)), Frame::Finished);
    }

    #[test]
    fn flash_runs_once() {
        let mut player = AnimationPlayer::new();
        let middle = LedPattern::single(3, 1);
        assert_eq!(
            player.start(Animation::flash(middle.clone(), 100), Millis(10)),
            Frame::Show(middle)
        );
        assert_eq!(player.tick(Millis(109)), Frame::Unchanged);
        assert_eq!(player.tick(Millis(110)), Frame::Finished);
    }

    #[test]
    fn empty_animation_finishes_immediately() {
        let mut player = AnimationPlayer::new();
        assert_eq!(
            player.start(Animation::boot_blink(3, 0), Millis(0)),
            Frame::Finished
        );
        assert!(!player.is_running());
    }
}
