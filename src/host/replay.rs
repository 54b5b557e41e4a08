//! Trace replay host
//!
//! A trace is a TOML list of frames. Each frame overrides part of the input
//! state at `at_ms` after the start; everything not mentioned keeps its last
//! value, so a frame only needs the inputs that changed.
//!
//! ```toml
//! [[frames]]
//! at_ms = 0
//! switch = "high"
//! [[frames.samples]]
//! channel = 26
//! value = 512
//!
//! [[frames]]
//! at_ms = 300
//! held_layers = [1, 2]
//! keys = [{ kind = "system_sleep" }]
//! ```

use super::{EventSource, HostCommand, HostError, HostOutput, LayerTracker, PinInput};
use crate::device::{InputEvent, KeyTrigger};
use crate::dispatch::{Modifier, OutputAction};
use crate::indicator::{LayerState, LedPattern};
use crate::input::{AdcRange, AnalogSampler, Channel, PinLevel};
use crate::time::Millis;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSample {
    pub channel: Channel,
    pub value: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub at_ms: u32,
    #[serde(default)]
    pub switch: Option<PinLevel>,
    #[serde(default)]
    pub samples: Vec<TraceSample>,
    #[serde(default)]
    pub held_layers: Option<Vec<u8>>,
    #[serde(default)]
    pub keys: Vec<KeyTrigger>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub name: String,
    /// How long to keep running after the last frame.
    #[serde(default = "default_tail_ms")]
    pub tail_ms: u32,
    #[serde(default)]
    pub frames: Vec<TraceFrame>,
}

fn default_tail_ms() -> u32 {
    500
}

impl Trace {
    pub async fn load(path: &Path) -> Result<Self, HostError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| HostError::TraceIo {
                path: path.to_path_buf(),
                source,
            })?;
        let trace: Trace = toml::from_str(&content).map_err(|source| HostError::TraceParse {
            path: path.to_path_buf(),
            source,
        })?;
        trace.check_order()?;
        info!(
            "Trace '{}' loaded: {} frames over {}ms",
            trace.name,
            trace.frames.len(),
            trace.end_ms()
        );
        Ok(trace)
    }

    pub fn check_order(&self) -> Result<(), HostError> {
        for pair in self.frames.windows(2) {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(HostError::TraceOrder(pair[1].at_ms));
            }
        }
        Ok(())
    }

    /// Time after which the replay is over.
    pub fn end_ms(&self) -> u32 {
        self.frames
            .last()
            .map_or(0, |frame| frame.at_ms)
            .saturating_add(self.tail_ms)
    }

    /// Channels the trace provides samples for.
    pub fn channels(&self) -> HashSet<Channel> {
        self.frames
            .iter()
            .flat_map(|frame| frame.samples.iter().map(|sample| sample.channel))
            .collect()
    }
}

/// Host that plays a [`Trace`] and forwards output over a channel.
pub struct ReplayPort {
    trace: Trace,
    next_frame: usize,
    started: Option<Millis>,
    range: AdcRange,
    supported: HashSet<Channel>,
    samples: HashMap<Channel, u16>,
    level: PinLevel,
    tracker: LayerTracker,
    commands: mpsc::Sender<HostCommand>,
    dropped: u64,
}

impl ReplayPort {
    pub fn new(trace: Trace, range: AdcRange, commands: mpsc::Sender<HostCommand>) -> Self {
        let supported = trace.channels();
        Self {
            trace,
            next_frame: 0,
            started: None,
            range,
            supported,
            samples: HashMap::new(),
            level: PinLevel::High,
            tracker: LayerTracker::new(),
            commands,
            dropped: 0,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn layers(&self) -> &LayerTracker {
        &self.tracker
    }

    fn send(&mut self, command: HostCommand) {
        match self.commands.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                self.dropped += 1;
                warn!("Command queue full, dropping {}", command);
            }
            Err(TrySendError::Closed(command)) => {
                self.dropped += 1;
                warn!("Command receiver gone, dropping {}", command);
            }
        }
    }

    fn apply(&mut self, frame_index: usize, now: Millis, events: &mut Vec<InputEvent>) {
        let frame = &self.trace.frames[frame_index];
        debug!("Applying trace frame at {}ms", frame.at_ms);
        if let Some(level) = frame.switch {
            self.level = level;
        }
        for sample in &frame.samples {
            self.samples.insert(sample.channel, sample.value);
        }
        if let Some(held) = &frame.held_layers {
            self.tracker
                .set_held(LayerState::from_layers(held.iter().copied()));
        }
        events.extend(
            frame
                .keys
                .iter()
                .map(|key| InputEvent::KeyPressed { key: *key, now }),
        );
    }
}

impl EventSource for ReplayPort {
    fn pending(&mut self, now: Millis) -> Option<Vec<InputEvent>> {
        let started = *self.started.get_or_insert(now);
        let offset = now.elapsed_since(started);

        let mut keys = Vec::new();
        while self.next_frame < self.trace.frames.len()
            && self.trace.frames[self.next_frame].at_ms <= offset
        {
            self.apply(self.next_frame, now, &mut keys);
            self.next_frame += 1;
        }

        let mut events = Vec::new();
        if let Some(state) = self.tracker.take_change() {
            events.push(InputEvent::LayerChanged { state, now });
        }
        events.extend(keys);

        let exhausted = self.next_frame == self.trace.frames.len();
        if events.is_empty() && exhausted && offset >= self.trace.end_ms() {
            return None;
        }
        Some(events)
    }

    fn adopt_layers(&mut self, state: LayerState) {
        self.tracker.adopt(state);
    }
}

impl AnalogSampler for ReplayPort {
    fn range(&self) -> AdcRange {
        self.range
    }

    fn supports(&self, channel: Channel) -> bool {
        self.supported.is_empty() || self.supported.contains(&channel)
    }

    fn read_raw(&mut self, channel: Channel) -> u16 {
        self.samples
            .get(&channel)
            .copied()
            .unwrap_or(self.range.max / 2 + 1)
    }
}

impl PinInput for ReplayPort {
    fn read_level(&mut self, _pin: u8) -> PinLevel {
        self.level
    }
}

impl HostOutput for ReplayPort {
    fn emit(&mut self, action: OutputAction) {
        self.send(HostCommand::Emit(action));
    }

    fn set_leds(&mut self, pattern: &LedPattern) {
        self.send(HostCommand::SetLeds(pattern.clone()));
    }

    fn layer_move(&mut self, layer: u8) {
        self.tracker.move_to(layer);
        self.send(HostCommand::LayerMove(layer));
    }

    fn hold(&mut self, modifier: Modifier) {
        self.send(HostCommand::Hold(modifier));
    }

    fn release(&mut self, modifier: Modifier) {
        self.send(HostCommand::Release(modifier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace() -> Trace {
        toml::from_str(
            r#"
            name = "unit"
            tail_ms = 100

            [[frames]]
            at_ms = 0
            switch = "high"
            [[frames.samples]]
            channel = 26
            value = 512

            [[frames]]
            at_ms = 200
            held_layers = [1]
            keys = [{ kind = "compose" }]
            [[frames.samples]]
            channel = 26
            value = 100
            "#,
        )
        .unwrap()
    }

    #[test]
    fn frames_are_sample_and_hold() {
        let (tx, _rx) = mpsc::channel(16);
        let mut port = ReplayPort::new(trace(), AdcRange::default(), tx);

        let first = port.pending(Millis(1000)).unwrap();
        assert_eq!(
            first,
            vec![InputEvent::LayerChanged {
                state: LayerState::only(0),
                now: Millis(1000)
            }]
        );
        assert_eq!(port.read_raw(Channel(26)), 512);

        assert_eq!(port.pending(Millis(1100)), Some(vec![]));
        assert_eq!(port.read_raw(Channel(26)), 512);

        let second = port.pending(Millis(1200)).unwrap();
        assert_eq!(second.len(), 2);
        assert!(matches!(second[1], InputEvent::KeyPressed { key: KeyTrigger::Compose, .. }));
        assert_eq!(port.read_raw(Channel(26)), 100);

        assert_eq!(port.pending(Millis(1250)), Some(vec![]));
        assert_eq!(port.pending(Millis(1300)), None);
    }

    #[test]
    fn only_traced_channels_are_supported() {
        let (tx, _rx) = mpsc::channel(1);
        let port = ReplayPort::new(trace(), AdcRange::default(), tx);
        assert!(port.supports(Channel(26)));
        assert!(!port.supports(Channel(27)));
    }

    #[test]
    fn out_of_order_frames_are_rejected() {
        let mut trace = trace();
        trace.frames.swap(0, 1);
        assert!(matches!(trace.check_order(), Err(HostError::TraceOrder(0))));
    }

    #[tokio::test]
    async fn outputs_are_forwarded() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut port = ReplayPort::new(trace(), AdcRange::default(), tx);
        port.layer_move(4);
        port.emit(OutputAction::MediaVolumeUp);
        assert_eq!(rx.recv().await, Some(HostCommand::LayerMove(4)));
        assert_eq!(rx.recv().await, Some(HostCommand::Emit(OutputAction::MediaVolumeUp)));
        assert_eq!(port.layers().state(), LayerState::only(4));
    }
}
