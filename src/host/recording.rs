use super::{HostCommand, HostOutput, PinInput};
use crate::dispatch::{Modifier, OutputAction};
use crate::indicator::LedPattern;
use crate::input::{AdcRange, AnalogSampler, Channel, PinLevel};
use std::collections::{HashMap, HashSet};

/// In-memory host
///
/// Samples and the switch level are set by hand, every output call is
/// recorded as a [`HostCommand`]. Unset channels read mid-scale.
#[derive(Debug, Clone)]
pub struct RecordingPort {
    range: AdcRange,
    supported: Option<HashSet<Channel>>,
    samples: HashMap<Channel, u16>,
    level: PinLevel,
    commands: Vec<HostCommand>,
}

impl Default for RecordingPort {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPort {
    /// Port accepting every channel, switch released.
    pub fn new() -> Self {
        Self {
            range: AdcRange::default(),
            supported: None,
            samples: HashMap::new(),
            level: PinLevel::High,
            commands: Vec::new(),
        }
    }

    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            supported: Some(channels.into_iter().collect()),
            ..Self::new()
        }
    }

    pub fn set_sample(&mut self, channel: Channel, value: u16) {
        self.samples.insert(channel, value);
    }

    pub fn set_level(&mut self, level: PinLevel) {
        self.level = level;
    }

    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn emitted(&self) -> Vec<OutputAction> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                HostCommand::Emit(action) => Some(*action),
                _ => None,
            })
            .collect()
    }

    pub fn layer_moves(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                HostCommand::LayerMove(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    pub fn last_leds(&self) -> Option<LedPattern> {
        self.commands.iter().rev().find_map(|command| match command {
            HostCommand::SetLeds(pattern) => Some(pattern.clone()),
            _ => None,
        })
    }
}

impl AnalogSampler for RecordingPort {
    fn range(&self) -> AdcRange {
        self.range
    }

    fn supports(&self, channel: Channel) -> bool {
        self.supported
            .as_ref()
            .map_or(true, |supported| supported.contains(&channel))
    }

    fn read_raw(&mut self, channel: Channel) -> u16 {
        self.samples
            .get(&channel)
            .copied()
            .unwrap_or(self.range.max / 2 + 1)
    }
}

impl PinInput for RecordingPort {
    fn read_level(&mut self, _pin: u8) -> PinLevel {
        self.level
    }
}

impl HostOutput for RecordingPort {
    fn emit(&mut self, action: OutputAction) {
        self.commands.push(HostCommand::Emit(action));
    }

    fn set_leds(&mut self, pattern: &LedPattern) {
        self.commands.push(HostCommand::SetLeds(pattern.clone()));
    }

    fn layer_move(&mut self, layer: u8) {
        self.commands.push(HostCommand::LayerMove(layer));
    }

    fn hold(&mut self, modifier: Modifier) {
        self.commands.push(HostCommand::Hold(modifier));
    }

    fn release(&mut self, modifier: Modifier) {
        self.commands.push(HostCommand::Release(modifier));
    }
}
