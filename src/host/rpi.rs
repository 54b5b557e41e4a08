//! Raspberry Pi host: toggle and LEDs on GPIO, sliders on an MCP3008.

use super::{EventSource, HostCommand, HostError, HostOutput, LayerTracker, PinInput};
use crate::device::InputEvent;
use crate::dispatch::{Modifier, OutputAction};
use crate::indicator::{LayerState, LedPattern};
use crate::input::{AdcRange, AnalogSampler, Channel, PinLevel};
use crate::profile::Profile;
use crate::time::Millis;
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

const MCP3008_CHANNELS: u8 = 8;
const SPI_CLOCK_HZ: u32 = 1_350_000;

/// 10-bit, 8-channel SPI converter.
pub struct Mcp3008 {
    spi: Spi,
    last_good: HashMap<Channel, u16>,
}

impl Mcp3008 {
    pub fn open() -> Result<Self, HostError> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HostError::Hardware(format!("Failed to open SPI0: {}", e)))?;
        Ok(Self {
            spi,
            last_good: HashMap::new(),
        })
    }

    fn convert(&mut self, channel: Channel) -> Result<u16, rppal::spi::Error> {
        // Start bit, single-ended mode and channel number, then clock out 10 bits.
        let tx = [1u8, (8 + channel.0) << 4, 0];
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &tx)?;
        Ok((u16::from(rx[1] & 3) << 8) | u16::from(rx[2]))
    }
}

impl AnalogSampler for Mcp3008 {
    fn range(&self) -> AdcRange {
        AdcRange { max: 1023 }
    }

    fn supports(&self, channel: Channel) -> bool {
        channel.0 < MCP3008_CHANNELS
    }

    fn read_raw(&mut self, channel: Channel) -> u16 {
        match self.convert(channel) {
            Ok(value) => {
                self.last_good.insert(channel, value);
                value
            }
            Err(e) => {
                let held = self.last_good.get(&channel).copied().unwrap_or(512);
                warn!("Reading {} failed, holding {}: {}", channel, held, e);
                held
            }
        }
    }
}

pub struct RpiPort {
    adc: Mcp3008,
    switch: InputPin,
    switch_pin: u8,
    leds: Vec<OutputPin>,
    tracker: LayerTracker,
    commands: mpsc::Sender<HostCommand>,
}

impl RpiPort {
    /// Claims the pins named in `profile`.
    pub fn open(profile: &Profile, commands: mpsc::Sender<HostCommand>) -> Result<Self, HostError> {
        let gpio = Gpio::new().map_err(|e| HostError::Hardware(format!("GPIO: {}", e)))?;
        let claim = |pin: u8| {
            gpio.get(pin)
                .map_err(|e| HostError::Hardware(format!("GPIO{}: {}", pin, e)))
        };

        let switch_pin = profile.mode_switch.pin;
        let switch = claim(switch_pin)?.into_input_pullup();
        let leds = profile
            .indicator
            .led_pins
            .iter()
            .map(|pin| claim(*pin).map(|p| p.into_output_low()))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Raspberry Pi host ready: switch on GPIO{}, {} LEDs, MCP3008 on SPI0",
            switch_pin,
            leds.len()
        );
        Ok(Self {
            adc: Mcp3008::open()?,
            switch,
            switch_pin,
            leds,
            tracker: LayerTracker::new(),
            commands,
        })
    }

    fn forward(&self, command: HostCommand) {
        if let Err(e) = self.commands.try_send(command) {
            warn!("Dropping host command: {}", e);
        }
    }
}

impl AnalogSampler for RpiPort {
    fn range(&self) -> AdcRange {
        self.adc.range()
    }

    fn supports(&self, channel: Channel) -> bool {
        self.adc.supports(channel)
    }

    fn read_raw(&mut self, channel: Channel) -> u16 {
        self.adc.read_raw(channel)
    }
}

impl PinInput for RpiPort {
    fn read_level(&mut self, pin: u8) -> PinLevel {
        if pin != self.switch_pin {
            warn!("GPIO{} is not claimed as input, reading released", pin);
            return PinLevel::High;
        }
        match self.switch.read() {
            Level::Low => PinLevel::Low,
            Level::High => PinLevel::High,
        }
    }
}

impl HostOutput for RpiPort {
    fn emit(&mut self, action: OutputAction) {
        self.forward(HostCommand::Emit(action));
    }

    fn set_leds(&mut self, pattern: &LedPattern) {
        for (index, pin) in self.leds.iter_mut().enumerate() {
            if pattern.is_lit(index) {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
        self.forward(HostCommand::SetLeds(pattern.clone()));
    }

    fn layer_move(&mut self, layer: u8) {
        self.tracker.move_to(layer);
        self.forward(HostCommand::LayerMove(layer));
    }

    fn hold(&mut self, modifier: Modifier) {
        self.forward(HostCommand::Hold(modifier));
    }

    fn release(&mut self, modifier: Modifier) {
        self.forward(HostCommand::Release(modifier));
    }
}

impl EventSource for RpiPort {
    fn pending(&mut self, now: Millis) -> Option<Vec<InputEvent>> {
        Some(
            self.tracker
                .take_change()
                .map(|state| vec![InputEvent::LayerChanged { state, now }])
                .unwrap_or_default(),
        )
    }

    fn adopt_layers(&mut self, state: LayerState) {
        self.tracker.adopt(state);
    }
}
