//! Device lifecycle with statum state machine
//!
//! Ties the slider pipelines, the mode switch, the window switcher and the
//! LEDs together behind one event entry point.
//!
//! # State Machine
//!
//! ```text
//! Assembled ──► Verified ──► Running
//!  (profile)    (sampler)    (handle events)
//! ```
//!
//! # Tick
//!
//! ```text
//! PinInput ──► ModeSwitch ──► layer_move
//!                  │
//! AnalogSampler ──► SliderChannel × n ──► WindowSwitcher ──► emit / hold
//!                                                         └► release on timeout
//! AnimationPlayer ──► LedCompositor ──► set_leds
//! ```

pub mod event;

pub use event::{DeviceStats, InputEvent, KeyDisposition, KeyTrigger, Response};

use crate::dispatch::{EventDispatcher, OutputAction, WindowSwitcher};
use crate::host::HostPort;
use crate::indicator::{Animation, LayerIndicator, LayerState, LedCompositor};
use crate::input::sampler::verify_channels;
use crate::input::{
    AdcRange, AnalogSampler, DebounceFilter, DirectionClassifier, Mode, ModeSwitch, RateLimiter,
    SamplerError, SliderChannel,
};
use crate::profile::{BaseLayers, ModeLabels, Profile, ProfileError};
use crate::time::Millis;
use statum::{machine, state};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Sampler rejected the profile: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Profile expects ADC range 0..={profile}, sampler converts 0..={sampler}")]
    AdcMismatch { profile: u16, sampler: u16 },
}

/// Lifecycle states of a device
#[state]
#[derive(Debug, Clone)]
pub enum DeviceState {
    Assembled, // Built from a validated profile
    Verified,  // Channels checked against the sampler
    Running,   // Handling events
}

/// Animations a device may play, built once from the profile.
#[derive(Debug, Clone)]
pub struct AnimationSet {
    boot: Option<Animation>,
    sleep: Animation,
    compose: Option<Animation>,
}

#[machine]
pub struct Device<S: DeviceState> {
    name: String,
    adc: AdcRange,
    sliders: Vec<SliderChannel>,
    switch: ModeSwitch,
    switch_pin: u8,
    base_layers: Option<BaseLayers>,
    labels: ModeLabels,
    window: WindowSwitcher,
    leds: LedCompositor,
    animations: AnimationSet,
    stats: DeviceStats,
}

impl<S: DeviceState> Device<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.switch.mode()
    }

    pub fn stats(&self) -> DeviceStats {
        self.stats
    }
}

impl Device<Assembled> {
    /// Builds a device from `profile` after validating it.
    pub fn assemble(profile: &Profile) -> Result<Self, DeviceError> {
        profile.validate()?;
        info!("Assembling device from profile '{}'", profile.name);

        let sliders = profile
            .sliders
            .iter()
            .map(|config| {
                debug!(
                    "Slider {}: deadband {}, {:?}, {}ms interval",
                    config.channel, config.deadband, config.classifier, config.min_interval_ms
                );
                SliderChannel::new(
                    config.channel,
                    DebounceFilter::new(config.deadband),
                    DirectionClassifier::new(config.classifier),
                    RateLimiter::new(config.min_interval_ms),
                    EventDispatcher::new(config.actions),
                )
            })
            .collect();

        let indicator_config = &profile.indicator;
        let width = indicator_config.width();
        let indicator = LayerIndicator::new(
            width,
            indicator_config.patterns.clone(),
            indicator_config.tri_layer,
        );
        let leds = LedCompositor::new(indicator, indicator_config.mode_overlay.clone());

        let animations = AnimationSet {
            boot: (indicator_config.boot_blink_cycles > 0)
                .then(|| Animation::boot_blink(width, indicator_config.boot_blink_cycles)),
            sleep: Animation::sleep_pulse(width, indicator_config.sleep_pulse_cycles),
            compose: indicator_config
                .compose_flash
                .as_ref()
                .map(|flash| Animation::flash(flash.pattern.clone(), flash.duration_ms)),
        };

        let switch_config = &profile.mode_switch;
        Ok(Self::new(
            profile.name.clone(),
            profile.adc,
            sliders,
            ModeSwitch::new(switch_config.active_low, switch_config.debounce),
            switch_config.pin,
            switch_config.base_layers,
            switch_config.labels.clone(),
            WindowSwitcher::new(profile.window_switch.hold_timeout_ms),
            leds,
            animations,
            DeviceStats::default(),
        ))
    }

    /// Checks that `sampler` converts over the range the profile was written
    /// for and that every slider channel exists on it.
    pub fn verify<A: AnalogSampler + ?Sized>(
        self,
        sampler: &A,
    ) -> Result<Device<Verified>, DeviceError> {
        if sampler.range() != self.adc {
            warn!(
                "Profile '{}' is written for 0..={}, sampler converts 0..={}",
                self.name,
                self.adc.max,
                sampler.range().max
            );
            return Err(DeviceError::AdcMismatch {
                profile: self.adc.max,
                sampler: sampler.range().max,
            });
        }
        verify_channels(sampler, self.sliders.iter().map(|slider| slider.channel()))?;
        info!(
            "Device '{}' verified: {} slider(s), ADC 0..={}",
            self.name,
            self.sliders.len(),
            sampler.range().max
        );
        Ok(self.transition())
    }
}

impl Device<Verified> {
    /// Starts the device. Shows the boot animation if configured, otherwise
    /// the pattern of the base layer.
    pub fn start<P: HostPort + ?Sized>(mut self, now: Millis, port: &mut P) -> Device<Running> {
        info!("Starting device '{}'", self.name);
        let mode = self.switch.mode();
        let first = match self.animations.boot.clone() {
            Some(boot) => self.leds.play(boot, mode, now),
            None => self.leds.refresh(mode, now),
        };
        if let Some(pattern) = first {
            port.set_leds(&pattern);
        }
        self.transition()
    }
}

impl Device<Running> {
    pub fn handle<P: HostPort + ?Sized>(&mut self, event: InputEvent, port: &mut P) -> Response {
        match event {
            InputEvent::Tick { now } => {
                self.tick(now, port);
                Response::Ticked
            }
            InputEvent::LayerChanged { state, .. } => {
                Response::Layers(self.on_layer_change(state, port))
            }
            InputEvent::KeyPressed { key, now } => Response::Key(self.on_key(key, now, port)),
        }
    }

    /// One poll tick: mode switch, window hold, sliders, then LEDs.
    pub fn tick<P: HostPort + ?Sized>(&mut self, now: Millis, port: &mut P) {
        self.stats.ticks += 1;

        let level = port.read_level(self.switch_pin);
        let reading = self.switch.poll(level);
        if reading.changed {
            self.stats.mode_changes += 1;
            info!("{} mode active", self.labels.for_mode(reading.mode));
            if let Some(base) = &self.base_layers {
                let target = base.for_mode(reading.mode);
                debug!("Moving to base layer {}", target);
                port.layer_move(target);
            }
        }

        if let Some(modifier) = self.window.expire(now) {
            port.release(modifier);
        }

        let mode = reading.mode;
        let actions: Vec<OutputAction> = self
            .sliders
            .iter_mut()
            .map(|slider| {
                let sample = port.sample(slider.channel());
                slider.step(sample, mode, now)
            })
            .filter(|action| !action.is_none())
            .collect();
        for action in actions {
            self.perform(action, now, port);
        }

        if let Some(pattern) = self.leds.refresh(mode, now) {
            port.set_leds(&pattern);
        }
    }

    /// Folds `state` for the indicator and returns the folded state.
    pub fn on_layer_change<P: HostPort + ?Sized>(
        &mut self,
        state: LayerState,
        port: &mut P,
    ) -> LayerState {
        self.stats.layer_changes += 1;
        let (folded, pattern) = self.leds.on_layers(state, self.switch.mode());
        if let Some(pattern) = pattern {
            port.set_leds(&pattern);
        }
        folded
    }

    pub fn on_key<P: HostPort + ?Sized>(
        &mut self,
        key: KeyTrigger,
        now: Millis,
        port: &mut P,
    ) -> KeyDisposition {
        let mode = self.switch.mode();
        match key {
            KeyTrigger::WindowSwitch { toward } => {
                self.perform(OutputAction::WindowSwitch { toward }, now, port);
                KeyDisposition::Consumed
            }
            KeyTrigger::SystemSleep => {
                info!("System sleep requested");
                let sleep = self.animations.sleep.clone();
                if let Some(pattern) = self.leds.play(sleep, mode, now) {
                    port.set_leds(&pattern);
                }
                KeyDisposition::PassThrough
            }
            KeyTrigger::Compose => {
                match self.animations.compose.clone() {
                    Some(flash) => {
                        if let Some(pattern) = self.leds.play(flash, mode, now) {
                            port.set_leds(&pattern);
                        }
                    }
                    None => debug!("No compose flash configured"),
                }
                KeyDisposition::PassThrough
            }
        }
    }

    /// Leaves the host clean before the loop exits: a held modifier is
    /// released and a running animation gives way to the base pattern.
    pub fn shutdown<P: HostPort + ?Sized>(&mut self, port: &mut P) {
        if let Some(modifier) = self.window.release_now() {
            info!("Releasing {:?} on shutdown", modifier);
            port.release(modifier);
        }
        if let Some(pattern) = self.leds.stop(self.switch.mode()) {
            port.set_leds(&pattern);
        }
    }

    fn perform<P: HostPort + ?Sized>(&mut self, action: OutputAction, now: Millis, port: &mut P) {
        match action {
            OutputAction::None => {
                warn!("Ignoring empty action");
                return;
            }
            OutputAction::WindowSwitch { toward } => {
                let step = self.window.step(toward, now);
                if let Some(modifier) = step.hold {
                    port.hold(modifier);
                }
                port.emit(step.action);
            }
            other => port.emit(other),
        }
        self.stats.emitted += 1;
        debug!("Emitted {} at {}", action, now);
    }
}
