//! Device profile: everything a board needs, stored as TOML
//!
//! A profile names the slider channels with their filter, classifier and
//! action tables, the mode switch, and the LED indicator. Three presets mirror
//! the boards the crate grew out of.

pub mod error;
pub mod loader;

pub use error::ProfileError;
pub use loader::{default_path, load, save, PROFILE_DIR, PROFILE_FILE};

use crate::dispatch::{ActionPair, ActionTable};
use crate::indicator::{LedPattern, ModeOverlay, PatternEntry, TriLayer, MAX_LAYERS};
use crate::input::{AdcRange, Channel, ClassifierPolicy, Mode, SwitchDebounce};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const PRESETS: [&str; 3] = ["desnarler", "arrow-pad", "stepped-volume"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub adc: AdcRange,
    pub sliders: Vec<SliderConfig>,
    pub mode_switch: ModeSwitchConfig,
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub window_switch: WindowSwitchConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub channel: Channel,
    #[serde(default = "default_deadband")]
    pub deadband: u16,
    pub classifier: ClassifierPolicy,
    #[serde(default)]
    pub min_interval_ms: u32,
    pub actions: ActionTable,
}

fn default_deadband() -> u16 {
    2
}

/// Base layer to move to when a mode becomes active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayers {
    pub a: u8,
    pub b: u8,
}

impl BaseLayers {
    pub fn for_mode(&self, mode: Mode) -> u8 {
        match mode {
            Mode::A => self.a,
            Mode::B => self.b,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeLabels {
    pub a: String,
    pub b: String,
}

impl ModeLabels {
    pub fn for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::A => &self.a,
            Mode::B => &self.b,
        }
    }
}

impl Default for ModeLabels {
    fn default() -> Self {
        Self {
            a: "A".to_string(),
            b: "B".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSwitchConfig {
    pub pin: u8,
    #[serde(default = "default_active_low")]
    pub active_low: bool,
    #[serde(default)]
    pub debounce: SwitchDebounce,
    #[serde(default)]
    pub base_layers: Option<BaseLayers>,
    #[serde(default)]
    pub labels: ModeLabels,
}

fn default_active_low() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashConfig {
    pub pattern: LedPattern,
    pub duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Output pins, left to right. Their count is the pattern width.
    pub led_pins: Vec<u8>,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
    #[serde(default)]
    pub tri_layer: Option<TriLayer>,
    #[serde(default)]
    pub mode_overlay: Option<ModeOverlay>,
    #[serde(default)]
    pub boot_blink_cycles: u16,
    #[serde(default = "default_sleep_cycles")]
    pub sleep_pulse_cycles: u16,
    #[serde(default)]
    pub compose_flash: Option<FlashConfig>,
}

fn default_sleep_cycles() -> u16 {
    5
}

impl IndicatorConfig {
    pub fn width(&self) -> usize {
        self.led_pins.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSwitchConfig {
    pub hold_timeout_ms: u32,
}

impl Default for WindowSwitchConfig {
    fn default() -> Self {
        Self {
            hold_timeout_ms: 1000,
        }
    }
}

impl Profile {
    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name {
            "desnarler" => Ok(Self::desnarler()),
            "arrow-pad" => Ok(Self::arrow_pad()),
            "stepped-volume" => Ok(Self::stepped_volume()),
            other => Err(ProfileError::UnknownPreset(other.to_string())),
        }
    }

    /// Volume slider, OS toggle moving between base layers 0 and 4, three
    /// layer LEDs with lower/raise/adjust.
    pub fn desnarler() -> Self {
        let entry = |layers: [u8; 2], pattern: LedPattern| PatternEntry {
            layers: layers.to_vec(),
            pattern,
        };
        Self {
            name: "desnarler".to_string(),
            adc: AdcRange::default(),
            sliders: vec![SliderConfig {
                channel: Channel(26),
                deadband: 2,
                classifier: ClassifierPolicy::AbsoluteCenter {
                    center: 512,
                    dead_zone: 70,
                },
                min_interval_ms: 100,
                actions: ActionTable::uniform(ActionPair::volume()),
            }],
            mode_switch: ModeSwitchConfig {
                pin: 3,
                active_low: true,
                debounce: SwitchDebounce::Disabled,
                base_layers: Some(BaseLayers { a: 0, b: 4 }),
                labels: ModeLabels {
                    a: "Linux".to_string(),
                    b: "macOS".to_string(),
                },
            },
            indicator: IndicatorConfig {
                led_pins: vec![29, 27, 28],
                patterns: vec![
                    entry([0, 4], LedPattern::single(3, 0)),
                    entry([1, 5], LedPattern::single(3, 1)),
                    entry([2, 6], LedPattern::single(3, 2)),
                    entry([3, 7], LedPattern::all_on(3)),
                ],
                tri_layer: Some(TriLayer::new(1, 2, 3)),
                mode_overlay: None,
                boot_blink_cycles: 10,
                sleep_pulse_cycles: 5,
                compose_flash: None,
            },
            window_switch: WindowSwitchConfig::default(),
        }
    }

    /// Slider as left/right arrows at up to 20 keys per second.
    pub fn arrow_pad() -> Self {
        Self {
            name: "arrow-pad".to_string(),
            adc: AdcRange::default(),
            sliders: vec![SliderConfig {
                channel: Channel(26),
                deadband: 2,
                classifier: ClassifierPolicy::AbsoluteCenter {
                    center: 512,
                    dead_zone: 50,
                },
                min_interval_ms: 50,
                actions: ActionTable::uniform(ActionPair::arrows()),
            }],
            mode_switch: ModeSwitchConfig {
                pin: 3,
                active_low: true,
                debounce: SwitchDebounce::Consecutive { reads: 3 },
                base_layers: None,
                labels: ModeLabels::default(),
            },
            indicator: IndicatorConfig {
                led_pins: vec![29, 27, 28],
                patterns: vec![PatternEntry {
                    layers: vec![0],
                    pattern: LedPattern::single(3, 1),
                }],
                tri_layer: None,
                mode_overlay: Some(ModeOverlay {
                    mode: Mode::B,
                    pattern: LedPattern::outer(3),
                }),
                boot_blink_cycles: 3,
                sleep_pulse_cycles: 5,
                compose_flash: None,
            },
            window_switch: WindowSwitchConfig::default(),
        }
    }

    /// Every 12 raw counts of slider travel is one volume step.
    pub fn stepped_volume() -> Self {
        let single = |layer: u8| PatternEntry {
            layers: vec![layer],
            pattern: LedPattern::single(3, usize::from(layer)),
        };
        Self {
            name: "stepped-volume".to_string(),
            adc: AdcRange::default(),
            sliders: vec![SliderConfig {
                channel: Channel(26),
                deadband: 0,
                classifier: ClassifierPolicy::Stepped { step: 12 },
                min_interval_ms: 0,
                actions: ActionTable::uniform(ActionPair::volume()),
            }],
            mode_switch: ModeSwitchConfig {
                pin: 3,
                active_low: true,
                debounce: SwitchDebounce::Disabled,
                base_layers: None,
                labels: ModeLabels {
                    a: "Linux".to_string(),
                    b: "macOS".to_string(),
                },
            },
            indicator: IndicatorConfig {
                led_pins: vec![29, 27, 28],
                patterns: vec![single(0), single(1), single(2)],
                tri_layer: None,
                mode_overlay: None,
                boot_blink_cycles: 10,
                sleep_pulse_cycles: 5,
                compose_flash: None,
            },
            window_switch: WindowSwitchConfig::default(),
        }
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.sliders.iter().map(|slider| slider.channel)
    }

    /// Checks everything that would otherwise fail at the first tick.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.sliders.is_empty() {
            return Err(ProfileError::NoSliders(self.name.clone()));
        }

        let mut channels = HashSet::new();
        for slider in &self.sliders {
            if !channels.insert(slider.channel) {
                return Err(ProfileError::DuplicateChannel(slider.channel));
            }
            match slider.classifier {
                ClassifierPolicy::AbsoluteCenter { center, .. } if center > self.adc.max => {
                    return Err(ProfileError::CenterOutOfRange {
                        channel: slider.channel,
                        center,
                        max: self.adc.max,
                    });
                }
                // A gradual slide only ever moves the baseline by one deadband.
                ClassifierPolicy::RelativeDelta { threshold } if slider.deadband <= threshold => {
                    return Err(ProfileError::DeadbandBelowThreshold {
                        channel: slider.channel,
                        deadband: slider.deadband,
                        threshold,
                    });
                }
                ClassifierPolicy::Stepped { step: 0 } => {
                    return Err(ProfileError::ZeroStep(slider.channel));
                }
                _ => {}
            }
        }

        let mut pins = HashSet::new();
        for pin in std::iter::once(self.mode_switch.pin).chain(self.indicator.led_pins.iter().copied()) {
            if !pins.insert(pin) {
                return Err(ProfileError::PinConflict(pin));
            }
        }

        if let Some(base) = &self.mode_switch.base_layers {
            check_layer("base layers", base.a)?;
            check_layer("base layers", base.b)?;
        }

        let width = self.indicator.width();
        for entry in &self.indicator.patterns {
            let context = format!("pattern for layers {:?}", entry.layers);
            check_width(&context, width, &entry.pattern)?;
            for layer in &entry.layers {
                check_layer(&context, *layer)?;
            }
        }
        if let Some(tri) = &self.indicator.tri_layer {
            for layer in tri.layers() {
                check_layer("tri-layer", layer)?;
            }
        }
        if let Some(overlay) = &self.indicator.mode_overlay {
            check_width("mode overlay", width, &overlay.pattern)?;
        }
        if let Some(flash) = &self.indicator.compose_flash {
            check_width("compose flash", width, &flash.pattern)?;
        }

        Ok(())
    }
}

fn check_layer(context: &str, layer: u8) -> Result<(), ProfileError> {
    if layer >= MAX_LAYERS {
        return Err(ProfileError::LayerOutOfRange {
            context: context.to_string(),
            layer,
        });
    }
    Ok(())
}

fn check_width(context: &str, expected: usize, pattern: &LedPattern) -> Result<(), ProfileError> {
    if pattern.width() != expected {
        return Err(ProfileError::PatternWidth {
            context: context.to_string(),
            expected,
            found: pattern.width(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for name in PRESETS {
            let profile = Profile::preset(name).unwrap();
            assert_eq!(profile.name, name);
            profile.validate().unwrap();
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            Profile::preset("keytar"),
            Err(ProfileError::UnknownPreset(_))
        ));
    }

    #[test]
    fn duplicate_channel_is_rejected() {
        let mut profile = Profile::desnarler();
        profile.sliders.push(profile.sliders[0].clone());
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::DuplicateChannel(Channel(26)))
        ));
    }

    #[test]
    fn switch_pin_on_led_is_a_conflict() {
        let mut profile = Profile::desnarler();
        profile.mode_switch.pin = 27;
        assert!(matches!(profile.validate(), Err(ProfileError::PinConflict(27))));
    }

    #[test]
    fn narrow_pattern_is_rejected() {
        let mut profile = Profile::desnarler();
        profile.indicator.patterns[0].pattern = LedPattern::all_on(2);
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::PatternWidth {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn center_and_step_are_checked() {
        let mut profile = Profile::desnarler();
        profile.sliders[0].classifier = ClassifierPolicy::AbsoluteCenter {
            center: 2000,
            dead_zone: 10,
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::CenterOutOfRange { center: 2000, .. })
        ));

        profile.sliders[0].classifier = ClassifierPolicy::Stepped { step: 0 };
        assert!(matches!(profile.validate(), Err(ProfileError::ZeroStep(_))));
    }

    #[test]
    fn relative_delta_needs_deadband_above_threshold() {
        let mut profile = Profile::desnarler();
        profile.sliders[0].deadband = 20;
        profile.sliders[0].classifier = ClassifierPolicy::RelativeDelta { threshold: 20 };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::DeadbandBelowThreshold {
                deadband: 20,
                threshold: 20,
                ..
            })
        ));

        profile.sliders[0].deadband = 21;
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn layer_out_of_range_is_rejected() {
        let mut profile = Profile::desnarler();
        profile.mode_switch.base_layers = Some(BaseLayers { a: 0, b: 32 });
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::LayerOutOfRange { layer: 32, .. })
        ));
    }

    #[test]
    fn profile_survives_toml() {
        let profile = Profile::arrow_pad();
        let text = toml::to_string_pretty(&profile).unwrap();
        let parsed: Profile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, profile);
    }
}
