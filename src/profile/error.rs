use crate::input::Channel;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to access profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Profile already exists at {0}, use --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("Profile '{0}' has no sliders")]
    NoSliders(String),

    #[error("Channel {0} is configured more than once")]
    DuplicateChannel(Channel),

    #[error("Center {center} of {channel} is outside the ADC range 0..={max}")]
    CenterOutOfRange { channel: Channel, center: u16, max: u16 },

    #[error("Deadband {deadband} of {channel} must exceed its relative threshold {threshold}")]
    DeadbandBelowThreshold {
        channel: Channel,
        deadband: u16,
        threshold: u16,
    },

    #[error("Stepped classifier of {0} needs a non-zero step")]
    ZeroStep(Channel),

    #[error("Pin {0} is used more than once")]
    PinConflict(u8),

    #[error("{context} has {found} LEDs, the indicator has {expected}")]
    PatternWidth {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Layer {layer} in {context} is out of range (max 31)")]
    LayerOutOfRange { context: String, layer: u8 },
}
