//! Analog sampling seam
//!
//! Every slider sits on one ADC channel. The host implements
//! [`AnalogSampler`] and the device reads each configured channel once per
//! tick. Raw readings are clamped into the converter range before anything
//! downstream sees them, so the filter and the classifiers can rely on
//! `0..=max`. Which channels exist is a property of the board and is checked
//! once before the first tick; a missing channel never shows up at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};

/// Analog input channel, numbered the way the board numbers its ADC pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(pub u8);

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADC{}", self.0)
    }
}

/// Inclusive conversion range of the ADC, `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcRange {
    pub max: u16,
}

impl Default for AdcRange {
    /// 10-bit converter, as on the reference boards.
    fn default() -> Self {
        Self { max: 1023 }
    }
}

/// One quantized reading. Never outside the range it was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sample(u16);

impl Sample {
    pub fn clamped(raw: u16, range: AdcRange) -> Self {
        Sample(raw.min(range.max))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Signed difference `self - earlier`.
    pub fn delta_from(self, earlier: Sample) -> i32 {
        i32::from(self.0) - i32::from(earlier.0)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("Channel {0} is not wired to the analog converter")]
    UnsupportedChannel(Channel),

    #[error("Failed to open analog converter: {0}")]
    Bus(String),
}

/// Hardware seam for analog reads.
///
/// `read_raw` is called once per tick per channel and must not block longer
/// than one conversion. Channel validity is checked once, at startup, through
/// [`verify_channels`].
pub trait AnalogSampler {
    fn range(&self) -> AdcRange;

    fn supports(&self, channel: Channel) -> bool;

    fn read_raw(&mut self, channel: Channel) -> u16;

    fn sample(&mut self, channel: Channel) -> Sample {
        let range = self.range();
        Sample::clamped(self.read_raw(channel), range)
    }
}

/// Checks every channel against the sampler before the first tick.
pub fn verify_channels<S: AnalogSampler + ?Sized>(
    sampler: &S,
    channels: impl IntoIterator<Item = Channel>,
) -> Result<(), SamplerError> {
    for channel in channels {
        if !sampler.supports(channel) {
            error!("Analog channel {} is not available on this sampler", channel);
            return Err(SamplerError::UnsupportedChannel(channel));
        }
        debug!("Analog channel {} verified", channel);
    }
    Ok(())
}
