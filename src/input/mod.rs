//! Input subsystem for slider and switch handling
//!
//! Implements the per-tick translation pipeline:
//!
//! 1. [`sampler`] - Raw analog reads, clamped into the ADC range
//! 2. [`debounce`] - Deadband filter with a one-sample memory
//! 3. [`classify`] - Filtered value to a discrete [`Direction`]
//! 4. [`rate_limit`] - Minimum interval between emitted actions
//! 5. [`slider`] - One channel's pipeline, owning all of the above
//! 6. [`mode_switch`] - Debounced binary toggle selecting the operating [`Mode`]
//!
//! # Architecture
//!
//! ```text
//! ADC ──► Sampler ──► Debounce ──► Classifier ──► RateLimiter ──► Dispatcher
//!         (Sample)    (Filtered)   (Direction)     (gate)          (OutputAction)
//! ```

pub mod classify;
pub mod debounce;
pub mod mode_switch;
pub mod rate_limit;
pub mod sampler;
pub mod slider;

pub use classify::{ClassifierPolicy, Direction, DirectionClassifier};
pub use debounce::{DebounceFilter, FilterOutput, FilterState};
pub use mode_switch::{Mode, ModeReading, ModeSwitch, PinLevel, SwitchDebounce};
pub use rate_limit::RateLimiter;
pub use sampler::{AdcRange, AnalogSampler, Channel, Sample, SamplerError};
pub use slider::SliderChannel;
