//! slidepad: analog slider and toggle switch to discrete host events
//!
//! A slider is sampled every tick, filtered, classified into a direction and
//! dispatched as a logical action according to the mode selected by a toggle
//! switch. LEDs show the active host layer. The host firmware sits behind the
//! traits in [`host`].

pub mod config;
pub mod device;
pub mod dispatch;
pub mod host;
pub mod indicator;
pub mod input;
pub mod profile;
pub mod time;
