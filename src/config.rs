use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of the host loop, as opposed to the device profile.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostSettings {
    pub tick_interval_ms: u64,
    pub stats_interval_s: u64,
    /// Capacity of the host command queue.
    pub command_buffer: usize,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            stats_interval_s: 10,
            command_buffer: 256,
        }
    }
}

impl HostSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_s.max(1))
    }
}
