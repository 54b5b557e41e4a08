use crate::time::Millis;

/// Whether an emission at `now` keeps at least `min_interval_ms` from the
/// last one. With no prior emission the gate is open.
pub fn allow(now: Millis, last_emit: Option<Millis>, min_interval_ms: u32) -> bool {
    match last_emit {
        None => true,
        Some(last) => now.elapsed_since(last) >= min_interval_ms,
    }
}

/// Rate limiter for one output channel
///
/// Holds only the interval. The emission timestamp belongs to the caller,
/// which updates it when an action actually goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    /// Minimum gap between emitted actions, in milliseconds
    min_interval_ms: u32,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u32) -> Self {
        Self { min_interval_ms }
    }

    /// Limiter that caps the rate at `events_per_second`.
    pub fn per_second(events_per_second: u32) -> Self {
        Self::new(1000 / events_per_second.max(1))
    }

    pub fn min_interval_ms(&self) -> u32 {
        self.min_interval_ms
    }

    pub fn should_process(&self, now: Millis, last_emit: Option<Millis>) -> bool {
        allow(now, last_emit, self.min_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_ms_apart_is_suppressed_with_fifty_ms_interval() {
        let limiter = RateLimiter::new(50);
        let first = Millis(1_000);
        assert!(limiter.should_process(first, None));
        assert!(!limiter.should_process(first.after(30), Some(first)));
    }

    #[test]
    fn sixty_ms_apart_passes_with_fifty_ms_interval() {
        let limiter = RateLimiter::new(50);
        let first = Millis(1_000);
        assert!(limiter.should_process(first.after(60), Some(first)));
    }

    #[test]
    fn exact_interval_passes() {
        assert!(allow(Millis(150), Some(Millis(100)), 50));
    }

    #[test]
    fn per_second_cap() {
        assert_eq!(RateLimiter::per_second(20).min_interval_ms(), 50);
        assert_eq!(RateLimiter::per_second(0).min_interval_ms(), 1000);
    }
}
