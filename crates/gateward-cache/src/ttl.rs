//! Randomized cache TTLs.
//!
//! Entries filled at the same moment with a fixed TTL expire at the same
//! moment, and the resulting thundering herd of misses lands on the store at
//! once. Drawing each TTL uniformly from a window desynchronizes expirations
//! across keys.

use std::time::Duration;

use gateward_core::CacheConfig;

/// Bounded window from which per-entry TTLs are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlWindow {
    floor: Duration,
    ceiling: Duration,
}

impl TtlWindow {
    /// Create a window. The bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        if floor <= ceiling {
            Self { floor, ceiling }
        } else {
            Self {
                floor: ceiling,
                ceiling: floor,
            }
        }
    }

    /// Window taken from a validated [`CacheConfig`].
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl_floor, config.ttl_ceiling)
    }

    /// Lower bound.
    #[must_use]
    pub fn floor(&self) -> Duration {
        self.floor
    }

    /// Upper bound.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Draw a TTL uniformly from the window (millisecond granularity).
    #[must_use]
    pub fn jittered(&self) -> Duration {
        let floor_ms = self.floor.as_millis() as u64;
        let ceiling_ms = self.ceiling.as_millis() as u64;
        if floor_ms >= ceiling_ms {
            return self.floor;
        }
        Duration::from_millis(fastrand::u64(floor_ms..=ceiling_ms))
    }
}

impl Default for TtlWindow {
    /// The 300–600 s window used for entity snapshots.
    fn default() -> Self {
        Self::new(Duration::from_secs(300), Duration::from_secs(600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_in_window() {
        let window = TtlWindow::new(Duration::from_secs(300), Duration::from_secs(600));
        for _ in 0..1000 {
            let ttl = window.jittered();
            assert!(ttl >= window.floor());
            assert!(ttl <= window.ceiling());
        }
    }

    #[test]
    fn test_draws_spread_across_window() {
        // Statistical property: repeated draws are not a single fixed
        // instant. Half the window is a generous bound for 200 draws.
        let window = TtlWindow::new(Duration::from_secs(300), Duration::from_secs(600));
        let draws: Vec<Duration> = (0..200).map(|_| window.jittered()).collect();
        let min = draws.iter().min().unwrap();
        let max = draws.iter().max().unwrap();
        assert!(*max - *min >= Duration::from_secs(150));
    }

    #[test]
    fn test_degenerate_window() {
        let window = TtlWindow::new(Duration::from_secs(60), Duration::from_secs(60));
        assert_eq!(window.jittered(), Duration::from_secs(60));
    }

    #[test]
    fn test_swapped_bounds() {
        let window = TtlWindow::new(Duration::from_secs(600), Duration::from_secs(300));
        assert_eq!(window.floor(), Duration::from_secs(300));
        assert_eq!(window.ceiling(), Duration::from_secs(600));
    }
}
