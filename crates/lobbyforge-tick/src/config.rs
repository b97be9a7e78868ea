use std::time::Duration;

use tracing::warn;

/// How a [`TickScheduler`](crate::TickScheduler) paces its lobby.
#[derive(Debug, Clone, PartialEq)]
pub struct TickConfig {
    /// Ticks per second.
    pub rate_hz: u32,
    /// Largest random offset applied to the first deadline. Lobbies spawned
    /// together drift apart instead of waking on the same instant.
    pub start_spread: Duration,
    /// A tick whose work takes longer than this share of the period is
    /// reported as slow.
    pub slow_tick_ratio: f64,
}

impl TickConfig {
    /// Highest accepted tick rate.
    pub const MAX_RATE_HZ: u32 = 128;

    pub fn with_rate(rate_hz: u32) -> Self {
        TickConfig {
            rate_hz,
            ..TickConfig::default()
        }
    }

    /// Same config without the start spread. Deterministic first deadline.
    pub fn without_spread(self) -> Self {
        TickConfig {
            start_spread: Duration::ZERO,
            ..self
        }
    }

    /// Pulls every field into its usable range.
    ///
    /// A rate of 0 is raised to 1: a lobby that never ticks would never
    /// notice it is empty.
    pub fn validated(self) -> Self {
        let rate_hz = self.rate_hz.clamp(1, Self::MAX_RATE_HZ);
        if rate_hz != self.rate_hz {
            warn!(requested = self.rate_hz, rate_hz, "tick rate clamped");
        }
        let slow_tick_ratio = if self.slow_tick_ratio.is_nan() {
            TickConfig::default().slow_tick_ratio
        } else {
            self.slow_tick_ratio.clamp(0.0, 1.0)
        };
        TickConfig {
            rate_hz,
            slow_tick_ratio,
            ..self
        }
    }

    /// Wall time between two ticks.
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.rate_hz.max(1)
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        TickConfig {
            rate_hz: 10,
            start_spread: Duration::from_millis(2),
            slow_tick_ratio: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_divides_one_second() {
        assert_eq!(TickConfig::with_rate(10).period(), Duration::from_millis(100));
        assert_eq!(TickConfig::with_rate(4).period(), Duration::from_millis(250));
        assert_eq!(TickConfig::with_rate(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_nan_ratio_falls_back_to_default() {
        let cfg = TickConfig {
            slow_tick_ratio: f64::NAN,
            ..TickConfig::default()
        }
        .validated();
        assert_eq!(cfg.slow_tick_ratio, 0.8);
    }

    #[test]
    fn test_without_spread_keeps_rate() {
        let cfg = TickConfig::with_rate(30).without_spread();
        assert_eq!(cfg.rate_hz, 30);
        assert_eq!(cfg.start_spread, Duration::ZERO);
    }
}
