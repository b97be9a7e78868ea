use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::Instant as Deadline;
use tracing::{debug, trace, warn};

use crate::TickConfig;

/// Reported once per fired tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// 1-based.
    pub tick: u64,
    /// The configured period, regardless of how late the tick fired.
    pub dt: Duration,
    /// Periods that passed entirely while this tick was overdue.
    pub ticks_skipped: u64,
}

/// Per-lobby clock.
///
/// A tick that fires more than a tenth of a period late drops the periods it
/// missed and reschedules from the moment it fired. Lobby ticks only do
/// bookkeeping, so catching up would change nothing.
#[derive(Debug)]
pub struct TickScheduler {
    config: TickConfig,
    period: Duration,
    deadline: Deadline,
    fired: u64,
    skipped: u64,
    in_flight: Option<Instant>,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let period = config.period();
        let spread = random_offset(config.start_spread);

        debug!(
            rate_hz = config.rate_hz,
            period_ms = period.as_millis() as u64,
            "lobby clock created"
        );

        TickScheduler {
            deadline: Deadline::now() + period + spread,
            config,
            period,
            fired: 0,
            skipped: 0,
            in_flight: None,
        }
    }

    pub fn with_rate(rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(rate_hz))
    }

    /// Resolves when the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.deadline;
        tokio::time::sleep_until(due).await;

        let fired_at = Deadline::now();
        let lateness = fired_at.saturating_duration_since(due);
        let overdue = lateness > self.period / 10;
        let ticks_skipped = if overdue {
            (lateness.as_nanos() / self.period.as_nanos()) as u64
        } else {
            0
        };

        self.fired += 1;
        self.skipped += ticks_skipped;
        self.in_flight = Some(Instant::now());
        self.deadline = (if overdue { fired_at } else { due }) + self.period;

        if ticks_skipped > 0 {
            warn!(
                tick = self.fired,
                ticks_skipped,
                late_ms = lateness.as_millis() as u64,
                "lobby clock fell behind"
            );
        } else {
            trace!(tick = self.fired, "tick");
        }

        TickInfo {
            tick: self.fired,
            dt: self.period,
            ticks_skipped,
        }
    }

    /// Closes the tick opened by the last [`wait_for_tick`](Self::wait_for_tick).
    /// Reports the tick when its work used more than the configured share of
    /// the period. Ignored when no tick is open.
    pub fn record_tick_end(&mut self) {
        let Some(opened) = self.in_flight.take() else {
            return;
        };
        let share = opened.elapsed().as_secs_f64() / self.period.as_secs_f64();
        if share >= self.config.slow_tick_ratio {
            warn!(
                tick = self.fired,
                percent_of_period = (share * 100.0).round() as u64,
                "slow lobby tick"
            );
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.fired
    }

    pub fn rate_hz(&self) -> u32 {
        self.config.rate_hz
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Periods dropped since creation.
    pub fn total_skipped(&self) -> u64 {
        self.skipped
    }
}

fn random_offset(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let micros = max.as_micros().min(u128::from(u64::MAX)) as u64;
    Duration::from_micros(rand::rng().random_range(0..micros.max(1)))
}
