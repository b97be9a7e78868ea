//! Lobby clock behaviour under Tokio's paused clock. With `start_paused`
//! the runtime jumps time forward whenever every task is idle.

use std::time::Duration;

use lobbyforge_tick::{TickConfig, TickScheduler};
use tokio::time::{Instant, advance, sleep};

fn clock(rate_hz: u32) -> TickScheduler {
    TickScheduler::new(TickConfig::with_rate(rate_hz).without_spread())
}

// =========================================================================
// Config
// =========================================================================

#[test]
fn test_default_config() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.rate_hz, 10);
    assert_eq!(cfg.period(), Duration::from_millis(100));
    assert!(cfg.start_spread > Duration::ZERO);
}

#[test]
fn test_rate_is_kept_within_bounds() {
    let rates: Vec<u32> = [0, 1, 20, 500]
        .into_iter()
        .map(|r| TickConfig::with_rate(r).validated().rate_hz)
        .collect();
    assert_eq!(rates, vec![1, 1, 20, TickConfig::MAX_RATE_HZ]);
}

#[test]
fn test_slow_tick_ratio_is_capped_at_one() {
    let cfg = TickConfig {
        slow_tick_ratio: 2.5,
        ..TickConfig::default()
    };
    assert_eq!(cfg.validated().slow_tick_ratio, 1.0);
}

// =========================================================================
// Scheduling
// =========================================================================

#[test]
fn test_fresh_clock() {
    let c = TickScheduler::with_rate(20);
    assert_eq!(c.rate_hz(), 20);
    assert_eq!(c.period(), Duration::from_millis(50));
    assert_eq!((c.tick_count(), c.total_skipped()), (0, 0));
}

#[tokio::test(start_paused = true)]
async fn test_on_time_ticks_count_up() {
    let mut c = clock(10);
    let mut seen = Vec::new();
    for _ in 0..3 {
        let info = c.wait_for_tick().await;
        assert_eq!(info.dt, Duration::from_millis(100));
        assert_eq!(info.ticks_skipped, 0);
        seen.push(info.tick);
    }
    assert_eq!(seen, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_spacing_matches_rate() {
    let mut c = clock(4);
    let t0 = Instant::now();
    c.wait_for_tick().await;
    c.wait_for_tick().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_lobby_drops_missed_ticks() {
    let mut c = clock(10);
    c.wait_for_tick().await;

    // Next tick was due at 200ms; it fires at 420ms.
    advance(Duration::from_millis(320)).await;
    let late = c.wait_for_tick().await;
    assert_eq!(late.tick, 2);
    assert_eq!(late.ticks_skipped, 2);

    // The cadence restarts from the late tick.
    let t = Instant::now();
    let next = c.wait_for_tick().await;
    assert_eq!(t.elapsed(), Duration::from_millis(100));
    assert_eq!(next.ticks_skipped, 0);
    assert_eq!(c.total_skipped(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slight_lateness_keeps_cadence() {
    let mut c = clock(10);
    let t0 = Instant::now();
    c.wait_for_tick().await;
    advance(Duration::from_millis(105)).await;
    c.wait_for_tick().await;
    c.wait_for_tick().await;
    assert_eq!(t0.elapsed(), Duration::from_millis(300));
    assert_eq!(c.total_skipped(), 0);
}

#[test]
fn test_ending_a_tick_that_never_started() {
    let mut c = TickScheduler::with_rate(10);
    c.record_tick_end();
    c.record_tick_end();
    assert_eq!(c.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_commands_interleave_with_ticks() {
    let mut c = clock(10);
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(4);
    tokio::spawn(async move {
        sleep(Duration::from_millis(250)).await;
        let _ = tx.send("join").await;
    });

    let mut ticks = 0;
    let cmd = loop {
        tokio::select! {
            Some(cmd) = rx.recv() => break cmd,
            _ = c.wait_for_tick() => {
                ticks += 1;
                c.record_tick_end();
            }
        }
    };

    assert_eq!(cmd, "join");
    assert_eq!(ticks, 2);
}
