//! A named cron loop: run `f` immediately, then on every tick, until
//! cancelled. Overlapping ticks are dropped by
//! `tokio::time::interval`'s default `MissedTickBehavior::Burst`-adjacent
//! semantics — we set `Delay` explicitly so a slow tick does not cause a
//! burst of queued catch-up ticks.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

pub async fn cron<F, Fut>(name: &str, interval: Duration, offset: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>, mut f: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    if !offset.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(offset) => {}
            _ = shutdown.changed() => { if *shutdown.borrow() { return; } }
        }
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // `interval`'s own first tick fires immediately; consume it here so
    // the loop body below is the only thing that runs `f` right away.
    ticker.tick().await;

    loop {
        f().await;

        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!(name, "cron loop stopping on shutdown");
                    return;
                }
            }
        }
    }
}
