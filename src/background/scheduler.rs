//! Jittered periodic task loop with cooperative shutdown

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cadence of one background loop.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval_secs: u64,
    pub jitter_secs: u64,
}

impl Schedule {
    /// Interval plus a random 0..jitter_secs offset.
    pub fn next_delay(&self) -> Duration {
        let jitter = if self.jitter_secs > 0 {
            rand::thread_rng().gen_range(0..self.jitter_secs)
        } else {
            0
        };
        Duration::from_secs(self.interval_secs + jitter)
    }
}

/// Run `cycle` immediately and then on every tick of `schedule` until
/// `cancel` fires.
///
/// Cancellation is only observed between cycles; a cycle already running is
/// allowed to finish. Returns the number of completed cycles.
pub async fn run_periodic<F, Fut>(name: &str, schedule: Schedule, cancel: CancellationToken, mut cycle: F) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    info!(
        task = name,
        interval_secs = schedule.interval_secs,
        jitter_secs = schedule.jitter_secs,
        "Background task started"
    );

    let mut cycles = 0u64;
    loop {
        if cancel.is_cancelled() {
            break;
        }
        cycle().await;
        cycles += 1;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(schedule.next_delay()) => {}
        }
    }

    info!(task = name, cycles, "Background task stopped");
    cycles
}
